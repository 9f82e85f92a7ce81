//! Root and recursive node validation.
//!
//! One engine serves every task type; all task-specific knowledge lives in
//! the [`SchemaDefinition`] it is handed. Traversal is depth-first
//! pre-order and never mutates the document.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::config::ValidatorConfig;
use crate::contract::{EntryContract, FieldRule, SchemaDefinition, ValueType};
use crate::report::{Diagnostic, Violation};

/// Raised through `?` to unwind the traversal once fail-fast has a violation.
struct Halt;

type Step = Result<(), Halt>;

/// Validate a parsed document, returning diagnostics in traversal order.
pub fn check_document(
    schema: &SchemaDefinition,
    document: &Value,
    config: &ValidatorConfig,
) -> Vec<Diagnostic> {
    let mut walker = Walker {
        schema,
        config,
        diagnostics: Vec::new(),
    };
    // A halt only means "stop collecting"; the diagnostics are already recorded.
    let _ = walker.document(document);
    walker.diagnostics
}

struct Walker<'a> {
    schema: &'a SchemaDefinition,
    config: &'a ValidatorConfig,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Walker<'a> {
    fn report(&mut self, path: String, violation: Violation) -> Step {
        tracing::debug!(
            task_type = %self.schema.task_type,
            kind = violation.kind(),
            path = %path,
            "{}",
            violation
        );
        self.diagnostics.push(Diagnostic { path, violation });
        if self.config.fail_fast {
            Err(Halt)
        } else {
            Ok(())
        }
    }

    fn document(&mut self, document: &Value) -> Step {
        let schema = self.schema;
        let Some(root) = document.as_object() else {
            return self.report(
                "$".to_string(),
                Violation::RootContract {
                    field: "$".to_string(),
                    reason: format!("expected object, found {}", ValueType::of(document)),
                },
            );
        };

        let failed = self.root_fields(root)?;

        if let Some(entries) = &schema.root.entries {
            if !failed.contains(entries.names_from.as_str()) {
                self.entries(root, entries)?;
            }
        }

        if let Some(nodes_path) = &schema.root.nodes {
            if !failed.contains(nodes_path.as_str()) {
                if let Some(nodes) = lookup_path(root, nodes_path) {
                    self.node_list(nodes, format!("$.{}", nodes_path), 1)?;
                }
            }
        }

        Ok(())
    }

    /// Check root rules; returns the fields that failed.
    fn root_fields(&mut self, root: &Map<String, Value>) -> Result<HashSet<&'a str>, Halt> {
        let schema = self.schema;
        let mut failed = HashSet::new();

        for rule in &schema.root.fields {
            if let Err(reason) = rule.evaluate(lookup_path(root, &rule.field)) {
                failed.insert(rule.field.as_str());
                self.report(
                    format!("$.{}", rule.field),
                    Violation::RootContract {
                        field: rule.field.clone(),
                        reason,
                    },
                )?;
            }
        }

        Ok(failed)
    }

    /// Keyed detail maps: each name listed under `names_from` must key an
    /// object satisfying the entry rules.
    fn entries(&mut self, root: &Map<String, Value>, entries: &EntryContract) -> Step {
        let Some(names) = lookup_path(root, &entries.names_from).and_then(Value::as_array) else {
            return Ok(());
        };

        for name in names.iter().filter_map(Value::as_str) {
            let path = format!("$.{}", name);
            let Some(detail) = root.get(name).and_then(Value::as_object) else {
                self.report(
                    path,
                    Violation::NodeShape {
                        reason: format!("'{}' is missing its detail map", name),
                    },
                )?;
                continue;
            };
            self.fields(name, detail, &entries.fields, &path)?;
        }

        Ok(())
    }

    fn node_list(&mut self, value: &Value, path: String, depth: usize) -> Step {
        if depth > self.config.max_depth {
            return self.report(
                path,
                Violation::DepthExceeded {
                    limit: self.config.max_depth,
                },
            );
        }

        let Some(nodes) = value.as_array() else {
            return self.report(
                path,
                Violation::Shape {
                    found: ValueType::of(value).to_string(),
                },
            );
        };

        for (index, node) in nodes.iter().enumerate() {
            self.node(node, format!("{}[{}]", path, index), depth)?;
        }

        Ok(())
    }

    fn node(&mut self, node: &Value, path: String, depth: usize) -> Step {
        let schema = self.schema;
        // Definitions with root.nodes always carry a discriminator.
        let discriminator = schema.discriminator.as_deref().unwrap_or("type");

        let Some(object) = node.as_object() else {
            return self.report(
                path,
                Violation::NodeShape {
                    reason: format!("expected object, found {}", ValueType::of(node)),
                },
            );
        };

        let Some(tag) = object.get(discriminator).and_then(Value::as_str) else {
            return self.report(
                path,
                Violation::NodeShape {
                    reason: format!("lacks a string `{}` field", discriminator),
                },
            );
        };

        // Unknown discriminators are accepted without field checks.
        let Some(contract) = schema.node_contract(tag) else {
            tracing::trace!(node_type = tag, path = %path, "unknown node type accepted");
            return Ok(());
        };

        self.fields(tag, object, &contract.fields, &path)?;

        for child in &contract.children {
            if let Some(nested) = object.get(child) {
                self.node_list(nested, format!("{}.{}", path, child), depth + 1)?;
            }
        }

        Ok(())
    }

    fn fields(
        &mut self,
        node: &str,
        object: &Map<String, Value>,
        rules: &[FieldRule],
        path: &str,
    ) -> Step {
        for rule in rules {
            if let Err(reason) = rule.evaluate(object.get(&rule.field)) {
                self.report(
                    format!("{}.{}", path, rule.field),
                    Violation::FieldConstraint {
                        node: node.to_string(),
                        field: rule.field.clone(),
                        reason,
                    },
                )?;
            }
        }
        Ok(())
    }
}

/// Resolve a dotted path (`behavior.actions`) against a root object.
fn lookup_path<'v>(root: &'v Map<String, Value>, path: &str) -> Option<&'v Value> {
    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
