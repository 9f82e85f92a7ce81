//! # precheck-core
//!
//! Deterministic structural pre-check for generated structured outputs.
//!
//! Before an expensive LLM judge scores a model response, this crate
//! extracts the JSON document embedded in the response text and checks it
//! against the schema registered for the task type.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces the same verdict
//! 2. **Read-only**: Documents are never repaired or rewritten
//! 3. **Data-driven**: One engine; each task type is a [`SchemaDefinition`]
//! 4. **Parallel-safe**: Definitions are immutable and shared, documents are call-local
//!
//! ## Example
//!
//! ```rust,ignore
//! use precheck_core::{validate, ValidationStatus};
//!
//! let outcome = validate("elementalData", r#"Sure! {"elements": ["fire"], "fire": {"RGB_COLOR": [255, 0, 0], "SOUND_LIB": "flaming"}}"#);
//! assert_eq!(outcome.status(), ValidationStatus::Passed);
//!
//! for diagnostic in outcome.diagnostics() {
//!     println!("{}", diagnostic);
//! }
//! ```

pub mod config;
pub mod contract;
pub mod engine;
pub mod extract;
pub mod registry;
pub mod report;
pub mod schemas;

pub use config::{ConfigError, ExtractionMode, ValidatorConfig};
pub use contract::{
    DefinitionError, EntryContract, FieldRule, NodeContract, Predicate, RootContract,
    SchemaDefinition, ValueType,
};
pub use registry::{base_task_name, SchemaRegistry};
pub use report::{Diagnostic, Outcome, Report, ValidationStatus, Verdict, Violation};

use lazy_static::lazy_static;
use serde_json::Value;

lazy_static! {
    static ref DEFAULT_VALIDATOR: Validator = Validator::new();
}

/// Validate raw model output for a task type with the default validator.
///
/// Unknown task types yield [`Outcome::Skipped`].
pub fn validate(task_type: &str, raw_text: &str) -> Outcome {
    DEFAULT_VALIDATOR.validate(task_type, raw_text)
}

/// A schema registry paired with traversal settings.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: SchemaRegistry,
    config: ValidatorConfig,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator over the built-in schemas with default settings.
    pub fn new() -> Self {
        Self {
            registry: SchemaRegistry::builtin(),
            config: ValidatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    /// Extract and validate the document in `raw_text` for `task_type`.
    pub fn validate(&self, task_type: &str, raw_text: &str) -> Outcome {
        let Some(schema) = self.registry.lookup(task_type) else {
            tracing::info!(task_type, "No validator found for task type");
            return Outcome::Skipped {
                task_type: task_type.to_string(),
            };
        };

        let report = match extract::extract_document(raw_text, self.config.extraction) {
            Ok(document) => self.validate_document(schema, &document),
            Err(violation) => {
                tracing::debug!(task_type, kind = violation.kind(), "{}", violation);
                Report::new(
                    task_type,
                    vec![Diagnostic {
                        path: "$".to_string(),
                        violation,
                    }],
                )
            }
        };

        Outcome::Checked(report)
    }

    /// Validate an already parsed document.
    pub fn validate_document(&self, schema: &SchemaDefinition, document: &Value) -> Report {
        let diagnostics = engine::check_document(schema, document, &self.config);
        Report::new(&schema.task_type, diagnostics)
    }

    /// Validate a stored record, deriving the task type from its task key.
    pub fn validate_record(&self, task_key: &str, raw_text: &str) -> Outcome {
        match base_task_name(task_key) {
            Some(task_type) => self.validate(task_type, raw_text),
            None => {
                tracing::warn!(task_key, "Could not extract base task name");
                Outcome::Skipped {
                    task_type: task_key.to_string(),
                }
            }
        }
    }
}
