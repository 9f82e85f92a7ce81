//! Task-type to schema definition mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::contract::SchemaDefinition;
use crate::schemas::builtin_schemas;

lazy_static! {
    /// Leading alphanumeric run of a stored task key.
    static ref BASE_TASK_NAME: Regex = Regex::new(r"^[a-zA-Z0-9]+").unwrap();

    static ref BUILTIN: Vec<Arc<SchemaDefinition>> =
        builtin_schemas().into_iter().map(Arc::new).collect();
}

/// Base task name of a stored task key.
///
/// `spellScripting-2025-06-15-10-12-01` → `spellScripting`.
pub fn base_task_name(task_key: &str) -> Option<&str> {
    BASE_TASK_NAME.find(task_key).map(|m| m.as_str())
}

/// Registry of schema definitions keyed by task type.
///
/// Definitions are shared behind `Arc`, so cloning a registry is cheap and
/// the built-in definitions are constructed once per process.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<SchemaDefinition>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in task types.
    pub fn builtin() -> Self {
        let schemas = BUILTIN
            .iter()
            .map(|s| (s.task_type.clone(), Arc::clone(s)))
            .collect();
        Self { schemas }
    }

    /// Register a definition. An existing definition with the same task type
    /// is replaced and returned.
    pub fn register(&mut self, schema: SchemaDefinition) -> Option<Arc<SchemaDefinition>> {
        let key = schema.task_type.clone();
        let previous = self.schemas.insert(key, Arc::new(schema));
        if let Some(prev) = &previous {
            tracing::info!(task_type = %prev.task_type, "Replaced schema definition");
        }
        previous
    }

    pub fn lookup(&self, task_type: &str) -> Option<&SchemaDefinition> {
        self.schemas.get(task_type).map(Arc::as_ref)
    }

    /// Registered task types, sorted.
    pub fn task_types(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
