//! Schema definitions: root contract plus node contract table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::predicate::Predicate;
use super::schema::validate_definition_schema;

/// Errors that can occur when loading a schema definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Failed to read definition file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Definition does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Invalid definition: {0}")]
    Invalid(String),
}

/// A required or optional field and the predicates its value must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldRule {
    /// Field name. Root rules accept dotted paths (`behavior.actions`).
    pub field: String,

    #[serde(default)]
    pub required: bool,

    /// Checked in order; the first failure is reported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<Predicate>,
}

impl FieldRule {
    pub fn required(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            required: true,
            checks: Vec::new(),
        }
    }

    pub fn optional(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            required: false,
            checks: Vec::new(),
        }
    }

    pub fn check(mut self, predicate: Predicate) -> Self {
        self.checks.push(predicate);
        self
    }

    /// Evaluate the rule against a possibly absent value.
    pub fn evaluate(&self, value: Option<&Value>) -> Result<(), String> {
        match value {
            None if self.required => Err("missing required field".to_string()),
            None => Ok(()),
            Some(v) => self.checks.iter().try_for_each(|p| p.check(v)),
        }
    }
}

/// Detail maps keyed by the names listed in a root field.
///
/// For `{"elements": ["fire"], "fire": {...}}` the entry contract names
/// `elements` and describes the shape of `fire`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryContract {
    pub names_from: String,

    #[serde(default)]
    pub fields: Vec<FieldRule>,
}

/// Top-level shape of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RootContract {
    #[serde(default)]
    pub fields: Vec<FieldRule>,

    /// Path of the root node list walked by the recursive validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<EntryContract>,
}

/// Contract for one discriminator value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeContract {
    #[serde(default)]
    pub fields: Vec<FieldRule>,

    /// Fields that, when present, hold nested node lists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl NodeContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    pub fn child(mut self, field: impl Into<String>) -> Self {
        self.children.push(field.into());
        self
    }
}

/// The full contract for one task type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaDefinition {
    /// Registry key, e.g. `spellScripting`.
    pub task_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub root: RootContract,

    /// Field selecting the node contract (`type`, `componentType`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nodes: BTreeMap<String, NodeContract>,
}

impl SchemaDefinition {
    /// Parse a definition from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DefinitionError> {
        let raw: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(serde_json::to_value(raw)?)
    }

    /// Parse a definition from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Parse a definition from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a definition from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a definition from a file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_yaml_file(path),
        }
    }

    fn from_value(value: Value) -> Result<Self, DefinitionError> {
        validate_definition_schema(&value).map_err(DefinitionError::SchemaError)?;
        let definition: SchemaDefinition = serde_json::from_value(value)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Cross-field checks the meta-schema cannot express.
    fn validate(&self) -> Result<(), DefinitionError> {
        if self.task_type.is_empty() {
            return Err(DefinitionError::Invalid("task_type is empty".to_string()));
        }

        if self.discriminator.is_none() && (self.root.nodes.is_some() || !self.nodes.is_empty()) {
            return Err(DefinitionError::Invalid(format!(
                "{}: node contracts require a discriminator",
                self.task_type
            )));
        }

        if self.discriminator.is_some() && self.root.nodes.is_none() {
            return Err(DefinitionError::Invalid(format!(
                "{}: discriminator set but root.nodes is missing",
                self.task_type
            )));
        }

        Ok(())
    }

    /// Node contract for a discriminator value, if one is declared.
    pub fn node_contract(&self, discriminator_value: &str) -> Option<&NodeContract> {
        self.nodes.get(discriminator_value)
    }
}
