//! CLI settings file: validator config plus extra schema definitions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use precheck_core::{ExtractionMode, SchemaDefinition, SchemaRegistry, Validator, ValidatorConfig};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Settings {
    #[serde(flatten)]
    pub validator: ValidatorConfig,

    /// Definition files (YAML or JSON) registered on top of the built-ins.
    /// Relative paths resolve against the settings file's directory.
    #[serde(default)]
    pub schemas: Vec<PathBuf>,
}

impl Settings {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut settings: Settings = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;

        if let Some(dir) = path.parent() {
            for schema in &mut settings.schemas {
                if schema.is_relative() {
                    *schema = dir.join(&*schema);
                }
            }
        }
        Ok(settings)
    }

    pub fn apply_overrides(&mut self, fail_fast: bool, max_depth: Option<usize>, balanced: bool) {
        if fail_fast {
            self.validator.fail_fast = true;
        }
        if let Some(depth) = max_depth {
            self.validator.max_depth = depth;
        }
        if balanced {
            self.validator.extraction = ExtractionMode::Balanced;
        }
    }

    pub fn build_validator(&self) -> anyhow::Result<Validator> {
        self.validator.validate()?;

        let mut registry = SchemaRegistry::builtin();
        for path in &self.schemas {
            let schema = SchemaDefinition::from_file(path)
                .with_context(|| format!("loading schema {}", path.display()))?;
            tracing::info!(task_type = %schema.task_type, path = %path.display(), "Registered schema");
            registry.register(schema);
        }

        Ok(Validator::new()
            .with_config(self.validator.clone())
            .with_registry(registry))
    }
}
