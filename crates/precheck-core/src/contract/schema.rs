//! JSON Schema validation for schema definition files.
//!
//! Definitions loaded from YAML/JSON are checked against
//! `schema/definition.schema.json` before deserialization, so that a
//! malformed file reports every problem with its location at once.

use std::sync::OnceLock;

/// Embedded definition meta-schema (loaded at compile time).
const DEFINITION_SCHEMA_JSON: &str = include_str!("../../schema/definition.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn get_validator() -> Result<&'static jsonschema::Validator, String> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(DEFINITION_SCHEMA_JSON)
            .map_err(|e| format!("Invalid meta-schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile meta-schema: {}", e))
    });

    result.as_ref().map_err(Clone::clone)
}

/// Validate a definition document against the meta-schema.
///
/// Returns every violation as `"<message> at <instance path>"`.
pub fn validate_definition_schema(definition: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e])?;

    let errors: Vec<String> = validator
        .iter_errors(definition)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_definition_passes() {
        let value = json!({
            "task_type": "flat",
            "root": {}
        });
        assert!(validate_definition_schema(&value).is_ok());
    }

    #[test]
    fn test_unknown_predicate_fails() {
        let value = json!({
            "task_type": "flat",
            "root": {
                "fields": [
                    { "field": "name", "checks": [ { "shorter_than": 4 } ] }
                ]
            }
        });
        assert!(validate_definition_schema(&value).is_err());
    }

    #[test]
    fn test_task_type_must_be_alphanumeric() {
        // Stored task keys are reduced to their leading alphanumeric run.
        let value = json!({
            "task_type": "spell-scripting",
            "root": {}
        });
        assert!(validate_definition_schema(&value).is_err());
    }

    #[test]
    fn test_additional_properties_fail() {
        let value = json!({
            "task_type": "flat",
            "root": {},
            "unknown_field": true
        });
        let errors = validate_definition_schema(&value).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_full_definition_passes() {
        let value = json!({
            "task_type": "automataScripting",
            "description": "Cellular automaton behavior scripts",
            "root": {
                "fields": [
                    { "field": "name", "required": true,
                      "checks": [ { "type": "string" }, "lowercase",
                                  { "length_between": { "min": 1, "max": 15 } } ] },
                    { "field": "color_hex", "required": true,
                      "checks": [ { "matches": "^#[0-9a-fA-F]{6}$" } ] },
                    { "field": "behavior.actions", "required": true,
                      "checks": [ { "type": "array" } ] }
                ],
                "nodes": "behavior.actions"
            },
            "discriminator": "type",
            "nodes": {
                "if_chance": { "children": ["actions", "else_actions"] },
                "projectile": {
                    "fields": [ { "field": "radius", "required": true,
                                  "checks": [ { "each": { "type": "number" } }, { "length": 3 },
                                              { "one_of": ["a"] } ] } ]
                }
            }
        });
        assert!(validate_definition_schema(&value).is_ok());
    }
}
