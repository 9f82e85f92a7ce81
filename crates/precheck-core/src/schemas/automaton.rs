//! Cellular-automaton behavior scripts: `type`-discriminated action nodes,
//! where control-flow nodes nest `actions` and `else_actions`.

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::contract::{
    FieldRule, NodeContract, Pattern, Predicate, RootContract, SchemaDefinition, ValueType,
};

pub const AUTOMATA_SCRIPTING: &str = "automataScripting";

/// Node types that may carry nested `actions` / `else_actions` lists.
pub const RECURSIVE_NODE_TYPES: [&str; 9] = [
    "in_rand_rotation",
    "in_rand_mirror",
    "in_rand_flip",
    "if_neighbor_is",
    "if_neighbor_is_not",
    "if_alpha",
    "if_neighbor_count",
    "if_chance",
    "do_swap",
];

lazy_static! {
    /// `#RRGGBB`, either case.
    static ref COLOR_HEX_PATTERN: Pattern = Pattern::new("^#[0-9a-fA-F]{6}$").unwrap();
}

pub fn automaton_schema() -> SchemaDefinition {
    let nodes: BTreeMap<String, NodeContract> = RECURSIVE_NODE_TYPES
        .iter()
        .map(|t| {
            (
                t.to_string(),
                NodeContract::new().child("actions").child("else_actions"),
            )
        })
        .collect();

    SchemaDefinition {
        task_type: AUTOMATA_SCRIPTING.to_string(),
        description: Some("Cellular automaton element behavior scripts".to_string()),
        root: RootContract {
            fields: vec![
                FieldRule::required("name")
                    .check(Predicate::Type(ValueType::String))
                    .check(Predicate::Lowercase)
                    .check(Predicate::LengthBetween { min: 1, max: 15 }),
                FieldRule::required("color_hex")
                    .check(Predicate::Type(ValueType::String))
                    .check(Predicate::Matches(COLOR_HEX_PATTERN.clone())),
                FieldRule::required("behavior.actions").check(Predicate::Type(ValueType::Array)),
            ],
            nodes: Some("behavior.actions".to_string()),
            entries: None,
        },
        discriminator: Some("type".to_string()),
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::engine::check_document;
    use crate::report::{Diagnostic, Violation};
    use serde_json::{json, Value};

    fn check(doc: Value) -> Vec<Diagnostic> {
        check_document(&automaton_schema(), &doc, &ValidatorConfig::default())
    }

    fn script(name: &str, color: &str, actions: Value) -> Value {
        json!({ "name": name, "color_hex": color, "behavior": { "actions": actions } })
    }

    #[test]
    fn test_steam_passes() {
        let doc = script(
            "steam",
            "#E0E0E0",
            json!([{
                "type": "if_chance",
                "percent": 50,
                "actions": [ { "type": "do_swap", "direction": "north" } ]
            }]),
        );
        assert!(check(doc).is_empty());
    }

    #[test]
    fn test_name_rules() {
        assert!(!check(script("TooLong", "#FFFFFF", json!([]))).is_empty());
        assert!(!check(script("", "#FFFFFF", json!([]))).is_empty());
        assert!(!check(script("averyveryverylongname", "#FFFFFF", json!([]))).is_empty());
        assert!(check(script("fifteencharsxyz", "#FFFFFF", json!([]))).is_empty());
    }

    #[test]
    fn test_color_hex_rules() {
        let diags = check(script("test", "#FFF", json!([])));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "$.color_hex");
        assert!(check(script("test", "#e0e0e0", json!([]))).is_empty());
        assert!(!check(script("test", "E0E0E0", json!([]))).is_empty());
    }

    #[test]
    fn test_missing_behavior() {
        let diags = check(json!({ "name": "test", "color_hex": "#FFFFFF" }));
        assert!(matches!(
            &diags[..],
            [Diagnostic { violation: Violation::RootContract { field, .. }, .. }] if field == "behavior.actions"
        ));
    }

    #[test]
    fn test_missing_node_type() {
        let diags = check(script("test", "#FFFFFF", json!([{ "direction": "north" }])));
        assert!(matches!(diags[0].violation, Violation::NodeShape { .. }));
    }

    #[test]
    fn test_else_actions_are_walked() {
        let doc = script(
            "sand",
            "#C2B280",
            json!([{
                "type": "if_neighbor_is",
                "actions": [],
                "else_actions": [ { "type": "in_rand_flip", "actions": "swap" } ]
            }]),
        );
        let diags = check(doc);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "$.behavior.actions[0].else_actions[0].actions");
    }

    #[test]
    fn test_unknown_type_passes() {
        let doc = script("test", "#FFFFFF", json!([{ "type": "mystery_action" }]));
        assert!(check(doc).is_empty());
    }
}
