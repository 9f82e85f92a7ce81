//! Spell scripts: components discriminated by `componentType`, with
//! triggers carrying nested `payload_components`.

use std::collections::BTreeMap;

use crate::contract::{
    FieldRule, NodeContract, Predicate, RootContract, SchemaDefinition, ValueType,
};

pub const SPELL_SCRIPTING: &str = "spellScripting";

/// Component types that must carry a `payload_components` list.
pub const TRIGGER_TYPES: [&str; 4] = ["timerTrigger", "buttonTrigger", "impactTrigger", "deathTrigger"];

const PAYLOAD: &str = "payload_components";

pub fn spell_schema() -> SchemaDefinition {
    let mut nodes = BTreeMap::new();

    nodes.insert(
        "color".to_string(),
        NodeContract::new().field(
            FieldRule::required("rgb")
                .check(Predicate::Type(ValueType::Array))
                .check(Predicate::Length(3))
                .check(Predicate::Each(Box::new(Predicate::Type(ValueType::Number)))),
        ),
    );
    nodes.insert(
        "projectile".to_string(),
        NodeContract::new()
            .field(FieldRule::required("radius").check(Predicate::Type(ValueType::Number))),
    );
    for trigger in TRIGGER_TYPES {
        // Shape of the payload is checked by the child walk (ShapeError).
        nodes.insert(
            trigger.to_string(),
            NodeContract::new()
                .field(FieldRule::required(PAYLOAD))
                .child(PAYLOAD),
        );
    }

    SchemaDefinition {
        task_type: SPELL_SCRIPTING.to_string(),
        description: Some("Spell component scripts with nested trigger payloads".to_string()),
        root: RootContract {
            fields: vec![
                FieldRule::required("friendlyName").check(Predicate::Type(ValueType::String)),
                FieldRule::required("components").check(Predicate::Type(ValueType::Array)),
            ],
            nodes: Some("components".to_string()),
            entries: None,
        },
        discriminator: Some("componentType".to_string()),
        nodes,
    }
}
