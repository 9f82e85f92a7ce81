//! Elemental ruleset: a flat list of element names, each keying a detail map.

use crate::contract::{
    EntryContract, FieldRule, Predicate, RootContract, SchemaDefinition, ValueType,
};

pub const ELEMENTAL_DATA: &str = "elementalData";

/// Allowed `SOUND_LIB` values.
pub const SOUND_LIBRARY: [&str; 4] = ["flaming", "blowing", "crackling", "energetic"];

pub fn elemental_schema() -> SchemaDefinition {
    SchemaDefinition {
        task_type: ELEMENTAL_DATA.to_string(),
        description: Some("Element names with color and sound detail maps".to_string()),
        root: RootContract {
            fields: vec![FieldRule::required("elements")
                .check(Predicate::Type(ValueType::Array))
                .check(Predicate::Each(Box::new(Predicate::Type(ValueType::String))))],
            nodes: None,
            entries: Some(EntryContract {
                names_from: "elements".to_string(),
                fields: vec![
                    FieldRule::required("RGB_COLOR")
                        .check(Predicate::Type(ValueType::Array))
                        .check(Predicate::Length(3))
                        .check(Predicate::Each(Box::new(Predicate::Type(ValueType::Number)))),
                    FieldRule::required("SOUND_LIB")
                        .check(Predicate::Type(ValueType::String))
                        .check(Predicate::OneOf(
                            SOUND_LIBRARY.iter().map(|s| s.to_string()).collect(),
                        )),
                ],
            }),
        },
        discriminator: None,
        nodes: Default::default(),
    }
}
