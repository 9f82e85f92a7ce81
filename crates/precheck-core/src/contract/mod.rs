//! Schema definitions and the predicates they are built from.
//!
//! A definition is declarative data: root field rules, a discriminator, and
//! a table of node contracts. Definitions can be built in code or loaded
//! from YAML/JSON files validated against an embedded JSON Schema.

mod definition;
mod predicate;
mod schema;

pub use definition::{
    DefinitionError, EntryContract, FieldRule, NodeContract, RootContract, SchemaDefinition,
};
pub use predicate::{Pattern, Predicate, ValueType};
pub use schema::validate_definition_schema;
