//! Built-in schema definitions for the known task types.
//!
//! Field names and enumerated values here are part of the wire contract
//! with the generation prompts and must match them exactly.

mod automaton;
mod elemental;
mod spell;

pub use automaton::{automaton_schema, AUTOMATA_SCRIPTING, RECURSIVE_NODE_TYPES};
pub use elemental::{elemental_schema, ELEMENTAL_DATA, SOUND_LIBRARY};
pub use spell::{spell_schema, SPELL_SCRIPTING, TRIGGER_TYPES};

use crate::contract::SchemaDefinition;

/// All built-in definitions.
pub fn builtin_schemas() -> Vec<SchemaDefinition> {
    vec![elemental_schema(), spell_schema(), automaton_schema()]
}
