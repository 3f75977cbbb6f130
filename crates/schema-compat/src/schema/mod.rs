//! Table schema decoding, comparison and change classification.
//!
//! This module handles the structural side of schema evolution:
//!
//! 1. Decoding raw schema text into normalized field trees
//! 2. Deciding whether two trees describe the same schema
//! 3. Deciding whether one tree can evolve into another in place
//! 4. Listing every change, marked breaking or not

pub mod compare;
pub mod diff;
pub mod field;
pub mod parse;

pub use compare::{changeable, diff, equivalent, ComparisonMode};
pub use diff::{FieldChange, SchemaDiff};
pub use field::{Field, FieldMode, FieldType, PolicyTags, Schema, DEFAULT_MODE};
pub use parse::{parse_schema, schema_from_value};
