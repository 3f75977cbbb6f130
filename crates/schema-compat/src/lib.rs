//! # Schema Compat
//!
//! This crate decides two things about nested table schemas written as JSON:
//! whether two texts describe the same schema, and whether moving from one
//! schema to another can be applied in place or forces the table to be
//! recreated.
//!
//! ## Architecture
//!
//! ```text
//! Raw schema text (JSON)
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Parse     │  Decode + normalize (aliases, defaults)
//! │ (text → tree)│
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Compare    │  Name-indexed, order-insensitive walk
//! │ (tree, tree) │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Policy    │  equivalent? / force replace? / change report
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! let old = r#"[{"name": "PageNo", "type": "INTEGER", "mode": "REQUIRED"}]"#;
//! let new = r#"[{"name": "PageNo", "type": "INT64"}]"#;
//!
//! assert!(!schema_compat::are_schemas_equivalent(old, new));
//! assert_eq!(schema_compat::classify_schema_change(old, new).unwrap(), false);
//! ```

pub mod config;
pub mod diagnostic;
pub mod policy;
pub mod schema;

pub use config::CompatConfig;
pub use diagnostic::SchemaError;
pub use policy::SchemaPolicy;
pub use schema::{Field, FieldChange, FieldMode, FieldType, PolicyTags, Schema, SchemaDiff};

/// Whether changing the schema text from `old_raw` to `new_raw` forces the
/// table to be recreated, under the default configuration.
pub fn classify_schema_change(old_raw: &str, new_raw: &str) -> Result<bool, SchemaError> {
    SchemaPolicy::default().classify_schema_change(old_raw, new_raw)
}

/// Whether two schema texts describe the same schema, under the default
/// configuration. Undecodable text is never equivalent.
pub fn are_schemas_equivalent(old_raw: &str, new_raw: &str) -> bool {
    SchemaPolicy::default().are_schemas_equivalent(old_raw, new_raw)
}

/// Full change report between two schema texts, under the default
/// configuration.
pub fn diff_schema_text(old_raw: &str, new_raw: &str) -> Result<SchemaDiff, SchemaError> {
    SchemaPolicy::default().diff_schema_text(old_raw, new_raw)
}
