//! Normalized field model.
//!
//! A [`Field`] is one column of a table schema after decoding. Optional slots
//! record whether an attribute was present in the source text, so "missing"
//! and "defaulted" stay distinguishable all the way through comparison.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

/// Mode assumed for a field that does not declare one.
pub static DEFAULT_MODE: FieldMode = FieldMode::Nullable;

/// Type spellings that collapse onto a canonical name.
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("INTEGER", "INT64"),
    ("FLOAT", "FLOAT64"),
    ("BOOLEAN", "BOOL"),
];

/// A normalized column type.
///
/// Type names compare case-insensitively, and the legacy names `INTEGER`,
/// `FLOAT` and `BOOLEAN` are folded onto `INT64`, `FLOAT64` and `BOOL`.
/// Every other name is kept as an opaque upper-cased string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FieldType(String);

impl FieldType {
    /// Normalize a raw type name.
    pub fn new(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        let canonical = TYPE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == upper)
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or(upper);
        Self(canonical)
    }

    /// The canonical type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized column mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldMode {
    Nullable,
    Required,
    Repeated,
    /// A mode name outside the known set, upper-cased.
    Other(String),
}

impl FieldMode {
    /// Normalize a raw mode name.
    pub fn parse(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "NULLABLE" => FieldMode::Nullable,
            "REQUIRED" => FieldMode::Required,
            "REPEATED" => FieldMode::Repeated,
            other => FieldMode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldMode::Nullable => "NULLABLE",
            FieldMode::Required => "REQUIRED",
            FieldMode::Repeated => "REPEATED",
            FieldMode::Other(name) => name,
        }
    }

    /// Whether a column in this mode can move to `new` without recreating the
    /// table. Only relaxing `REQUIRED` to `NULLABLE` is known to be safe;
    /// every other transition is refused.
    pub fn can_transition_to(&self, new: &FieldMode) -> bool {
        self == new || matches!((self, new), (FieldMode::Required, FieldMode::Nullable))
    }
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A field's `policyTags` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyTags {
    /// Tag names. Order carries no meaning.
    pub names: BTreeSet<String>,

    /// Any other keys of the block, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PolicyTags {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            extra: BTreeMap::new(),
        }
    }
}

/// One column of a table schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Identifies the field among its siblings.
    pub name: String,

    /// Normalized type, `None` when the `type` key was missing.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub typ: Option<FieldType>,

    /// Declared mode, `None` when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<FieldMode>,

    /// Declared description, `None` when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Policy tag block, `None` when no `policyTags` key was given.
    #[serde(rename = "policyTags", skip_serializing_if = "Option::is_none")]
    pub policy_tags: Option<PolicyTags>,

    /// Nested columns of a record type.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,

    /// Any other keys of the field object, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Field {
    /// Create a field with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: None,
            mode: None,
            description: None,
            policy_tags: None,
            fields: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_type(mut self, typ: &str) -> Self {
        self.typ = Some(FieldType::new(typ));
        self
    }

    pub fn with_mode(mut self, mode: &str) -> Self {
        self.mode = Some(FieldMode::parse(mode));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_policy_tags<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy_tags = Some(PolicyTags::new(names));
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Mode after default substitution.
    pub fn effective_mode(&self) -> &FieldMode {
        self.mode.as_ref().unwrap_or(&DEFAULT_MODE)
    }

    /// Description after default substitution.
    pub fn effective_description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// An unordered list of sibling fields.
///
/// `null` and `[]` both decode to the empty schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<Field>> for Schema {
    fn from(fields: Vec<Field>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_aliases_fold() {
        assert_eq!(FieldType::new("INTEGER"), FieldType::new("INT64"));
        assert_eq!(FieldType::new("integer"), FieldType::new("Int64"));
        assert_eq!(FieldType::new("FLOAT"), FieldType::new("float64"));
        assert_eq!(FieldType::new("Boolean"), FieldType::new("BOOL"));
        assert_eq!(FieldType::new("integer").as_str(), "INT64");
    }

    #[test]
    fn test_unknown_types_are_opaque() {
        assert_eq!(FieldType::new("timestamp").as_str(), "TIMESTAMP");
        assert_ne!(FieldType::new("INTEGER"), FieldType::new("NUMERIC"));
        assert_ne!(FieldType::new("RECORD"), FieldType::new("STRUCT"));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(FieldMode::parse("nullable"), FieldMode::Nullable);
        assert_eq!(FieldMode::parse("Required"), FieldMode::Required);
        assert_eq!(FieldMode::parse("REPEATED"), FieldMode::Repeated);
        assert_eq!(
            FieldMode::parse("somethingRandom"),
            FieldMode::Other("SOMETHINGRANDOM".to_string())
        );
    }

    #[test]
    fn test_mode_transitions() {
        assert!(FieldMode::Required.can_transition_to(&FieldMode::Required));
        assert!(FieldMode::Required.can_transition_to(&FieldMode::Nullable));
        assert!(!FieldMode::Required.can_transition_to(&FieldMode::Repeated));
        assert!(!FieldMode::Nullable.can_transition_to(&FieldMode::Required));
        assert!(!FieldMode::Repeated.can_transition_to(&FieldMode::Nullable));
    }

    #[test]
    fn test_defaults() {
        let field = Field::new("PageNo").with_type("INTEGER");
        assert_eq!(field.effective_mode(), &FieldMode::Nullable);
        assert_eq!(field.effective_description(), "");
        assert!(field.typ.is_some());
        assert!(Field::new("PageNo").typ.is_none());
    }

    #[test]
    fn test_serialize_field() {
        let field = Field::new("phone")
            .with_type("string")
            .with_mode("required")
            .with_policy_tags(["tag-b", "tag-a"]);

        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "phone",
                "type": "STRING",
                "mode": "REQUIRED",
                "policyTags": { "names": ["tag-a", "tag-b"] }
            })
        );
    }
}
