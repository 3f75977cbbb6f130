//! Field-level change records.
//!
//! Changes between two schemas are classified as:
//!
//! - **Non-breaking**: the table can be altered in place (adding columns,
//!   relaxing `REQUIRED` to `NULLABLE`, editing descriptions or policy tags)
//! - **Breaking**: the table must be recreated (removing or renaming columns,
//!   changing a column type, any other mode change)

use serde::Serialize;

use super::field::{Field, FieldMode, FieldType, PolicyTags};

/// A change to a single field, identified by its dotted path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum FieldChange {
    /// A new field was added.
    Added {
        path: String,
        field: Field,
    },

    /// A field was removed (or renamed away).
    Removed {
        path: String,
        field: Field,
    },

    /// A field's normalized type changed, or appeared/disappeared.
    TypeChanged {
        path: String,
        old_type: Option<FieldType>,
        new_type: Option<FieldType>,
    },

    /// A field's effective mode changed.
    ModeChanged {
        path: String,
        old_mode: FieldMode,
        new_mode: FieldMode,
    },

    /// A field's effective description changed.
    DescriptionChanged {
        path: String,
        old_description: String,
        new_description: String,
    },

    /// A field's policy tag block changed.
    PolicyTagsChanged {
        path: String,
        old_tags: Option<PolicyTags>,
        new_tags: Option<PolicyTags>,
    },

    /// A key the engine does not model changed value.
    AttributeChanged {
        path: String,
        key: String,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
    },
}

impl FieldChange {
    /// Whether this change forces the table to be recreated.
    pub fn is_breaking(&self) -> bool {
        match self {
            FieldChange::Added { .. } => false,
            FieldChange::Removed { .. } => true,
            FieldChange::TypeChanged {
                old_type, new_type, ..
            } => {
                // A side without a type cannot be judged.
                old_type.is_some() && new_type.is_some()
            }
            FieldChange::ModeChanged {
                old_mode, new_mode, ..
            } => !old_mode.can_transition_to(new_mode),
            FieldChange::DescriptionChanged { .. } => false,
            FieldChange::PolicyTagsChanged { .. } => false,
            FieldChange::AttributeChanged { .. } => false,
        }
    }

    /// Dotted path of the field this change concerns.
    pub fn path(&self) -> &str {
        match self {
            FieldChange::Added { path, .. }
            | FieldChange::Removed { path, .. }
            | FieldChange::TypeChanged { path, .. }
            | FieldChange::ModeChanged { path, .. }
            | FieldChange::DescriptionChanged { path, .. }
            | FieldChange::PolicyTagsChanged { path, .. }
            | FieldChange::AttributeChanged { path, .. } => path,
        }
    }

    /// One-line description without the breaking marker.
    pub fn describe(&self) -> String {
        match self {
            FieldChange::Added { path, field } => {
                let typ = field
                    .typ
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "<untyped>".to_string());
                format!("+ Field '{}': {} {}", path, typ, field.effective_mode())
            }
            FieldChange::Removed { path, .. } => format!("- Field '{}' removed", path),
            FieldChange::TypeChanged {
                path,
                old_type,
                new_type,
            } => format!(
                "~ Field '{}' type changed: {} -> {}",
                path,
                display_type(old_type),
                display_type(new_type)
            ),
            FieldChange::ModeChanged {
                path,
                old_mode,
                new_mode,
            } => format!("~ Field '{}' mode changed: {} -> {}", path, old_mode, new_mode),
            FieldChange::DescriptionChanged { path, .. } => {
                format!("~ Field '{}' description changed", path)
            }
            FieldChange::PolicyTagsChanged { path, .. } => {
                format!("~ Field '{}' policy tags changed", path)
            }
            FieldChange::AttributeChanged { path, key, .. } => {
                format!("~ Field '{}' attribute '{}' changed", path, key)
            }
        }
    }
}

fn display_type(typ: &Option<FieldType>) -> String {
    typ.as_ref()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "<missing>".to_string())
}

/// The changes between two schemas, in deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaDiff {
    /// List of field changes.
    pub changes: Vec<FieldChange>,
}

impl SchemaDiff {
    pub fn new(changes: Vec<FieldChange>) -> Self {
        Self { changes }
    }

    /// Whether the two schemas are equivalent.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether this diff contains any breaking changes.
    pub fn is_breaking(&self) -> bool {
        self.changes.iter().any(|c| c.is_breaking())
    }

    /// Get all breaking changes.
    pub fn breaking_changes(&self) -> Vec<&FieldChange> {
        self.changes.iter().filter(|c| c.is_breaking()).collect()
    }

    /// Format the diff for display.
    pub fn format_changes(&self) -> String {
        self.changes
            .iter()
            .map(|change| {
                let marker = if change.is_breaking() { "(BREAKING)" } else { "(OK)" };
                format!("  {} {}", change.describe(), marker)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
