//! Recursive schema comparison.
//!
//! One tree walk serves three questions. Siblings are matched by name through
//! an ordered index at every depth, so input order never matters and output
//! order is always the sorted name order.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;

use super::diff::{FieldChange, SchemaDiff};
use super::field::{Field, PolicyTags, Schema};
use super::parse::child_path;
use crate::config::CompatConfig;

/// What a walk is trying to decide, and therefore when it may stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Stop at the first difference of any kind.
    Equivalence,
    /// Stop at the first breaking difference.
    Changeability,
    /// Visit the whole tree and record everything.
    Report,
}

/// Whether the two schemas describe the same structure once ordering, case,
/// type aliases and defaulted attributes are disregarded.
pub fn equivalent(config: &CompatConfig, old: &Schema, new: &Schema) -> bool {
    walk(config, ComparisonMode::Equivalence, old, new).is_empty()
}

/// Whether `new` can replace `old` without recreating the table.
pub fn changeable(config: &CompatConfig, old: &Schema, new: &Schema) -> bool {
    !walk(config, ComparisonMode::Changeability, old, new).is_breaking()
}

/// Every change between `old` and `new`.
pub fn diff(config: &CompatConfig, old: &Schema, new: &Schema) -> SchemaDiff {
    walk(config, ComparisonMode::Report, old, new)
}

fn walk(config: &CompatConfig, mode: ComparisonMode, old: &Schema, new: &Schema) -> SchemaDiff {
    let mut walker = Walker {
        config,
        mode,
        changes: Vec::new(),
    };
    // A break only means the mode has seen enough.
    let _ = walker.compare_siblings("", &old.fields, &new.fields);
    SchemaDiff::new(walker.changes)
}

struct Walker<'a> {
    config: &'a CompatConfig,
    mode: ComparisonMode,
    changes: Vec<FieldChange>,
}

impl Walker<'_> {
    fn record(&mut self, change: FieldChange) -> ControlFlow<()> {
        let stop = match self.mode {
            ComparisonMode::Equivalence => true,
            ComparisonMode::Changeability => change.is_breaking(),
            ComparisonMode::Report => false,
        };
        tracing::trace!(path = change.path(), breaking = change.is_breaking(), "schema change");
        self.changes.push(change);
        if stop {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn index_key(&self, name: &str) -> String {
        if self.config.case_sensitive_names {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }

    /// Later duplicates of a name shadow earlier ones.
    fn index<'f>(&self, fields: &'f [Field]) -> BTreeMap<String, &'f Field> {
        fields
            .iter()
            .map(|field| (self.index_key(&field.name), field))
            .collect()
    }

    fn compare_siblings(&mut self, parent: &str, old: &[Field], new: &[Field]) -> ControlFlow<()> {
        let old_index = self.index(old);
        let new_index = self.index(new);

        let keys: BTreeSet<&String> = old_index.keys().chain(new_index.keys()).collect();

        for key in keys {
            match (old_index.get(key), new_index.get(key)) {
                (Some(old_field), Some(new_field)) => {
                    self.compare_field(parent, old_field, new_field)?;
                }
                (Some(old_field), None) => {
                    self.record(FieldChange::Removed {
                        path: child_path(parent, &old_field.name),
                        field: (*old_field).clone(),
                    })?;
                }
                (None, Some(new_field)) => {
                    self.record(FieldChange::Added {
                        path: child_path(parent, &new_field.name),
                        field: (*new_field).clone(),
                    })?;
                }
                (None, None) => {}
            }
        }

        ControlFlow::Continue(())
    }

    fn compare_field(&mut self, parent: &str, old: &Field, new: &Field) -> ControlFlow<()> {
        let path = child_path(parent, &new.name);

        if old.typ != new.typ {
            self.record(FieldChange::TypeChanged {
                path: path.clone(),
                old_type: old.typ.clone(),
                new_type: new.typ.clone(),
            })?;
        }

        if old.effective_mode() != new.effective_mode() {
            self.record(FieldChange::ModeChanged {
                path: path.clone(),
                old_mode: old.effective_mode().clone(),
                new_mode: new.effective_mode().clone(),
            })?;
        }

        if old.effective_description() != new.effective_description() {
            self.record(FieldChange::DescriptionChanged {
                path: path.clone(),
                old_description: old.effective_description().to_string(),
                new_description: new.effective_description().to_string(),
            })?;
        }

        if !self.policy_tags_match(old, new) {
            self.record(FieldChange::PolicyTagsChanged {
                path: path.clone(),
                old_tags: old.policy_tags.clone(),
                new_tags: new.policy_tags.clone(),
            })?;
        }

        if self.config.compare_extra_attributes {
            let keys: BTreeSet<&String> = old.extra.keys().chain(new.extra.keys()).collect();
            for key in keys {
                let old_value = old.extra.get(key);
                let new_value = new.extra.get(key);
                if old_value != new_value {
                    self.record(FieldChange::AttributeChanged {
                        path: path.clone(),
                        key: key.clone(),
                        old_value: old_value.cloned(),
                        new_value: new_value.cloned(),
                    })?;
                }
            }
        }

        self.compare_siblings(&path, &old.fields, &new.fields)
    }

    /// Tag names always count; other keys of the block count only when
    /// extra attributes are compared.
    fn policy_tags_match(&self, old: &Field, new: &Field) -> bool {
        let empty = PolicyTags::default();
        let (old_tags, new_tags) = match (&old.policy_tags, &new.policy_tags) {
            (Some(old_tags), Some(new_tags)) => (old_tags, new_tags),
            (None, None) => return true,
            (old_tags, new_tags) => {
                if !self.config.empty_policy_tags_match_absent {
                    return false;
                }
                (old_tags.as_ref().unwrap_or(&empty), new_tags.as_ref().unwrap_or(&empty))
            }
        };

        old_tags.names == new_tags.names
            && (!self.config.compare_extra_attributes || old_tags.extra == new_tags.extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldMode;

    fn defaults() -> CompatConfig {
        CompatConfig::default()
    }

    fn schema(fields: Vec<Field>) -> Schema {
        Schema::new(fields)
    }

    #[test]
    fn test_empty_schemas_are_equivalent() {
        assert!(equivalent(&defaults(), &Schema::default(), &Schema::default()));
    }

    #[test]
    fn test_empty_to_non_empty_is_not_equivalent() {
        let new = schema(vec![Field::new("PageNo").with_type("INTEGER")]);
        assert!(!equivalent(&defaults(), &Schema::default(), &new));
        assert!(changeable(&defaults(), &Schema::default(), &new));
    }

    #[test]
    fn test_default_mode_and_description() {
        let old = schema(vec![Field::new("PageNo").with_type("INTEGER")]);
        let new = schema(vec![Field::new("PageNo")
            .with_type("int64")
            .with_mode("nullable")
            .with_description("")]);
        assert!(equivalent(&defaults(), &old, &new));
    }

    #[test]
    fn test_nested_reordering_is_equivalent() {
        let old = schema(vec![
            Field::new("a").with_type("RECORD").with_fields(vec![
                Field::new("x").with_type("STRING"),
                Field::new("y").with_type("BOOL"),
            ]),
            Field::new("b").with_type("DATE"),
        ]);
        let new = schema(vec![
            Field::new("b").with_type("DATE"),
            Field::new("a").with_type("RECORD").with_fields(vec![
                Field::new("y").with_type("BOOLEAN"),
                Field::new("x").with_type("STRING"),
            ]),
        ]);
        assert!(equivalent(&defaults(), &old, &new));
        assert!(diff(&defaults(), &old, &new).is_empty());
    }

    #[test]
    fn test_removal_stops_changeability() {
        let old = schema(vec![
            Field::new("value1").with_type("INTEGER"),
            Field::new("value2").with_type("BOOLEAN"),
        ]);
        let new = schema(vec![
            Field::new("value3").with_type("BOOLEAN"),
            Field::new("value1").with_type("INTEGER"),
        ]);
        assert!(!changeable(&defaults(), &old, &new));

        let report = diff(&defaults(), &old, &new);
        let paths: Vec<&str> = report.changes.iter().map(|c| c.path()).collect();
        assert_eq!(paths, vec!["value2", "value3"]);
        assert_eq!(report.breaking_changes().len(), 1);
    }

    #[test]
    fn test_nested_incompatibility_propagates() {
        let old = schema(vec![Field::new("outer")
            .with_type("RECORD")
            .with_fields(vec![Field::new("inner").with_type("BOOL").with_mode("REQUIRED")])]);
        let new = schema(vec![Field::new("outer")
            .with_type("RECORD")
            .with_fields(vec![Field::new("inner").with_type("BOOL").with_mode("REPEATED")])]);
        assert!(!changeable(&defaults(), &old, &new));

        let report = diff(&defaults(), &old, &new);
        assert_eq!(
            report.changes,
            vec![FieldChange::ModeChanged {
                path: "outer.inner".to_string(),
                old_mode: FieldMode::Required,
                new_mode: FieldMode::Repeated,
            }]
        );
    }

    #[test]
    fn test_nested_addition_is_changeable() {
        let old = schema(vec![Field::new("outer")
            .with_type("RECORD")
            .with_fields(vec![Field::new("a").with_type("STRING")])]);
        let new = schema(vec![Field::new("outer").with_type("RECORD").with_fields(vec![
            Field::new("a").with_type("STRING"),
            Field::new("b").with_type("STRING"),
        ])]);
        assert!(changeable(&defaults(), &old, &new));
        assert!(!equivalent(&defaults(), &old, &new));
    }

    #[test]
    fn test_equivalence_stops_at_first_change() {
        let old = schema(vec![
            Field::new("a").with_type("STRING"),
            Field::new("b").with_type("STRING"),
        ]);
        let new = schema(vec![
            Field::new("a").with_type("INT64"),
            Field::new("b").with_type("INT64"),
        ]);
        assert_eq!(walk(&defaults(), ComparisonMode::Equivalence, &old, &new).changes.len(), 1);
        assert_eq!(walk(&defaults(), ComparisonMode::Report, &old, &new).changes.len(), 2);
    }

    #[test]
    fn test_case_insensitive_names() {
        let old = schema(vec![Field::new("PageNo").with_type("INTEGER")]);
        let new = schema(vec![Field::new("pageno").with_type("INTEGER")]);
        assert!(!changeable(&defaults(), &old, &new));

        let config = CompatConfig {
            case_sensitive_names: false,
            ..CompatConfig::default()
        };
        assert!(changeable(&config, &old, &new));
        assert!(equivalent(&config, &old, &new));
    }

    #[test]
    fn test_policy_tag_absence() {
        let old = schema(vec![Field::new("a").with_type("STRING")]);
        let new = schema(vec![Field::new("a")
            .with_type("STRING")
            .with_policy_tags(Vec::<String>::new())]);
        assert!(equivalent(&defaults(), &old, &new));

        let strict = CompatConfig {
            empty_policy_tags_match_absent: false,
            ..CompatConfig::default()
        };
        assert!(!equivalent(&strict, &old, &new));
        assert!(changeable(&strict, &old, &new));
    }

    #[test]
    fn test_policy_tag_order_is_irrelevant() {
        let old = schema(vec![Field::new("a").with_policy_tags(["t1", "t2"])]);
        let new = schema(vec![Field::new("a").with_policy_tags(["t2", "t1"])]);
        assert!(equivalent(&defaults(), &old, &new));
    }

    #[test]
    fn test_policy_tag_block_keys() {
        let mut tagged = Field::new("a").with_type("STRING").with_policy_tags(["t1"]);
        if let Some(tags) = tagged.policy_tags.as_mut() {
            tags.extra
                .insert("taxonomy".to_string(), serde_json::Value::from("pii"));
        }
        let old = schema(vec![tagged]);
        let new = schema(vec![Field::new("a").with_type("STRING").with_policy_tags(["t1"])]);

        assert!(!equivalent(&defaults(), &old, &new));
        assert!(changeable(&defaults(), &old, &new));
        let report = diff(&defaults(), &old, &new);
        assert!(matches!(
            report.changes.as_slice(),
            [FieldChange::PolicyTagsChanged { path, .. }] if path == "a"
        ));

        let lenient = CompatConfig {
            compare_extra_attributes: false,
            ..CompatConfig::default()
        };
        assert!(equivalent(&lenient, &old, &new));
    }

    #[test]
    fn test_extra_attributes() {
        let mut with_key = Field::new("a").with_type("INT64");
        with_key
            .extra
            .insert("anotherKey".to_string(), serde_json::Value::from("anotherValue"));
        let old = schema(vec![with_key]);
        let new = schema(vec![Field::new("a").with_type("INT64")]);

        assert!(!equivalent(&defaults(), &old, &new));
        assert!(changeable(&defaults(), &old, &new));

        let lenient = CompatConfig {
            compare_extra_attributes: false,
            ..CompatConfig::default()
        };
        assert!(equivalent(&lenient, &old, &new));
    }
}
