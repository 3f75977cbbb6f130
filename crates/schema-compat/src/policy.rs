//! Entry points for a change-planning host.
//!
//! A planner asks two questions about a table's schema attribute:
//!
//! - during refresh, is the server's schema text the same as the declared
//!   text ([`SchemaPolicy::are_schemas_equivalent`])? A `true` answer
//!   suppresses a spurious diff.
//! - during planning, does the edit force the table to be recreated
//!   ([`SchemaPolicy::classify_schema_change`])?
//!
//! The equivalence path is advisory and swallows decode failures as "not
//! equivalent", so an oddly encoded difference is still shown. The
//! classification path is not: malformed text is returned as an error rather
//! than guessed at.

use crate::config::CompatConfig;
use crate::diagnostic::SchemaError;
use crate::schema::{self, Schema, SchemaDiff};

/// Comparison rules bound to a configuration.
#[derive(Debug, Clone, Default)]
pub struct SchemaPolicy {
    config: CompatConfig,
}

impl SchemaPolicy {
    /// Creates a policy with the given configuration.
    pub fn new(config: CompatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompatConfig {
        &self.config
    }

    /// Decide whether changing the schema text from `old_raw` to `new_raw`
    /// forces the table to be recreated.
    ///
    /// Returns `Ok(true)` for force-replace, `Ok(false)` for an in-place
    /// update. Both sides must decode; empty text is an error, not an empty
    /// schema.
    pub fn classify_schema_change(&self, old_raw: &str, new_raw: &str) -> Result<bool, SchemaError> {
        let old = schema::parse_schema(old_raw)?;
        let new = schema::parse_schema(new_raw)?;

        let force_replace = !self.changeable(&old, &new);
        tracing::debug!(force_replace, "classified schema change");
        Ok(force_replace)
    }

    /// Decide whether two schema texts describe the same schema.
    ///
    /// Never fails: text that cannot be decoded is reported as not
    /// equivalent.
    pub fn are_schemas_equivalent(&self, old_raw: &str, new_raw: &str) -> bool {
        let old = match schema::parse_schema(old_raw) {
            Ok(old) => old,
            Err(e) => {
                tracing::debug!(error = %e, "unable to decode old schema");
                return false;
            }
        };
        let new = match schema::parse_schema(new_raw) {
            Ok(new) => new,
            Err(e) => {
                tracing::debug!(error = %e, "unable to decode new schema");
                return false;
            }
        };

        self.equivalent(&old, &new)
    }

    /// Full change report between two schema texts.
    pub fn diff_schema_text(&self, old_raw: &str, new_raw: &str) -> Result<SchemaDiff, SchemaError> {
        let old = schema::parse_schema(old_raw)?;
        let new = schema::parse_schema(new_raw)?;
        Ok(self.diff(&old, &new))
    }

    pub fn equivalent(&self, old: &Schema, new: &Schema) -> bool {
        schema::equivalent(&self.config, old, new)
    }

    pub fn changeable(&self, old: &Schema, new: &Schema) -> bool {
        schema::changeable(&self.config, old, new)
    }

    pub fn diff(&self, old: &Schema, new: &Schema) -> SchemaDiff {
        schema::diff(&self.config, old, new)
    }
}
