//! Comparison configuration.

/// Knobs for the comparison rules that vary between table hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatConfig {
    /// Match sibling fields by exact name. When false, `PageNo` and `pageno`
    /// are the same field.
    pub case_sensitive_names: bool,

    /// Treat a missing `policyTags` block as equal to one with no names.
    pub empty_policy_tags_match_absent: bool,

    /// Compare field keys the engine does not model (anything other than
    /// name, type, mode, description, fields and policyTags) during
    /// equivalence checks.
    pub compare_extra_attributes: bool,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            case_sensitive_names: true,
            empty_policy_tags_match_absent: true,
            compare_extra_attributes: true,
        }
    }
}
