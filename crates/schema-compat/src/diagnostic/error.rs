//! Schema decoding error types.
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while decoding raw schema text.
///
/// Only the strict path surfaces these. A field without a `type` key is not
/// an error; it decodes with the type left absent.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    // =========================================================================
    // Top-level Errors
    // =========================================================================
    #[error("Schema is not valid JSON: {message}")]
    #[diagnostic(
        code(schema_compat::parse::not_valid_json),
        help("A schema must be `null` or a JSON array of field objects")
    )]
    NotValidJson {
        message: String,
    },

    #[error("Schema must be a JSON array, found {found}")]
    #[diagnostic(
        code(schema_compat::parse::not_a_json_array),
        help("Wrap the field objects in `[ ... ]`")
    )]
    NotAJsonArray {
        found: &'static str,
    },

    #[error("Schema contains a null element at {path}")]
    #[diagnostic(
        code(schema_compat::parse::contains_nil_element),
        help("Remove the `null` entry or replace it with a field object")
    )]
    ContainsNilElement {
        path: String,
    },

    // =========================================================================
    // Field Errors
    // =========================================================================
    #[error("Malformed field at '{path}': {reason}")]
    #[diagnostic(code(schema_compat::parse::malformed_field))]
    MalformedField {
        path: String,
        reason: String,
    },
}

impl SchemaError {
    /// Creates a malformed field error.
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Stable diagnostic code, handy for callers that map errors onto their
    /// own signal conventions.
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaError::NotValidJson { .. } => "not_valid_json",
            SchemaError::NotAJsonArray { .. } => "not_a_json_array",
            SchemaError::ContainsNilElement { .. } => "contains_nil_element",
            SchemaError::MalformedField { .. } => "malformed_field",
        }
    }
}
