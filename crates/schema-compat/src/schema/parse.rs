//! Decoding of raw schema text into [`Schema`] trees.
//!
//! The decoder never panics. Every structural problem comes back as a
//! [`SchemaError`]; a field without a `type` key is not a problem and decodes
//! with `typ: None`.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use super::field::{Field, FieldMode, FieldType, PolicyTags, Schema};
use crate::diagnostic::SchemaError;

/// Keys modelled explicitly on [`Field`]. Anything else lands in `extra`.
const KNOWN_KEYS: &[&str] = &["name", "type", "mode", "description", "fields", "policyTags"];

/// Decode raw schema text.
///
/// The text must be a JSON document. Empty text is not, and fails with
/// [`SchemaError::NotValidJson`]; use `null` or `[]` for the empty schema.
pub fn parse_schema(raw: &str) -> Result<Schema, SchemaError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| SchemaError::NotValidJson {
        message: e.to_string(),
    })?;

    schema_from_value(&value)
}

/// Decode an already-parsed JSON value.
pub fn schema_from_value(value: &Value) -> Result<Schema, SchemaError> {
    match value {
        Value::Null => Ok(Schema::default()),
        Value::Array(items) => Ok(Schema::new(parse_field_list(items, "")?)),
        other => Err(SchemaError::NotAJsonArray {
            found: json_kind(other),
        }),
    }
}

fn parse_field_list(items: &[Value], parent: &str) -> Result<Vec<Field>, SchemaError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_field(item, parent, index))
        .collect()
}

fn parse_field(value: &Value, parent: &str, index: usize) -> Result<Field, SchemaError> {
    let location = element_path(parent, index);

    let object = match value {
        Value::Object(object) => object,
        Value::Null => return Err(SchemaError::ContainsNilElement { path: location }),
        other => {
            return Err(SchemaError::malformed(
                location,
                format!("expected a field object, found {}", json_kind(other)),
            ))
        }
    };

    let name = match object.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => {
            return Err(SchemaError::malformed(
                location,
                format!("'name' must be a string, found {}", json_kind(other)),
            ))
        }
        None => return Err(SchemaError::malformed(location, "missing 'name'")),
    };

    let path = child_path(parent, &name);

    let typ = optional_string(object, "type", &path)?.map(FieldType::new);
    let mode = optional_string(object, "mode", &path)?.map(FieldMode::parse);
    let description = optional_string(object, "description", &path)?.map(str::to_string);

    let policy_tags = match object.get("policyTags") {
        None | Some(Value::Null) => None,
        Some(tags) => Some(parse_policy_tags(tags, &path)?),
    };

    let fields = match object.get("fields") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => parse_field_list(items, &path)?,
        Some(other) => {
            return Err(SchemaError::malformed(
                path,
                format!("'fields' must be an array, found {}", json_kind(other)),
            ))
        }
    };

    let extra: BTreeMap<String, Value> = object
        .iter()
        .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Field {
        name,
        typ,
        mode,
        description,
        policy_tags,
        fields,
        extra,
    })
}

/// Read a string-valued key. A missing key and an explicit `null` are both
/// `None`.
fn optional_string<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a str>, SchemaError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(other) => Err(SchemaError::malformed(
            path,
            format!("'{}' must be a string, found {}", key, json_kind(other)),
        )),
    }
}

/// Decode `{"names": [...], ...}`. A missing or null `names` list is an empty
/// set; other keys are kept in `extra`.
fn parse_policy_tags(value: &Value, path: &str) -> Result<PolicyTags, SchemaError> {
    let object = value.as_object().ok_or_else(|| {
        SchemaError::malformed(
            path,
            format!("'policyTags' must be an object, found {}", json_kind(value)),
        )
    })?;

    let names = match object.get("names") {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| match name {
                Value::String(name) => Ok(name.clone()),
                other => Err(SchemaError::malformed(
                    path,
                    format!("policy tag names must be strings, found {}", json_kind(other)),
                )),
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(SchemaError::malformed(
                path,
                format!("'policyTags.names' must be an array, found {}", json_kind(other)),
            ))
        }
    };

    let extra = object
        .iter()
        .filter(|(key, _)| key.as_str() != "names")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(PolicyTags { names, extra })
}

/// Dotted path of a named field below `parent`.
pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn element_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
