//! Response filtering of server-only fields

use crate::core::field::FieldSpec;
use serde_json::{Map, Value};

/// Project a resource instance down to its client-visible fields.
///
/// Walks the declared fields in order and copies each value into a fresh
/// object, skipping:
/// - fields flagged `server_only`
/// - the soft-delete field when its value is `true` (regardless of its flag)
///
/// A declared field missing from the instance is copied as JSON `null`, so
/// the resulting key set always matches the declared public schema. Undeclared
/// keys on the instance are never copied.
pub fn filter_resource(
    fields: &[FieldSpec],
    soft_delete_field: Option<&str>,
    instance: &Value,
) -> Value {
    let mut filtered = Map::with_capacity(fields.len());

    for field in fields {
        if field.server_only {
            continue;
        }

        let value = instance.get(&field.name).cloned().unwrap_or(Value::Null);

        if soft_delete_field == Some(field.name.as_str()) && value == Value::Bool(true) {
            continue;
        }

        filtered.insert(field.name.clone(), value);
    }

    Value::Object(filtered)
}
