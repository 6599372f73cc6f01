//! # JSON Schema Export
//!
//! Renders an [`ObjectSchema`] table as a JSON Schema (Draft 2020-12) document
//! so that consumers outside this crate can check payloads against the same
//! contract. Nested schemas are inlined; there are no `$ref`s.
//!
//! Mapping:
//!
//! - `Required` without a default goes into `required` (never for a partial schema)
//! - `nullable` adds `"null"` to the `type` list
//! - `Kind::Any` becomes the empty schema `{}`
//! - [`UnknownKeys::Reject`] sets `additionalProperties: false` on every object

use serde_json::{json, Map, Value};

use crate::options::UnknownKeys;
use crate::schema::{FieldSpec, Kind, ObjectSchema, Presence};

/// `$schema` URI emitted on the document root.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Export `schema` as a standalone JSON Schema document.
pub fn to_json_schema(schema: &ObjectSchema, unknown_keys: UnknownKeys) -> Value {
    let mut doc = object_schema(schema, unknown_keys);
    doc["$schema"] = json!(DRAFT_2020_12);
    doc["title"] = json!(schema.name());
    doc
}

fn object_schema(schema: &ObjectSchema, unknown_keys: UnknownKeys) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in schema.fields() {
        properties.insert(field.name.to_string(), field_schema(field, unknown_keys));
        if schema.presence_of(field) == Presence::Required && field.default.is_none() {
            required.push(json!(field.name));
        }
    }

    let mut doc = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        doc["required"] = Value::Array(required);
    }
    if unknown_keys == UnknownKeys::Reject {
        doc["additionalProperties"] = json!(false);
    }
    doc
}

fn field_schema(field: &FieldSpec, unknown_keys: UnknownKeys) -> Value {
    let mut doc = kind_schema(&field.kind, unknown_keys);
    if field.nullable {
        allow_null(&mut doc);
    }
    if let Some(default) = field.default {
        doc["default"] = default.to_value();
    }
    doc
}

fn kind_schema(kind: &Kind, unknown_keys: UnknownKeys) -> Value {
    match kind {
        Kind::String => json!({"type": "string"}),
        Kind::Integer => json!({"type": "integer", "minimum": i64::MIN, "maximum": i64::MAX}),
        Kind::Number => json!({"type": "number"}),
        Kind::Boolean => json!({"type": "boolean"}),
        Kind::Any => json!({}),
        Kind::Object(schema) => object_schema(schema, unknown_keys),
        Kind::Array(element) => json!({
            "type": "array",
            "items": kind_schema(element, unknown_keys),
        }),
    }
}

// The empty schema already admits null.
fn allow_null(doc: &mut Value) {
    if let Some(ty) = doc.get("type").and_then(Value::as_str).map(str::to_owned) {
        doc["type"] = json!([ty, "null"]);
    }
}
