//! JSON views of record values, used by scenario files and reports.
//!
//! Integers accept JSON numbers or decimal / `0x` strings (for values beyond
//! 64 bits). Byte strings accept an array of bytes or a `0x` hex string.

use std::sync::Arc;

use serde_json::{Map, Number, Value as Json};

use crate::common::error::ConfigError;

use super::schema::{FieldKind, FieldSpec, RecordSchema};
use super::value::{RecordValue, Value};

impl RecordValue {
    /// Builds a value of `schema` from a JSON object keyed by field name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValueShape`] when the JSON does not match the schema.
    pub fn from_json(schema: &Arc<RecordSchema>, json: &Json) -> Result<Self, ConfigError> {
        record_from_json(schema, json, schema.name())
    }

    /// JSON object with one entry per field.
    pub fn to_json(&self) -> Json {
        let map: Map<String, Json> = self
            .fields()
            .iter()
            .map(|(name, value)| (name.clone(), value_to_json(value)))
            .collect();
        Json::Object(map)
    }
}

fn record_from_json(
    schema: &Arc<RecordSchema>,
    json: &Json,
    path: &str,
) -> Result<RecordValue, ConfigError> {
    let Json::Object(map) = json else {
        return Err(shape(path, "object"));
    };
    let mut value = RecordValue::new(schema);
    for field in schema.fields() {
        let field_path = format!("{path}.{}", field.name);
        let raw = map
            .get(&field.name)
            .ok_or_else(|| shape(&field_path, "present field"))?;
        value.insert(field.name.as_str(), field_from_json(field, raw, &field_path)?);
    }
    if let Some(extra) = map.keys().find(|k| schema.field(k).is_none()) {
        return Err(shape(&format!("{path}.{extra}"), "field of the schema"));
    }
    Ok(value)
}

fn field_from_json(field: &FieldSpec, json: &Json, path: &str) -> Result<Value, ConfigError> {
    match &field.kind {
        FieldKind::UnsignedInt => parse_u128(json)
            .map(Value::UInt)
            .ok_or_else(|| shape(path, "unsigned integer")),
        FieldKind::SignedInt => parse_i128(json)
            .map(Value::Int)
            .ok_or_else(|| shape(path, "signed integer")),
        FieldKind::FixedPoint { .. } => json
            .as_f64()
            .map(Value::Fixed)
            .ok_or_else(|| shape(path, "number")),
        FieldKind::ByteString { .. } => parse_bytes(json)
            .map(Value::Bytes)
            .ok_or_else(|| shape(path, "byte array or hex string")),
        FieldKind::Nested(inner) => record_from_json(inner, json, path).map(Value::Record),
    }
}

fn parse_u128(json: &Json) -> Option<u128> {
    match json {
        Json::Number(n) => n.as_u64().map(u128::from),
        Json::Bool(b) => Some(u128::from(*b)),
        Json::String(s) => s
            .strip_prefix("0x")
            .map_or_else(|| s.parse().ok(), |hex| u128::from_str_radix(hex, 16).ok()),
        _ => None,
    }
}

fn parse_i128(json: &Json) -> Option<i128> {
    match json {
        Json::Number(n) => n.as_i64().map(i128::from),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_bytes(json: &Json) -> Option<Vec<u8>> {
    match json {
        Json::Array(items) => items
            .iter()
            .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect(),
        Json::String(s) => {
            let hex = s.strip_prefix("0x").unwrap_or(s);
            if hex.len() % 2 != 0 {
                return None;
            }
            (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
                .collect()
        }
        _ => None,
    }
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Int(v) => i64::try_from(*v).map_or_else(|_| Json::String(v.to_string()), Json::from),
        Value::UInt(v) => u64::try_from(*v).map_or_else(|_| Json::String(format!("{v:#x}")), Json::from),
        Value::Fixed(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
        Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
        Value::Record(r) => r.to_json(),
    }
}

fn shape(field: &str, expected: &str) -> ConfigError {
    ConfigError::ValueShape {
        field: field.to_string(),
        expected: expected.to_string(),
    }
}
