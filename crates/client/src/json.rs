//! Bridge between JSON and wire values.
//!
//! Transports that speak JSON hand their payloads through here. JSON has no
//! timestamps, decimals or blobs, so those render as a number (milliseconds),
//! a string and an array of bytes, and come back as plain numbers, text and
//! lists.

use mirra_core::{DynamicValue, MetaKey};
use serde_json::{Map, Number, Value};

/// Converts a JSON value into a wire value.
///
/// Integers become `Int`, or `UInt` above `i64::MAX`; other numbers become
/// `Double`; objects become named maps.
pub fn to_dynamic(value: &Value) -> DynamicValue {
    match value {
        Value::Null => DynamicValue::Null,
        Value::Bool(b) => DynamicValue::Bool(*b),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                DynamicValue::Int(v)
            } else if let Some(v) = n.as_u64() {
                DynamicValue::UInt(v)
            } else {
                DynamicValue::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => DynamicValue::Text(s.clone()),
        Value::Array(items) => DynamicValue::List(items.iter().map(to_dynamic).collect()),
        Value::Object(map) => DynamicValue::NamedMap(
            map.iter()
                .map(|(k, v)| (k.clone(), to_dynamic(v)))
                .collect(),
        ),
    }
}

/// Converts a wire value into JSON.
///
/// Metadata wrappers are dropped. Non-finite doubles become `null`. Integer
/// map keys are rendered as strings.
pub fn from_dynamic(value: &DynamicValue) -> Value {
    match value {
        DynamicValue::Null => Value::Null,
        DynamicValue::Bool(b) => Value::Bool(*b),
        DynamicValue::Int(v) => Value::Number((*v).into()),
        DynamicValue::UInt(v) => Value::Number((*v).into()),
        DynamicValue::Double(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
        DynamicValue::Decimal(d) => Value::String(d.to_string()),
        DynamicValue::Blob(bytes) => {
            Value::Array(bytes.iter().map(|b| Value::Number((*b).into())).collect())
        }
        DynamicValue::Text(s) => Value::String(s.clone()),
        DynamicValue::DateTime(ts) => Value::Number((*ts).into()),
        DynamicValue::List(items) => Value::Array(items.iter().map(from_dynamic).collect()),
        DynamicValue::NamedMap(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), from_dynamic(v)))
                .collect(),
        ),
        DynamicValue::IndexedMap(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), from_dynamic(v)))
                .collect(),
        ),
        DynamicValue::MetaMap(map) => {
            let mut object = Map::with_capacity(map.len());
            for (key, v) in map {
                let key = match key {
                    MetaKey::Index(i) => i.to_string(),
                    MetaKey::Name(name) => name.clone(),
                };
                object.insert(key, from_dynamic(v));
            }
            Value::Object(object)
        }
        DynamicValue::WithMetadata { value, .. } => from_dynamic(value),
    }
}

/// Parses JSON text into a wire value.
pub fn parse(text: &str) -> Result<DynamicValue, serde_json::Error> {
    serde_json::from_str::<Value>(text).map(|v| to_dynamic(&v))
}
