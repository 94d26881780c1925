/// Display rendering of decoded values.
///
/// Scalars render as their plain text; vectors and maps render as indented
/// JSON. Decoding never depends on this module.
use crate::types::Value;
use serde_json::{json, Map, Value as Json};

/// Render a value for display
pub fn render(value: &Value) -> String {
    if value.is_composite() {
        serde_json::to_string_pretty(&to_json(value)).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}

/// Project a value onto plain JSON.
///
/// Integers that do not fit a JSON number losslessly become strings. Maps
/// with textual keys become objects, anything else a list of pairs.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Void => Json::Null,
        Value::Bool(b) => json!(b),
        Value::U32(n) => json!(n),
        Value::I32(n) => json!(n),
        Value::U64(n) => json!(n),
        Value::I64(n) => json!(n),
        Value::U128(n) => match u64::try_from(*n) {
            Ok(small) => json!(small),
            Err(_) => json!(n.to_string()),
        },
        Value::I128(n) => match i64::try_from(*n) {
            Ok(small) => json!(small),
            Err(_) => json!(n.to_string()),
        },
        Value::Bytes(b) => json!(hex::encode(b)),
        Value::String(s) | Value::Symbol(s) | Value::Address(s) => json!(s),
        Value::Vec(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => {
            let textual = entries
                .iter()
                .all(|(k, _)| matches!(k, Value::String(_) | Value::Symbol(_)));
            if textual {
                let mut object = Map::new();
                for (k, v) in entries {
                    object.insert(k.to_string(), to_json(v));
                }
                Json::Object(object)
            } else {
                Json::Array(
                    entries
                        .iter()
                        .map(|(k, v)| json!([to_json(k), to_json(v)]))
                        .collect(),
                )
            }
        }
    }
}

/// Fixed-point integer to decimal, e.g. an index stored with six decimals
pub fn scaled(value: &Value, decimals: u32) -> Option<f64> {
    let raw = value.as_i128()?;
    Some(raw as f64 / 10f64.powi(decimals as i32))
}
