//! Duck-typed argument coercion.
//!
//! Maps untyped JSON arguments onto [`Value`] by inspecting their runtime
//! shape. Only callers that cannot supply typed arguments should use this;
//! everything else builds [`Value`] directly.

use crate::encoder::is_valid_symbol;
use crate::error::CallError;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Rule deciding which strings are treated as addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressHeuristic {
    pub prefix: String,
    /// Strings must be strictly longer than this to count as addresses
    pub min_len_exclusive: usize,
}

impl Default for AddressHeuristic {
    fn default() -> Self {
        Self {
            prefix: "G".to_string(),
            min_len_exclusive: 20,
        }
    }
}

impl AddressHeuristic {
    pub fn looks_like_address(&self, s: &str) -> bool {
        s.starts_with(&self.prefix) && s.chars().count() > self.min_len_exclusive
    }
}

/// Coerce a JSON value into a typed value
pub fn coerce(arg: &Json, rule: &AddressHeuristic) -> Result<Value, CallError> {
    match arg {
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::I128(i128::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::I128(i128::from(u)))
            } else {
                Err(CallError::EncodingUnsupported(format!(
                    "{} is not an integer",
                    n
                )))
            }
        }
        Json::String(s) => Ok(coerce_text(s, rule)),
        Json::Array(items) => {
            let items = items
                .iter()
                .map(|item| coerce(item, rule))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Vec(items))
        }
        // lossy: composites and null travel as their JSON text
        Json::Object(_) | Json::Null => Ok(coerce_text(&arg.to_string(), rule)),
    }
}

/// Coerce a list of JSON arguments
pub fn coerce_all(args: &[Json], rule: &AddressHeuristic) -> Result<Vec<Value>, CallError> {
    args.iter().map(|arg| coerce(arg, rule)).collect()
}

fn coerce_text(s: &str, rule: &AddressHeuristic) -> Value {
    if rule.looks_like_address(s) {
        Value::Address(s.to_string())
    } else if is_valid_symbol(s) {
        Value::Symbol(s.to_string())
    } else {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_address_boundary_lengths() {
        let rule = AddressHeuristic::default();

        let twenty = format!("G{}", "A".repeat(19));
        assert_eq!(twenty.len(), 20);
        assert_eq!(coerce(&json!(twenty), &rule).unwrap(), Value::Symbol(twenty.clone()));

        let twenty_one = format!("G{}", "A".repeat(20));
        assert_eq!(twenty_one.len(), 21);
        assert_eq!(
            coerce(&json!(twenty_one), &rule).unwrap(),
            Value::Address(twenty_one.clone())
        );
    }

    #[test]
    fn test_numeric_string_with_prefix_is_address_shaped() {
        let rule = AddressHeuristic::default();
        let s = format!("G{}", "1".repeat(20));
        assert!(matches!(coerce(&json!(s), &rule).unwrap(), Value::Address(_)));
    }

    #[test]
    fn test_without_prefix_is_symbol() {
        let rule = AddressHeuristic::default();
        let s = "X".repeat(30);
        assert_eq!(coerce(&json!(s), &rule).unwrap(), Value::Symbol(s));
    }

    #[test]
    fn test_configurable_prefix() {
        let rule = AddressHeuristic {
            prefix: "C".to_string(),
            min_len_exclusive: 5,
        };
        assert!(matches!(coerce(&json!("CABCDEF"), &rule).unwrap(), Value::Address(_)));
        assert!(matches!(coerce(&json!("GABCDEF"), &rule).unwrap(), Value::Symbol(_)));
    }

    #[test]
    fn test_numbers_bools_and_lists() {
        let rule = AddressHeuristic::default();
        let args = coerce_all(&[json!(0), json!(true), json!([1, "isin"])], &rule).unwrap();
        assert_eq!(
            args,
            vec![
                Value::I128(0),
                Value::Bool(true),
                Value::Vec(vec![Value::I128(1), Value::Symbol("isin".to_string())]),
            ]
        );
    }

    #[test]
    fn test_float_rejected() {
        let err = coerce(&json!(1.5), &AddressHeuristic::default()).unwrap_err();
        assert!(matches!(err, CallError::EncodingUnsupported(_)));
    }

    #[test]
    fn test_object_becomes_text() {
        let value = coerce(&json!({ "a": 1 }), &AddressHeuristic::default()).unwrap();
        assert_eq!(value, Value::String("{\"a\":1}".to_string()));
    }
}
