/// Encoding of typed values into Soroban `ScVal` wire values
use crate::address::parse_address;
use crate::error::CallError;
use crate::types::Value;
use base64::Engine;
use stellar_xdr::curr::{
    BytesM, Int128Parts, Limits, ScBytes, ScMap, ScMapEntry, ScString, ScSymbol, ScVal, ScVec,
    StringM, UInt128Parts, VecM, WriteXdr,
};

/// Longest symbol the Soroban host accepts
pub const MAX_SYMBOL_LEN: usize = 32;

/// Whether `s` can be carried as an `ScSymbol`
pub fn is_valid_symbol(s: &str) -> bool {
    s.len() <= MAX_SYMBOL_LEN && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Encode a single value
pub fn encode(value: &Value) -> Result<ScVal, CallError> {
    match value {
        Value::Void => Ok(ScVal::Void),
        Value::Bool(b) => Ok(ScVal::Bool(*b)),
        Value::U32(n) => Ok(ScVal::U32(*n)),
        Value::I32(n) => Ok(ScVal::I32(*n)),
        Value::U64(n) => Ok(ScVal::U64(*n)),
        Value::I64(n) => Ok(ScVal::I64(*n)),
        Value::U128(n) => Ok(ScVal::U128(UInt128Parts {
            hi: (*n >> 64) as u64,
            lo: *n as u64,
        })),
        Value::I128(n) => Ok(ScVal::I128(Int128Parts {
            hi: (*n >> 64) as i64,
            lo: *n as u64,
        })),
        Value::Bytes(bytes) => {
            let bytes: BytesM = bytes
                .clone()
                .try_into()
                .map_err(|e| CallError::EncodingUnsupported(format!("bytes: {}", e)))?;
            Ok(ScVal::Bytes(ScBytes(bytes)))
        }
        Value::String(s) => {
            let s: StringM = s
                .as_bytes()
                .to_vec()
                .try_into()
                .map_err(|e| CallError::EncodingUnsupported(format!("string: {}", e)))?;
            Ok(ScVal::String(ScString(s)))
        }
        Value::Symbol(s) => {
            if !is_valid_symbol(s) {
                return Err(CallError::EncodingUnsupported(format!(
                    "'{}' is not a valid symbol (max {} chars of [a-zA-Z0-9_])",
                    s, MAX_SYMBOL_LEN
                )));
            }
            let s: StringM<32> = s
                .as_bytes()
                .to_vec()
                .try_into()
                .map_err(|e| CallError::EncodingUnsupported(format!("symbol: {}", e)))?;
            Ok(ScVal::Symbol(ScSymbol(s)))
        }
        Value::Address(s) => Ok(ScVal::Address(parse_address(s)?)),
        Value::Vec(items) => {
            let items: VecM<ScVal> = encode_args(items)?
                .try_into()
                .map_err(|e| CallError::EncodingUnsupported(format!("vec: {}", e)))?;
            Ok(ScVal::Vec(Some(ScVec(items))))
        }
        Value::Map(entries) => {
            let mut encoded = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                encoded.push(ScMapEntry {
                    key: encode(k)?,
                    val: encode(v)?,
                });
            }
            // the host only accepts maps with ascending keys
            encoded.sort_by(|a, b| a.key.cmp(&b.key));
            let encoded: VecM<ScMapEntry> = encoded
                .try_into()
                .map_err(|e| CallError::EncodingUnsupported(format!("map: {}", e)))?;
            Ok(ScVal::Map(Some(ScMap(encoded))))
        }
    }
}

/// Encode call arguments in order, failing on the first unsupported one
pub fn encode_args(args: &[Value]) -> Result<Vec<ScVal>, CallError> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| {
            encode(arg).map_err(|e| match e {
                CallError::EncodingUnsupported(msg) => {
                    CallError::EncodingUnsupported(format!("argument {}: {}", i, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// Encode a value as base64 XDR
pub fn encode_base64(value: &Value) -> Result<String, CallError> {
    let scval = encode(value)?;
    let bytes = scval
        .to_xdr(Limits::none())
        .map_err(|e| CallError::EncodingUnsupported(format!("XDR write: {}", e)))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_i128_parts() {
        let scval = encode(&Value::I128(-1)).unwrap();
        assert_eq!(scval, ScVal::I128(Int128Parts { hi: -1, lo: u64::MAX }));

        let scval = encode(&Value::I128(4_200_000_000)).unwrap();
        assert_eq!(scval, ScVal::I128(Int128Parts { hi: 0, lo: 4_200_000_000 }));
    }

    #[test]
    fn test_encode_u128_high_bits() {
        let scval = encode(&Value::U128(1u128 << 64)).unwrap();
        assert_eq!(scval, ScVal::U128(UInt128Parts { hi: 1, lo: 0 }));
    }

    #[test]
    fn test_symbol_validation() {
        assert!(is_valid_symbol("max_total_supply"));
        assert!(is_valid_symbol(""));
        assert!(!is_valid_symbol("has space"));
        assert!(!is_valid_symbol(&"a".repeat(33)));

        let err = encode(&Value::Symbol("{\"a\":1}".to_string())).unwrap_err();
        assert!(matches!(err, CallError::EncodingUnsupported(_)));
    }

    #[test]
    fn test_invalid_address_names_argument() {
        let err = encode_args(&[Value::U32(1), Value::Address("G123".to_string())]).unwrap_err();
        assert!(err.to_string().contains("argument 1"));
    }

    #[test]
    fn test_map_keys_sorted() {
        let value = Value::Map(vec![
            (Value::Symbol("rate".to_string()), Value::I128(4)),
            (Value::Symbol("isin".to_string()), Value::Symbol("BR".to_string())),
        ]);
        match encode(&value).unwrap() {
            ScVal::Map(Some(map)) => {
                assert_eq!(map.0[0].key, encode(&Value::Symbol("isin".to_string())).unwrap());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_encode_base64_bool() {
        // ScValType::Bool = 0, followed by the 4-byte bool
        assert_eq!(encode_base64(&Value::Bool(true)).unwrap(), "AAAAAAAAAAE=");
    }
}
