/// XDR decoder for Soroban contract return values
use crate::address::format_address;
use crate::error::CallError;
use crate::types::Value;
use base64::Engine;
use std::string::String as StdString;
use std::vec::Vec as StdVec;
use stellar_xdr::curr::{Limits, ReadXdr, ScVal};

/// Decode a base64-encoded XDR SCVal into a native value
pub fn decode_scval(xdr_base64: &str) -> Result<Value, CallError> {
    let engine = base64::engine::general_purpose::STANDARD;
    let xdr_bytes = engine
        .decode(xdr_base64)
        .map_err(|e| CallError::DecodingFailed(format!("base64: {}", e)))?;

    decode_scval_bytes(&xdr_bytes)
}

/// Decode XDR bytes directly into a native value
pub fn decode_scval_bytes(bytes: &[u8]) -> Result<Value, CallError> {
    let scval = ScVal::from_xdr(bytes, Limits::none())
        .map_err(|e| CallError::DecodingFailed(format!("XDR: {}", e)))?;

    decode_scval_native(&scval)
}

/// Decode a native ScVal into a native value
pub fn decode_scval_native(scval: &ScVal) -> Result<Value, CallError> {
    use stellar_xdr::curr::ScVal::*;

    match scval {
        Bool(b) => Ok(Value::Bool(*b)),
        Void => Ok(Value::Void),
        Error(e) => Err(CallError::DecodingFailed(format!(
            "contract returned an error value: {:?}",
            e
        ))),
        U32(n) => Ok(Value::U32(*n)),
        I32(n) => Ok(Value::I32(*n)),
        U64(n) => Ok(Value::U64(*n)),
        I64(n) => Ok(Value::I64(*n)),
        U128(parts) => {
            let value = ((parts.hi as u128) << 64) | (parts.lo as u128);
            Ok(Value::U128(value))
        }
        I128(parts) => {
            let value = ((parts.hi as i128) << 64) | (parts.lo as i128);
            Ok(Value::I128(value))
        }
        Timepoint(t) => Ok(Value::U64(t.0)),
        Duration(d) => Ok(Value::U64(d.0)),
        // 256-bit integers have no native counterpart; keep the big-endian bytes
        U256(parts) => {
            let mut bytes = StdVec::with_capacity(32);
            bytes.extend_from_slice(&parts.hi_hi.to_be_bytes());
            bytes.extend_from_slice(&parts.hi_lo.to_be_bytes());
            bytes.extend_from_slice(&parts.lo_hi.to_be_bytes());
            bytes.extend_from_slice(&parts.lo_lo.to_be_bytes());
            Ok(Value::Bytes(bytes))
        }
        I256(parts) => {
            let mut bytes = StdVec::with_capacity(32);
            bytes.extend_from_slice(&parts.hi_hi.to_be_bytes());
            bytes.extend_from_slice(&parts.hi_lo.to_be_bytes());
            bytes.extend_from_slice(&parts.lo_hi.to_be_bytes());
            bytes.extend_from_slice(&parts.lo_lo.to_be_bytes());
            Ok(Value::Bytes(bytes))
        }
        Bytes(b) => Ok(Value::Bytes(b.0.to_vec())),
        String(s) => {
            let s_str = StdString::from_utf8_lossy(s.0.as_slice()).to_string();
            Ok(Value::String(s_str))
        }
        Symbol(s) => {
            let sym_str = StdString::from_utf8_lossy(s.0.as_slice()).to_string();
            Ok(Value::Symbol(sym_str))
        }
        Vec(Some(vec_items)) => {
            let mut decoded = StdVec::new();
            for item in vec_items.0.iter() {
                decoded.push(decode_scval_native(item)?);
            }
            Ok(Value::Vec(decoded))
        }
        Vec(None) => Ok(Value::Vec(StdVec::new())),
        Map(Some(map_items)) => {
            let mut decoded = StdVec::new();
            for entry in map_items.0.iter() {
                let key = decode_scval_native(&entry.key)?;
                let val = decode_scval_native(&entry.val)?;
                decoded.push((key, val));
            }
            Ok(Value::Map(decoded))
        }
        Map(None) => Ok(Value::Map(StdVec::new())),
        Address(addr) => Ok(Value::Address(format_address(addr)?)),
        ContractInstance(_) | LedgerKeyContractInstance | LedgerKeyNonce(_) => Err(
            CallError::DecodingFailed("ledger-internal value is not a return type".to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode, encode_base64};
    use stellar_xdr::curr::{
        ContractId, Hash, Int128Parts, ScAddress, ScString, ScSymbol, ScVec, UInt128Parts,
        UInt256Parts, WriteXdr,
    };

    #[test]
    fn test_decode_bool() {
        let scval = ScVal::Bool(true);
        let decoded = decode_scval_native(&scval).unwrap();
        assert!(matches!(decoded, Value::Bool(true)));
    }

    #[test]
    fn test_decode_uint128() {
        let scval = ScVal::U128(UInt128Parts { hi: 0, lo: 1000 });
        let decoded = decode_scval_native(&scval).unwrap();
        assert_eq!(decoded, Value::U128(1000));
    }

    #[test]
    fn test_decode_negative_i128() {
        let scval = ScVal::I128(Int128Parts { hi: -1, lo: u64::MAX - 4 });
        assert_eq!(decode_scval_native(&scval).unwrap(), Value::I128(-5));
    }

    #[test]
    fn test_decode_u256_as_bytes() {
        let scval = ScVal::U256(UInt256Parts { hi_hi: 0, hi_lo: 0, lo_hi: 0, lo_lo: 1 });
        match decode_scval_native(&scval).unwrap() {
            Value::Bytes(b) => {
                assert_eq!(b.len(), 32);
                assert_eq!(b[31], 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_base64_roundtrip() {
        let value = Value::Vec(vec![Value::I128(4_200_000_000), Value::Bool(false)]);
        let encoded = encode_base64(&value).unwrap();
        assert_eq!(decode_scval(&encoded).unwrap(), value);
    }

    #[test]
    fn test_wire_roundtrip_from_scval() {
        let scval = ScVal::I128(Int128Parts { hi: 0, lo: 4_200_000_000 });
        let bytes = scval.to_xdr(Limits::none()).unwrap();
        let decoded = decode_scval_bytes(&bytes).unwrap();
        assert_eq!(encode(&decoded).unwrap(), scval);
    }

    fn text_values() -> StdVec<Value> {
        let account = crate::address::account_strkey([7u8; 32]);
        let contract = stellar_strkey::Contract([9u8; 32]).to_string();
        vec![
            Value::Symbol("isin".to_string()),
            Value::String("1ª Emissão".to_string()),
            Value::Address(account.clone()),
            Value::Address(contract),
            Value::Vec(vec![
                Value::Address(account),
                Value::Symbol("BREMIS".to_string()),
                Value::U32(8),
                Value::Bool(true),
            ]),
        ]
    }

    #[test]
    fn test_text_and_address_roundtrip_from_value() {
        for value in text_values() {
            let encoded = encode_base64(&value).unwrap();
            assert_eq!(decode_scval(&encoded).unwrap(), value);
            assert_eq!(decode_scval_native(&encode(&value).unwrap()).unwrap(), value);
        }
    }

    #[test]
    fn test_text_and_address_roundtrip_from_scval() {
        let symbol = ScVal::Symbol(ScSymbol(b"isin".to_vec().try_into().unwrap()));
        let string = ScVal::String(ScString("1ª Emissão".as_bytes().to_vec().try_into().unwrap()));
        let account = ScVal::Address(ScAddress::Account(crate::address::account_id([7u8; 32])));
        let contract = ScVal::Address(ScAddress::Contract(ContractId(Hash([9u8; 32]))));
        let list = ScVal::Vec(Some(ScVec(
            vec![account.clone(), symbol.clone(), ScVal::Bool(false)]
                .try_into()
                .unwrap(),
        )));

        for scval in [symbol, string, account, contract, list] {
            let bytes = scval.to_xdr(Limits::none()).unwrap();
            let decoded = decode_scval_bytes(&bytes).unwrap();
            assert_eq!(encode(&decoded).unwrap(), scval);
        }
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode_scval("not base64!!").unwrap_err();
        assert!(matches!(err, CallError::DecodingFailed(_)));
    }

    #[test]
    fn test_decode_ledger_key_rejected() {
        let err = decode_scval_native(&ScVal::LedgerKeyContractInstance).unwrap_err();
        assert!(matches!(err, CallError::DecodingFailed(_)));
    }
}
