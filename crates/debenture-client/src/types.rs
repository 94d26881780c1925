/// Shared types for contract calls
use serde::{Deserialize, Serialize};

/// A contract value tagged with its Soroban wire type.
///
/// Used both for call arguments and for decoded return values, so every
/// argument carries an explicit type by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Void,
    Bool(bool),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    U128(u128),
    I128(i128),
    Bytes(Vec<u8>),
    String(String),
    Symbol(String),
    Address(String), // Stellar strkey (G... / C...)
    Vec(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Name of the wire type, as accepted by the CLI `type:value` syntax
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::U32(_) => "u32",
            Value::I32(_) => "i32",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::U128(_) => "u128",
            Value::I128(_) => "i128",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Address(_) => "address",
            Value::Vec(_) => "vec",
            Value::Map(_) => "map",
        }
    }

    /// Integer view of any integral variant
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::U32(n) => Some(i128::from(*n)),
            Value::I32(n) => Some(i128::from(*n)),
            Value::U64(n) => Some(i128::from(*n)),
            Value::I64(n) => Some(i128::from(*n)),
            Value::I128(n) => Some(*n),
            Value::U128(n) => i128::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Vec(_) | Value::Map(_))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::U32(n) => write!(f, "{}", n),
            Value::I32(n) => write!(f, "{}", n),
            Value::U64(n) => write!(f, "{}", n),
            Value::I64(n) => write!(f, "{}", n),
            Value::U128(n) => write!(f, "{}", n),
            Value::I128(n) => write!(f, "{}", n),
            Value::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Value::String(s) => write!(f, "{}", s),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Address(a) => write!(f, "{}", a),
            Value::Vec(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A single contract invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCallRequest {
    pub contract: String,
    pub method: String,
    pub args: Vec<Value>,
}

impl ViewCallRequest {
    pub fn new(contract: impl Into<String>, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            contract: contract.into(),
            method: method.into(),
            args,
        }
    }
}

/// Outcome of a submitted mutation.
///
/// Providers differ in which fields they fill, so both are optional from
/// the caller's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub hash: Option<String>,
    pub status: Option<String>,
    pub raw: serde_json::Value,
}

impl TransactionReceipt {
    /// Hash when present, otherwise the raw provider response as text
    pub fn identifier(&self) -> String {
        match &self.hash {
            Some(hash) => hash.clone(),
            None => self.raw.to_string(),
        }
    }
}

/// Source account state, fetched fresh for every call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub account_id: String,
    pub sequence: i64,
}

/// Response from Stellar RPC for ledger entries
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntriesResponse {
    #[serde(default)]
    pub entries: Option<Vec<LedgerEntryResult>>,
    pub latest_ledger: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResult {
    pub key: String,
    pub xdr: String,
    #[serde(default)]
    pub last_modified_ledger_seq: Option<u32>,
}

/// Response from `simulateTransaction`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<SimulateHostFunctionResult>>,
    #[serde(default)]
    pub transaction_data: Option<String>,
    #[serde(default)]
    pub min_resource_fee: Option<String>,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimulateHostFunctionResult {
    #[serde(default)]
    pub auth: Vec<String>,
    #[serde(default)]
    pub xdr: Option<String>,
}

/// Response from `sendTransaction`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "transactionHash")]
    pub hash: Option<String>,
    #[serde(default)]
    pub error_result_xdr: Option<String>,
}

/// Response from `getTransaction`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub status: String,
    #[serde(default)]
    pub ledger: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}
