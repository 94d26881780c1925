//! Fixture-backed caller for running without a network or credentials.

use crate::caller::ContractCaller;
use crate::config::Mode;
use crate::error::CallError;
use crate::types::{TransactionReceipt, Value};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Returned for any method without a fixture
pub const MOCK_VALUE: &str = "MOCK_VALUE";

/// Canned return values keyed by method name
#[derive(Debug, Clone)]
pub struct Fixtures {
    values: HashMap<String, Value>,
}

impl Default for Fixtures {
    fn default() -> Self {
        let sym = |s: &str| Value::Symbol(s.to_string());
        let values = [
            ("max_total_supply", Value::I128(1_000_000_000_000)),
            ("get_total_bonds_deposited", Value::I128(0)),
            ("latest_ipca", Value::I128(0)),
            ("latest_ipca_history", Value::I128(0)),
            ("denomination", Value::I128(1_000_000)),
            ("isin", sym("BREMISDEB5H2")),
            ("name", Value::String("1ª Emissão - Série Única".to_string())),
            ("symbol", sym("BREMIS")),
            ("currency", Value::String("G... (endereço mock)".to_string())),
            ("frequency", Value::U32(8)),
            ("interestRate", Value::U32(4)),
            ("_name", Value::String("Emissora XYZ".to_string())),
            ("institution", Value::String("G... (endereço emissora)".to_string())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self { values }
    }
}

impl Fixtures {
    /// No fixtures at all; every read yields [`MOCK_VALUE`]
    pub fn empty() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, method: &str, value: Value) -> Self {
        self.values.insert(method.to_string(), value);
        self
    }

    pub fn get(&self, method: &str) -> Value {
        self.values
            .get(method)
            .cloned()
            .unwrap_or_else(|| Value::Symbol(MOCK_VALUE.to_string()))
    }
}

/// Caller that never touches the network
#[derive(Debug, Clone, Default)]
pub struct OfflineClient {
    fixtures: Fixtures,
}

impl OfflineClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixtures(fixtures: Fixtures) -> Self {
        Self { fixtures }
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }
}

#[async_trait]
impl ContractCaller for OfflineClient {
    async fn call_view(&self, contract: &str, method: &str, _args: &[Value]) -> Result<Value, CallError> {
        let value = self.fixtures.get(method);
        debug!(contract, method, value = %value, "Serving fixture");
        Ok(value)
    }

    async fn call_mutation(
        &self,
        _contract: &str,
        method: &str,
        _args: &[Value],
    ) -> Result<TransactionReceipt, CallError> {
        Err(CallError::ConfigurationMissing(format!(
            "signing secret; {} cannot be submitted in offline mode",
            method
        )))
    }

    fn source_address(&self) -> Option<String> {
        None
    }

    fn mode(&self) -> Mode {
        Mode::Offline
    }
}
