//! The seam between services and the network.
//!
//! [`LiveClient`](crate::client::LiveClient) and
//! [`OfflineClient`](crate::offline::OfflineClient) both implement
//! [`ContractCaller`]; which one a process uses is fixed by [`Mode`].

use crate::client::LiveClient;
use crate::config::{Config, Mode};
use crate::error::CallError;
use crate::offline::OfflineClient;
use crate::types::{TransactionReceipt, Value};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait ContractCaller: Send + Sync {
    /// Simulate a read-only invocation and decode its return value
    async fn call_view(&self, contract: &str, method: &str, args: &[Value]) -> Result<Value, CallError>;

    /// Sign and submit a state-changing invocation
    async fn call_mutation(
        &self,
        contract: &str,
        method: &str,
        args: &[Value],
    ) -> Result<TransactionReceipt, CallError>;

    /// Strkey of the signing account, when there is one
    fn source_address(&self) -> Option<String>;

    fn mode(&self) -> Mode;
}

/// Build the caller selected by `config.mode`
pub fn connect(config: &Config) -> Result<Arc<dyn ContractCaller>, CallError> {
    let caller: Arc<dyn ContractCaller> = match config.mode {
        Mode::Live => Arc::new(LiveClient::from_config(config)?),
        Mode::Offline => Arc::new(OfflineClient::new()),
    };
    info!(mode = %caller.mode(), source = ?caller.source_address(), "Contract caller ready");
    Ok(caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_offline() {
        let caller = connect(&Config::offline()).unwrap();
        assert_eq!(caller.mode(), Mode::Offline);
        assert!(caller.source_address().is_none());
    }

    #[test]
    fn test_connect_live_without_secret_fails() {
        let mut config = Config::offline();
        config.mode = Mode::Live;
        let err = connect(&config).err().unwrap();
        assert!(matches!(err, CallError::ConfigurationMissing(_)));
    }
}
