/// Soroban RPC methods used by the client
use crate::address::{account_id, account_strkey};
use crate::error::CallError;
use crate::transport::{HttpTransport, RpcTransport};
use crate::types::{
    AccountState, LedgerEntriesResponse, SendTransactionResponse, SimulateResponse,
    TransactionStatus,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use stellar_xdr::curr::{LedgerEntryData, LedgerKey, LedgerKeyAccount, Limits, ReadXdr, WriteXdr};
use tracing::debug;

pub const TESTNET_RPC: &str = "https://soroban-testnet.stellar.org";
pub const MAINNET_RPC: &str = "https://mainnet.stellar.validationcloud.io/v1/soroban/rpc";
pub const FUTURENET_RPC: &str = "https://rpc-futurenet.stellar.org";

/// Client for communicating with Stellar RPC
#[derive(Clone)]
pub struct StellarRpcClient {
    transport: Arc<dyn RpcTransport>,
}

impl StellarRpcClient {
    /// Create a new RPC client speaking HTTP to the given endpoint
    pub fn new(endpoint: &str) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(endpoint)))
    }

    pub fn with_transport(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    /// Create a client connected to Testnet
    pub fn testnet() -> Self {
        Self::new(TESTNET_RPC)
    }

    /// Create a client connected to Mainnet
    pub fn mainnet() -> Self {
        Self::new(MAINNET_RPC)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, CallError> {
        let value = self.transport.request(method, params).await?;
        serde_json::from_value::<T>(value)
            .map_err(|e| CallError::Transport(format!("Failed to parse {} response: {}", method, e)))
    }

    /// Get ledger entries for base64-encoded ledger keys
    pub async fn get_ledger_entries(&self, keys: Vec<String>) -> Result<LedgerEntriesResponse, CallError> {
        self.call("getLedgerEntries", json!({ "keys": keys })).await
    }

    /// Current sequence number of an account.
    ///
    /// Every failure here, network included, is reported as an account
    /// resolution failure.
    pub async fn get_account(&self, public_key: [u8; 32]) -> Result<AccountState, CallError> {
        let strkey = account_strkey(public_key);
        let key = LedgerKey::Account(LedgerKeyAccount {
            account_id: account_id(public_key),
        })
        .to_xdr_base64(Limits::none())
        .map_err(|e| CallError::AccountResolutionFailed(format!("ledger key: {}", e)))?;

        let response = self
            .get_ledger_entries(vec![key])
            .await
            .map_err(CallError::into_account_error)?;

        let entry = response
            .entries
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| {
                CallError::AccountResolutionFailed(format!("account {} not found", strkey))
            })?;

        match LedgerEntryData::from_xdr_base64(&entry.xdr, Limits::none()) {
            Ok(LedgerEntryData::Account(account)) => {
                debug!(account = %strkey, sequence = account.seq_num.0, "Account loaded");
                Ok(AccountState {
                    account_id: strkey,
                    sequence: account.seq_num.0,
                })
            }
            Ok(_) => Err(CallError::AccountResolutionFailed(format!(
                "ledger entry for {} is not an account",
                strkey
            ))),
            Err(e) => Err(CallError::AccountResolutionFailed(format!(
                "invalid account entry: {}",
                e
            ))),
        }
    }

    /// Simulate a transaction envelope
    pub async fn simulate_transaction(&self, tx_envelope: &str) -> Result<SimulateResponse, CallError> {
        self.call("simulateTransaction", json!({ "transaction": tx_envelope }))
            .await
    }

    /// Submit a signed envelope, returning the typed response and the raw payload
    pub async fn send_transaction(
        &self,
        tx_envelope: &str,
    ) -> Result<(SendTransactionResponse, Value), CallError> {
        let raw = self
            .transport
            .request("sendTransaction", json!({ "transaction": tx_envelope }))
            .await?;
        let parsed = serde_json::from_value::<SendTransactionResponse>(raw.clone())?;
        Ok((parsed, raw))
    }

    /// Look up a submitted transaction by hash
    pub async fn get_transaction(&self, hash: &str) -> Result<TransactionStatus, CallError> {
        self.call("getTransaction", json!({ "hash": hash })).await
    }

    /// Get the latest ledger height
    pub async fn get_latest_ledger(&self) -> Result<u32, CallError> {
        let response = self.transport.request("getLatestLedger", json!({})).await?;
        response
            .get("sequence")
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
            .ok_or_else(|| CallError::Transport("Invalid getLatestLedger response".to_string()))
    }

    /// Node health status, e.g. `healthy`
    pub async fn get_health(&self) -> Result<String, CallError> {
        let response = self.transport.request("getHealth", json!({})).await?;
        response
            .get("status")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| CallError::Transport("Invalid getHealth response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use stellar_xdr::curr::{
        AccountEntry, AccountEntryExt, SequenceNumber, String32, Thresholds, VecM,
    };

    fn account_entry_xdr(public_key: [u8; 32], seq: i64) -> String {
        LedgerEntryData::Account(AccountEntry {
            account_id: account_id(public_key),
            balance: 10_000_000_000,
            seq_num: SequenceNumber(seq),
            num_sub_entries: 0,
            inflation_dest: None,
            flags: 0,
            home_domain: String32::default(),
            thresholds: Thresholds([1, 0, 0, 0]),
            signers: VecM::default(),
            ext: AccountEntryExt::V0,
        })
        .to_xdr_base64(Limits::none())
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let _testnet = StellarRpcClient::testnet();
        let _mainnet = StellarRpcClient::mainnet();
        assert!(TESTNET_RPC.contains("testnet"));
        assert!(MAINNET_RPC.contains("mainnet"));
    }

    #[tokio::test]
    async fn test_get_account_reads_sequence() {
        let mock = MockTransport::new();
        mock.set_response(
            "getLedgerEntries",
            json!({
                "entries": [{ "key": "k", "xdr": account_entry_xdr([6u8; 32], 77), "lastModifiedLedgerSeq": 10 }],
                "latestLedger": 12
            }),
        );
        let client = StellarRpcClient::with_transport(Arc::new(mock.clone()));

        let account = client.get_account([6u8; 32]).await.unwrap();
        assert_eq!(account.sequence, 77);
        assert_eq!(account.account_id, account_strkey([6u8; 32]));
        assert_eq!(mock.requests()[0].params["keys"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_account_missing() {
        let mock = MockTransport::new();
        mock.set_response("getLedgerEntries", json!({ "entries": [], "latestLedger": 12 }));
        let client = StellarRpcClient::with_transport(Arc::new(mock));

        let err = client.get_account([6u8; 32]).await.unwrap_err();
        assert!(matches!(err, CallError::AccountResolutionFailed(_)));
    }

    #[tokio::test]
    async fn test_get_account_network_failure_is_account_error() {
        let mock = MockTransport::new();
        mock.set_error("getLedgerEntries", -32000, "unreachable");
        let client = StellarRpcClient::with_transport(Arc::new(mock));

        let err = client.get_account([6u8; 32]).await.unwrap_err();
        assert!(matches!(err, CallError::AccountResolutionFailed(_)));
    }

    #[tokio::test]
    async fn test_latest_ledger_and_health() {
        let mock = MockTransport::new();
        mock.set_response("getLatestLedger", json!({ "id": "abc", "sequence": 512 }));
        mock.set_response("getHealth", json!({ "status": "healthy" }));
        let client = StellarRpcClient::with_transport(Arc::new(mock));

        assert_eq!(client.get_latest_ledger().await.unwrap(), 512);
        assert_eq!(client.get_health().await.unwrap(), "healthy");
    }
}
