/// Live contract caller backed by Soroban RPC
use crate::caller::ContractCaller;
use crate::config::{Config, Mode, DEFAULT_TX_TIMEOUT_SECS};
use crate::decoder::decode_scval;
use crate::error::CallError;
use crate::rpc::StellarRpcClient;
use crate::signer::Signer;
use crate::transport::RpcTransport;
use crate::tx::{envelope, envelope_base64, invocation, Preparation, TransactionDraft, BASE_FEE};
use crate::types::{SimulateResponse, TransactionReceipt, Value};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds, simulates and submits single-operation contract invocations.
///
/// The source account is fetched again for every call; nothing is cached
/// between calls.
#[derive(Clone)]
pub struct LiveClient {
    rpc: StellarRpcClient,
    signer: Option<Signer>,
    network_passphrase: String,
    base_fee: u32,
    tx_timeout_secs: u64,
}

impl LiveClient {
    pub fn new(rpc: StellarRpcClient, network_passphrase: &str) -> Self {
        Self {
            rpc,
            signer: None,
            network_passphrase: network_passphrase.to_string(),
            base_fee: BASE_FEE,
            tx_timeout_secs: DEFAULT_TX_TIMEOUT_SECS,
        }
    }

    /// Client for a live configuration; the signing secret is required
    pub fn from_config(config: &Config) -> Result<Self, CallError> {
        Self::from_config_with_transport(config, None)
    }

    /// Same as [`LiveClient::from_config`] over an explicit transport
    pub fn from_config_with_transport(
        config: &Config,
        transport: Option<Arc<dyn RpcTransport>>,
    ) -> Result<Self, CallError> {
        let secret = config.signing_secret.as_deref().ok_or_else(|| {
            CallError::ConfigurationMissing("signing secret (DEBENTURE_SECRET_KEY)".to_string())
        })?;
        let rpc = match transport {
            Some(t) => StellarRpcClient::with_transport(t),
            None => StellarRpcClient::new(&config.rpc_url),
        };
        Ok(Self::new(rpc, &config.network_passphrase)
            .with_signer(Signer::from_secret(secret)?)
            .with_fees(config.base_fee, config.tx_timeout_secs))
    }

    pub fn with_signer(mut self, signer: Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_fees(mut self, base_fee: u32, tx_timeout_secs: u64) -> Self {
        self.base_fee = base_fee;
        self.tx_timeout_secs = tx_timeout_secs;
        self
    }

    fn signer(&self) -> Result<&Signer, CallError> {
        self.signer
            .as_ref()
            .ok_or_else(|| CallError::ConfigurationMissing("signing secret".to_string()))
    }

    /// Encode, fetch the source account and build an unsigned draft
    async fn draft(
        &self,
        signer: &Signer,
        contract: &str,
        method: &str,
        args: &[Value],
    ) -> Result<TransactionDraft, CallError> {
        let call = invocation(contract, method, args)?;
        let account = self.rpc.get_account(signer.public_key()).await?;
        Ok(TransactionDraft::new(
            signer.public_key(),
            account.sequence,
            self.base_fee,
            self.tx_timeout_secs,
            call,
        ))
    }

    async fn simulate(&self, draft: &TransactionDraft) -> Result<SimulateResponse, CallError> {
        let unsigned = envelope(draft.build(None)?, vec![])?;
        self.rpc.simulate_transaction(&envelope_base64(&unsigned)?).await
    }
}

/// Only `PENDING` and `DUPLICATE` mean the network queued the transaction
fn is_accepted(status: Option<&str>) -> bool {
    matches!(status, Some("PENDING") | Some("DUPLICATE"))
}

#[async_trait]
impl ContractCaller for LiveClient {
    async fn call_view(&self, contract: &str, method: &str, args: &[Value]) -> Result<Value, CallError> {
        let signer = self.signer()?;
        let draft = self.draft(signer, contract, method, args).await?;
        let sim = self.simulate(&draft).await?;

        if let Some(error) = sim.error {
            debug!(contract, method, %error, "Simulation reported an error");
            return Err(CallError::SimulationFailed(error));
        }

        let xdr = sim
            .results
            .and_then(|results| results.into_iter().next())
            .and_then(|first| first.xdr)
            .ok_or(CallError::SimulationEmpty)?;

        let value = decode_scval(&xdr)?;
        debug!(contract, method, value = %value, "View call decoded");
        Ok(value)
    }

    async fn call_mutation(
        &self,
        contract: &str,
        method: &str,
        args: &[Value],
    ) -> Result<TransactionReceipt, CallError> {
        let signer = self.signer()?;
        let draft = self.draft(signer, contract, method, args).await?;
        let sim = self.simulate(&draft).await?;
        let preparation = Preparation::from_simulation(&sim)?;

        let tx = draft.build(Some(&preparation))?;
        let signature = signer.sign_transaction(&tx, &self.network_passphrase)?;
        let fee = tx.fee;
        let signed = envelope(tx, vec![signature])?;

        let (response, raw) = self
            .rpc
            .send_transaction(&envelope_base64(&signed)?)
            .await
            .map_err(CallError::into_submission_error)?;

        if !is_accepted(response.status.as_deref()) {
            let status = response.status.as_deref().unwrap_or("UNKNOWN");
            let detail = response
                .error_result_xdr
                .clone()
                .unwrap_or_else(|| raw.to_string());
            warn!(contract, method, status, %detail, "Transaction not accepted");
            return Err(CallError::SubmissionFailed(format!("{}: {}", status, detail)));
        }

        info!(
            contract,
            method,
            fee,
            hash = ?response.hash,
            status = ?response.status,
            "Transaction submitted"
        );

        Ok(TransactionReceipt {
            hash: response.hash,
            status: response.status,
            raw,
        })
    }

    fn source_address(&self) -> Option<String> {
        self.signer.as_ref().map(Signer::address)
    }

    fn mode(&self) -> Mode {
        Mode::Live
    }
}
