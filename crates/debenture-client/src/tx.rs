/// Transaction construction for single contract invocations
use crate::address::{muxed_account, parse_contract_id};
use crate::encoder::{encode_args, is_valid_symbol};
use crate::error::CallError;
use crate::types::{SimulateResponse, Value};
use base64::Engine;
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    DecoratedSignature, Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Limits, Memo,
    Operation, OperationBody, Preconditions, ReadXdr, ScSymbol, ScVal, SequenceNumber,
    SorobanAuthorizationEntry, SorobanTransactionData, StringM, TimeBounds, TimePoint,
    Transaction, TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, VecM, WriteXdr,
};

/// Inclusion fee in stroops, before resource fees
pub const BASE_FEE: u32 = 100;

/// `sha256(passphrase)`
pub fn network_id(network_passphrase: &str) -> Hash {
    Hash(Sha256::digest(network_passphrase.as_bytes()).into())
}

/// Hash signed by every signer and reported back by the network as the tx hash
pub fn transaction_hash(tx: &Transaction, network_passphrase: &str) -> Result<[u8; 32], CallError> {
    let payload = TransactionSignaturePayload {
        network_id: network_id(network_passphrase),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    let bytes = payload
        .to_xdr(Limits::none())
        .map_err(|e| CallError::SigningFailed(format!("signature payload: {}", e)))?;
    Ok(Sha256::digest(bytes).into())
}

/// A contract function with encoded arguments
pub fn invocation(contract: &str, method: &str, args: &[Value]) -> Result<InvokeContractArgs, CallError> {
    let contract_address = parse_contract_id(contract)?;

    if !is_valid_symbol(method) || method.is_empty() {
        return Err(CallError::EncodingUnsupported(format!(
            "'{}' is not a valid function name",
            method
        )));
    }
    let name: StringM<32> = method
        .as_bytes()
        .to_vec()
        .try_into()
        .map_err(|e| CallError::EncodingUnsupported(format!("function name: {}", e)))?;

    let args: VecM<ScVal> = encode_args(args)?
        .try_into()
        .map_err(|e| CallError::EncodingUnsupported(format!("arguments: {}", e)))?;

    Ok(InvokeContractArgs {
        contract_address,
        function_name: ScSymbol(name),
        args,
    })
}

/// Resource data returned by simulation, attached to a mutating transaction
#[derive(Debug, Clone)]
pub struct Preparation {
    pub transaction_data: SorobanTransactionData,
    pub auth: Vec<SorobanAuthorizationEntry>,
    pub min_resource_fee: u32,
}

impl Preparation {
    pub fn from_simulation(sim: &SimulateResponse) -> Result<Self, CallError> {
        if let Some(error) = &sim.error {
            return Err(CallError::SimulationFailed(error.clone()));
        }

        let data = sim.transaction_data.as_deref().ok_or_else(|| {
            CallError::SimulationFailed("simulation returned no transaction data".to_string())
        })?;
        let transaction_data = SorobanTransactionData::from_xdr_base64(data, Limits::none())
            .map_err(|e| CallError::SimulationFailed(format!("transaction data: {}", e)))?;

        let mut auth = Vec::new();
        if let Some(first) = sim.results.as_ref().and_then(|r| r.first()) {
            for entry in &first.auth {
                auth.push(
                    SorobanAuthorizationEntry::from_xdr_base64(entry, Limits::none())
                        .map_err(|e| CallError::SimulationFailed(format!("auth entry: {}", e)))?,
                );
            }
        }

        let min_resource_fee = match sim.min_resource_fee.as_deref() {
            Some(fee) => fee
                .parse::<u32>()
                .map_err(|e| CallError::SimulationFailed(format!("min resource fee '{}': {}", fee, e)))?,
            None => 0,
        };

        Ok(Self {
            transaction_data,
            auth,
            min_resource_fee,
        })
    }
}

/// Inputs for one invoke-contract transaction.
///
/// Rebuilt rather than patched: simulation produces a [`Preparation`] and
/// the final transaction is built again from the same draft.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub source: [u8; 32],
    /// Sequence number of the new transaction (account sequence + 1)
    pub sequence: i64,
    pub base_fee: u32,
    pub valid_until: u64,
    pub invocation: InvokeContractArgs,
}

impl TransactionDraft {
    pub fn new(
        source: [u8; 32],
        account_sequence: i64,
        base_fee: u32,
        timeout_secs: u64,
        invocation: InvokeContractArgs,
    ) -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        Self {
            source,
            sequence: account_sequence.saturating_add(1),
            base_fee,
            valid_until: now.saturating_add(timeout_secs),
            invocation,
        }
    }

    pub fn build(&self, preparation: Option<&Preparation>) -> Result<Transaction, CallError> {
        let auth: VecM<SorobanAuthorizationEntry> = preparation
            .map(|p| p.auth.clone())
            .unwrap_or_default()
            .try_into()
            .map_err(|e| CallError::EncodingUnsupported(format!("auth entries: {}", e)))?;

        let operation = Operation {
            source_account: None,
            body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
                host_function: HostFunction::InvokeContract(self.invocation.clone()),
                auth,
            }),
        };
        let operations: VecM<Operation, 100> = vec![operation]
            .try_into()
            .map_err(|e| CallError::EncodingUnsupported(format!("operations: {}", e)))?;

        let (fee, ext) = match preparation {
            Some(p) => (
                self.base_fee.saturating_add(p.min_resource_fee),
                TransactionExt::V1(p.transaction_data.clone()),
            ),
            None => (self.base_fee, TransactionExt::V0),
        };

        Ok(Transaction {
            source_account: muxed_account(self.source),
            fee,
            seq_num: SequenceNumber(self.sequence),
            cond: Preconditions::Time(TimeBounds {
                min_time: TimePoint(0),
                max_time: TimePoint(self.valid_until),
            }),
            memo: Memo::None,
            operations,
            ext,
        })
    }
}

/// Wrap a transaction and its signatures into a v1 envelope
pub fn envelope(
    tx: Transaction,
    signatures: Vec<DecoratedSignature>,
) -> Result<TransactionEnvelope, CallError> {
    let signatures: VecM<DecoratedSignature, 20> = signatures
        .try_into()
        .map_err(|e| CallError::SigningFailed(format!("signatures: {}", e)))?;
    Ok(TransactionEnvelope::Tx(TransactionV1Envelope { tx, signatures }))
}

pub fn envelope_base64(envelope: &TransactionEnvelope) -> Result<String, CallError> {
    let bytes = envelope
        .to_xdr(Limits::none())
        .map_err(|e| CallError::EncodingUnsupported(format!("envelope: {}", e)))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}
