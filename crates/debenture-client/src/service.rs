/// Debenture operations on top of a [`ContractCaller`]
use crate::batch::call_views;
use crate::caller::ContractCaller;
use crate::config::{ContractAddresses, ContractRole};
use crate::error::CallError;
use crate::offline::Fixtures;
use crate::render::{render, scaled};
use crate::types::{TransactionReceipt, Value, ViewCallRequest};
use std::sync::Arc;
use tracing::{info, warn};

/// Decimal places of the IPCA index as stored on-chain
pub const IPCA_DECIMALS: u32 = 6;

/// Getters exposed by the bond storage contract
pub const BOND_FIELDS: [&str; 9] = [
    "isin",
    "name",
    "symbol",
    "currency",
    "denomination",
    "frequency",
    "interestRate",
    "_name",
    "institution",
];

/// Dashboard figures, each fetched independently
#[derive(Debug)]
pub struct Dashboard {
    pub total_supply: Result<Value, CallError>,
    pub total_value_locked: Result<Value, CallError>,
    pub latest_ipca: Result<f64, CallError>,
}

/// One month of IPCA history
#[derive(Debug)]
pub struct IpcaPoint {
    pub index: u32,
    pub value: Result<f64, CallError>,
}

pub struct DebentureService {
    caller: Arc<dyn ContractCaller>,
    contracts: ContractAddresses,
    fixtures: Fixtures,
}

impl DebentureService {
    pub fn new(caller: Arc<dyn ContractCaller>, contracts: ContractAddresses) -> Self {
        Self {
            caller,
            contracts,
            fixtures: Fixtures::default(),
        }
    }

    pub fn with_fixtures(mut self, fixtures: Fixtures) -> Self {
        self.fixtures = fixtures;
        self
    }

    /// Read from `role`, or serve the fixture when its address is not configured
    async fn read(&self, role: ContractRole, method: &str, args: Vec<Value>) -> Result<Value, CallError> {
        match self.contracts.get(role) {
            Some(address) => self.caller.call_view(address, method, &args).await,
            None => {
                warn!(contract = %role, method, "Contract address not configured, serving fixture");
                Ok(self.fixtures.get(method))
            }
        }
    }

    fn address(&self, role: ContractRole) -> Result<&str, CallError> {
        self.contracts
            .get(role)
            .ok_or_else(|| CallError::ConfigurationMissing(format!("{} address ({})", role, role.env_key())))
    }

    /// Maximum supply of the debenture token
    pub async fn total_supply(&self) -> Result<Value, CallError> {
        self.read(ContractRole::TokenMinting, "max_total_supply", vec![]).await
    }

    /// Bonds held in custody for `holder`, defaulting to the signing account
    pub async fn total_value_locked(&self, holder: Option<&str>) -> Result<Value, CallError> {
        let arg = match holder.map(str::to_string).or_else(|| self.caller.source_address()) {
            Some(address) => Value::Address(address),
            None => Value::I128(0),
        };
        self.read(ContractRole::TokenCustody, "get_total_bonds_deposited", vec![arg])
            .await
    }

    /// Latest accumulated IPCA correction, as a decimal
    pub async fn latest_ipca(&self) -> Result<f64, CallError> {
        let raw = self
            .read(ContractRole::AccumulatedCorrection, "latest_ipca", vec![])
            .await?;
        to_decimal(&raw)
    }

    pub async fn dashboard(&self, holder: Option<&str>) -> Dashboard {
        let (total_supply, total_value_locked, latest_ipca) = futures::join!(
            self.total_supply(),
            self.total_value_locked(holder),
            self.latest_ipca()
        );
        Dashboard {
            total_supply,
            total_value_locked,
            latest_ipca,
        }
    }

    /// Monthly IPCA values for indices `0..count`, each with its own outcome
    pub async fn ipca_history(&self, count: u32) -> Vec<IpcaPoint> {
        let method = "latest_ipca_history";
        let Some(address) = self.contracts.get(ContractRole::MonthlyCorrection) else {
            warn!(contract = %ContractRole::MonthlyCorrection, method, "Contract address not configured, serving fixture");
            return (0..count)
                .map(|index| IpcaPoint {
                    index,
                    value: to_decimal(&self.fixtures.get(method)),
                })
                .collect();
        };

        let requests = (0..count)
            .map(|i| ViewCallRequest::new(address, method, vec![Value::I128(i128::from(i))]))
            .collect();

        call_views(self.caller.as_ref(), requests)
            .await
            .into_iter()
            .zip(0..count)
            .map(|(entry, index)| IpcaPoint {
                index,
                value: entry.result.and_then(|v| to_decimal(&v)),
            })
            .collect()
    }

    /// One bond characteristic, rendered for display
    pub async fn bond_field(&self, name: &str) -> Result<String, CallError> {
        let value = self.read(ContractRole::BondStorage, name, vec![]).await?;
        Ok(render(&value))
    }

    /// Several bond characteristics at once; a failing field does not affect the others
    pub async fn bond_fields(&self, names: &[&str]) -> Vec<(String, Result<String, CallError>)> {
        let Some(address) = self.contracts.get(ContractRole::BondStorage) else {
            warn!(contract = %ContractRole::BondStorage, "Contract address not configured, serving fixtures");
            return names
                .iter()
                .map(|name| (name.to_string(), Ok(render(&self.fixtures.get(name)))))
                .collect();
        };

        let requests = names
            .iter()
            .map(|name| ViewCallRequest::new(address, *name, vec![]))
            .collect();

        call_views(self.caller.as_ref(), requests)
            .await
            .into_iter()
            .map(|entry| (entry.request.method, entry.result.map(|v| render(&v))))
            .collect()
    }

    /// Price of one bond in the payment asset's smallest unit
    pub async fn bond_price(&self) -> Result<i128, CallError> {
        let value = self
            .read(ContractRole::PaymentPool, "denomination", vec![])
            .await?;
        value.as_i128().ok_or_else(|| {
            CallError::DecodingFailed(format!("denomination is not an integer: {}", value))
        })
    }

    /// Deposit payment for `amount` bonds from the signing account
    pub async fn buy_bonds(&self, amount: i128) -> Result<TransactionReceipt, CallError> {
        if amount <= 0 {
            return Err(CallError::EncodingUnsupported(format!(
                "bond amount must be positive, got {}",
                amount
            )));
        }
        let pool = self.address(ContractRole::PaymentPool)?;
        let payer = self
            .caller
            .source_address()
            .ok_or_else(|| CallError::ConfigurationMissing("signing secret".to_string()))?;
        let denomination = self.bond_price().await?;

        info!(amount, denomination, payer = %payer, "Buying bonds");
        self.caller
            .call_mutation(
                pool,
                "deposit_usdc",
                &[
                    Value::Address(payer),
                    Value::I128(amount),
                    Value::I128(denomination),
                ],
            )
            .await
    }

    /// Request test tokens from the faucet contract
    pub async fn mint(&self) -> Result<TransactionReceipt, CallError> {
        let faucet = self.address(ContractRole::FaucetToken)?;
        self.caller.call_mutation(faucet, "mint_to_user", &[]).await
    }
}

fn to_decimal(value: &Value) -> Result<f64, CallError> {
    scaled(value, IPCA_DECIMALS)
        .ok_or_else(|| CallError::DecodingFailed(format!("expected an integer index, got {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::offline::OfflineClient;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and answers views from a fixed table
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, String, Vec<Value>)>>,
        source: Option<String>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<(String, String, Vec<Value>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContractCaller for Recorder {
        async fn call_view(&self, contract: &str, method: &str, args: &[Value]) -> Result<Value, CallError> {
            self.calls
                .lock()
                .unwrap()
                .push((contract.to_string(), method.to_string(), args.to_vec()));
            match method {
                "denomination" => Ok(Value::I128(2_000_000)),
                "latest_ipca" => Ok(Value::I128(4_560_000)),
                "latest_ipca_history" => match args.first() {
                    Some(Value::I128(1)) => Err(CallError::SimulationEmpty),
                    Some(Value::I128(i)) => Ok(Value::I128(i * 1_000_000)),
                    _ => Err(CallError::SimulationEmpty),
                },
                "isin" => Ok(Value::Symbol("BRTEST".to_string())),
                _ => Err(CallError::SimulationFailed("no such method".to_string())),
            }
        }

        async fn call_mutation(
            &self,
            contract: &str,
            method: &str,
            args: &[Value],
        ) -> Result<TransactionReceipt, CallError> {
            self.calls
                .lock()
                .unwrap()
                .push((contract.to_string(), method.to_string(), args.to_vec()));
            Ok(TransactionReceipt {
                hash: Some("ab".repeat(32)),
                status: Some("PENDING".to_string()),
                raw: serde_json::json!({}),
            })
        }

        fn source_address(&self) -> Option<String> {
            self.source.clone()
        }

        fn mode(&self) -> Mode {
            Mode::Live
        }
    }

    fn all_contracts() -> ContractAddresses {
        ContractAddresses {
            token_minting: Some("CMINT".to_string()),
            token_custody: Some("CCUSTODY".to_string()),
            accumulated_correction: Some("CACC".to_string()),
            monthly_correction: Some("CMONTH".to_string()),
            bond_storage: Some("CBOND".to_string()),
            payment_pool: Some("CPOOL".to_string()),
            faucet_token: Some("CFAUCET".to_string()),
        }
    }

    #[tokio::test]
    async fn test_missing_address_serves_fixture_without_calling() {
        let recorder = Arc::new(Recorder::default());
        let service = DebentureService::new(recorder.clone(), ContractAddresses::default());

        assert_eq!(
            service.total_supply().await.unwrap(),
            Value::I128(1_000_000_000_000)
        );
        assert_eq!(service.bond_field("isin").await.unwrap(), "BREMISDEB5H2");
        assert_eq!(service.bond_price().await.unwrap(), 1_000_000);
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_fixtures_replace_defaults() {
        let recorder = Arc::new(Recorder::default());
        let service = DebentureService::new(recorder.clone(), ContractAddresses::default())
            .with_fixtures(Fixtures::empty().with("denomination", Value::I128(5_000_000)));

        assert_eq!(service.bond_price().await.unwrap(), 5_000_000);
        assert_eq!(service.bond_field("isin").await.unwrap(), crate::offline::MOCK_VALUE);
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_address_fails_writes() {
        let recorder = Arc::new(Recorder {
            source: Some("GPAYER".to_string()),
            ..Default::default()
        });
        let service = DebentureService::new(recorder.clone(), ContractAddresses::default());

        let err = service.mint().await.unwrap_err();
        assert!(matches!(err, CallError::ConfigurationMissing(_)));
        assert!(err.to_string().contains("DEBENTURE_FAUCET_TOKEN_ADDRESS"));
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_latest_ipca_is_scaled() {
        let service = DebentureService::new(Arc::new(Recorder::default()), all_contracts());
        assert_eq!(service.latest_ipca().await.unwrap(), 4.56);
    }

    #[tokio::test]
    async fn test_ipca_history_isolates_failures() {
        let service = DebentureService::new(Arc::new(Recorder::default()), all_contracts());
        let history = service.ipca_history(3).await;

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].value.as_ref().unwrap(), &0.0);
        assert!(history[1].value.is_err());
        assert_eq!(history[2].index, 2);
        assert_eq!(history[2].value.as_ref().unwrap(), &2.0);
    }

    #[tokio::test]
    async fn test_bond_fields_keep_order() {
        let service = DebentureService::new(Arc::new(Recorder::default()), all_contracts());
        let fields = service.bond_fields(&["isin", "missing"]).await;

        assert_eq!(fields[0].0, "isin");
        assert_eq!(fields[0].1.as_ref().unwrap(), "BRTEST");
        assert_eq!(fields[1].0, "missing");
        assert!(fields[1].1.is_err());
    }

    #[tokio::test]
    async fn test_buy_bonds_reads_denomination_first() {
        let recorder = Arc::new(Recorder {
            source: Some("GPAYER".to_string()),
            ..Default::default()
        });
        let service = DebentureService::new(recorder.clone(), all_contracts());

        let receipt = service.buy_bonds(3).await.unwrap();
        assert_eq!(receipt.status.as_deref(), Some("PENDING"));

        let calls = recorder.calls();
        assert_eq!(calls[0].1, "denomination");
        assert_eq!(calls[1].0, "CPOOL");
        assert_eq!(calls[1].1, "deposit_usdc");
        assert_eq!(
            calls[1].2,
            vec![
                Value::Address("GPAYER".to_string()),
                Value::I128(3),
                Value::I128(2_000_000),
            ]
        );
    }

    #[tokio::test]
    async fn test_buy_bonds_rejects_non_positive_amount() {
        let service = DebentureService::new(Arc::new(Recorder::default()), all_contracts());
        assert!(matches!(
            service.buy_bonds(0).await.unwrap_err(),
            CallError::EncodingUnsupported(_)
        ));
    }

    #[tokio::test]
    async fn test_offline_dashboard() {
        let service = DebentureService::new(Arc::new(OfflineClient::new()), all_contracts());
        let dashboard = service.dashboard(None).await;

        assert_eq!(dashboard.total_supply.unwrap(), Value::I128(1_000_000_000_000));
        assert_eq!(dashboard.total_value_locked.unwrap(), Value::I128(0));
        assert_eq!(dashboard.latest_ipca.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_total_value_locked_uses_signer_address() {
        let recorder = Arc::new(Recorder {
            source: Some("GPAYER".to_string()),
            ..Default::default()
        });
        let service = DebentureService::new(recorder.clone(), all_contracts());
        let _ = service.total_value_locked(None).await;
        assert_eq!(recorder.calls()[0].2, vec![Value::Address("GPAYER".to_string())]);
    }
}
