/// Endpoint configuration
/// Built once at process start and passed by reference into the client
use crate::address::parse_contract_id;
use crate::legacy::AddressHeuristic;
use crate::signer::Signer;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_BASE_FEE: u32 = 100;
pub const DEFAULT_TX_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid network: {0}. Allowed values: mainnet, testnet, futurenet")]
    InvalidNetwork(String),
    #[error("Missing configuration value: {0}")]
    MissingEnv(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to read config file {path}: {reason}")]
    File { path: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Futurenet,
}

impl Network {
    pub fn passphrase(&self) -> &'static str {
        match self {
            Network::Mainnet => "Public Global Stellar Network ; September 2015",
            Network::Testnet => "Test SDF Network ; September 2015",
            Network::Futurenet => "Test SDF Future Network ; October 2022",
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => crate::rpc::MAINNET_RPC,
            Network::Testnet => crate::rpc::TESTNET_RPC,
            Network::Futurenet => crate::rpc::FUTURENET_RPC,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Futurenet => write!(f, "futurenet"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "futurenet" => Ok(Network::Futurenet),
            _ => Err(ConfigError::InvalidNetwork(s.to_string())),
        }
    }
}

/// How calls are served, fixed for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Real RPC round-trips, signed by the configured key
    Live,
    /// Fixture values for reads, writes refused
    Offline,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Live => write!(f, "live"),
            Mode::Offline => write!(f, "offline"),
        }
    }
}

/// Logical contracts of the debenture offering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractRole {
    TokenMinting,
    TokenCustody,
    AccumulatedCorrection,
    MonthlyCorrection,
    BondStorage,
    PaymentPool,
    FaucetToken,
}

impl ContractRole {
    pub const ALL: [ContractRole; 7] = [
        ContractRole::TokenMinting,
        ContractRole::TokenCustody,
        ContractRole::AccumulatedCorrection,
        ContractRole::MonthlyCorrection,
        ContractRole::BondStorage,
        ContractRole::PaymentPool,
        ContractRole::FaucetToken,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ContractRole::TokenMinting => "token_minting",
            ContractRole::TokenCustody => "token_custody",
            ContractRole::AccumulatedCorrection => "accumulated_correction",
            ContractRole::MonthlyCorrection => "monthly_correction",
            ContractRole::BondStorage => "bond_storage",
            ContractRole::PaymentPool => "payment_pool",
            ContractRole::FaucetToken => "faucet_token",
        }
    }

    pub fn env_key(&self) -> String {
        format!("DEBENTURE_{}_ADDRESS", self.name().to_uppercase())
    }
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One optional contract strkey per logical contract
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContractAddresses {
    pub token_minting: Option<String>,
    pub token_custody: Option<String>,
    pub accumulated_correction: Option<String>,
    pub monthly_correction: Option<String>,
    pub bond_storage: Option<String>,
    pub payment_pool: Option<String>,
    pub faucet_token: Option<String>,
}

impl ContractAddresses {
    pub fn get(&self, role: ContractRole) -> Option<&str> {
        let slot = match role {
            ContractRole::TokenMinting => &self.token_minting,
            ContractRole::TokenCustody => &self.token_custody,
            ContractRole::AccumulatedCorrection => &self.accumulated_correction,
            ContractRole::MonthlyCorrection => &self.monthly_correction,
            ContractRole::BondStorage => &self.bond_storage,
            ContractRole::PaymentPool => &self.payment_pool,
            ContractRole::FaucetToken => &self.faucet_token,
        };
        slot.as_deref()
    }

    fn set(&mut self, role: ContractRole, value: Option<String>) {
        let slot = match role {
            ContractRole::TokenMinting => &mut self.token_minting,
            ContractRole::TokenCustody => &mut self.token_custody,
            ContractRole::AccumulatedCorrection => &mut self.accumulated_correction,
            ContractRole::MonthlyCorrection => &mut self.monthly_correction,
            ContractRole::BondStorage => &mut self.bond_storage,
            ContractRole::PaymentPool => &mut self.payment_pool,
            ContractRole::FaucetToken => &mut self.faucet_token,
        };
        *slot = value;
    }

    pub fn configured(&self) -> usize {
        ContractRole::ALL.iter().filter(|r| self.get(**r).is_some()).count()
    }
}

/// Client configuration
#[derive(Clone)]
pub struct Config {
    pub network: Network,
    pub rpc_url: String,
    pub network_passphrase: String,
    pub signing_secret: Option<String>,
    pub contracts: ContractAddresses,
    pub mode: Mode,
    pub base_fee: u32,
    pub tx_timeout_secs: u64,
    pub address_heuristic: AddressHeuristic,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("network", &self.network)
            .field("rpc_url", &self.rpc_url)
            .field("network_passphrase", &self.network_passphrase)
            .field(
                "signing_secret",
                &self.signing_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("contracts", &self.contracts)
            .field("mode", &self.mode)
            .field("base_fee", &self.base_fee)
            .field("tx_timeout_secs", &self.tx_timeout_secs)
            .field("address_heuristic", &self.address_heuristic)
            .finish()
    }
}

/// On-disk TOML layout
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    network: Option<String>,
    rpc_url: Option<String>,
    network_passphrase: Option<String>,
    secret_key: Option<String>,
    mode: Option<String>,
    base_fee: Option<u32>,
    tx_timeout_secs: Option<u64>,
    address_prefix: Option<String>,
    address_min_len: Option<usize>,
    #[serde(default)]
    contracts: ContractAddresses,
}

impl ConfigFile {
    /// Flatten into the same keys the environment uses
    fn into_lookup(self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        };
        put("DEBENTURE_NETWORK", self.network);
        put("DEBENTURE_RPC_URL", self.rpc_url);
        put("DEBENTURE_NETWORK_PASSPHRASE", self.network_passphrase);
        put("DEBENTURE_SECRET_KEY", self.secret_key);
        put("DEBENTURE_MODE", self.mode);
        put("DEBENTURE_BASE_FEE", self.base_fee.map(|v| v.to_string()));
        put(
            "DEBENTURE_TX_TIMEOUT_SECS",
            self.tx_timeout_secs.map(|v| v.to_string()),
        );
        put("DEBENTURE_ADDRESS_PREFIX", self.address_prefix);
        put(
            "DEBENTURE_ADDRESS_MIN_LEN",
            self.address_min_len.map(|v| v.to_string()),
        );
        for role in ContractRole::ALL {
            put(&role.env_key(), self.contracts.get(role).map(str::to_string));
        }
        map
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a TOML file, with no environment fallback
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let file = read_config_file(path)?.into_lookup();
        Self::from_lookup(|key| file.get(key).cloned())
    }

    /// Layered load: `overrides`, then the environment, then the optional file
    pub fn load(path: Option<&Path>, overrides: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => read_config_file(p)?.into_lookup(),
            None => HashMap::new(),
        };
        Self::from_lookup(|key| {
            overrides
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
                .or_else(|| file.get(key).cloned())
        })
    }

    /// Build from any key lookup using the `DEBENTURE_*` names.
    /// Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let network = match get("DEBENTURE_NETWORK") {
            Some(s) => s.parse::<Network>()?,
            None => Network::Testnet,
        };

        let rpc_url = get("DEBENTURE_RPC_URL").unwrap_or_else(|| network.default_rpc_url().to_string());
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(ConfigError::InvalidConfig(format!(
                "RPC URL must be http(s): {}",
                rpc_url
            )));
        }

        let network_passphrase = get("DEBENTURE_NETWORK_PASSPHRASE")
            .unwrap_or_else(|| network.passphrase().to_string());

        let signing_secret = get("DEBENTURE_SECRET_KEY");
        if let Some(secret) = &signing_secret {
            Signer::from_secret(secret).map_err(|_| {
                ConfigError::InvalidConfig(
                    "DEBENTURE_SECRET_KEY is not a valid secret seed (S...)".to_string(),
                )
            })?;
        }

        let mut contracts = ContractAddresses::default();
        for role in ContractRole::ALL {
            let key = role.env_key();
            let value = get(&key);
            if let Some(address) = &value {
                parse_contract_id(address).map_err(|e| {
                    ConfigError::InvalidConfig(format!("{}: {}", key, e))
                })?;
            }
            contracts.set(role, value);
        }

        let mode_setting = get("DEBENTURE_MODE").unwrap_or_else(|| "auto".to_string());
        let mode = match mode_setting.to_lowercase().as_str() {
            "auto" => {
                if signing_secret.is_some() {
                    Mode::Live
                } else {
                    Mode::Offline
                }
            }
            "live" => {
                if signing_secret.is_none() {
                    return Err(ConfigError::MissingEnv("DEBENTURE_SECRET_KEY".to_string()));
                }
                Mode::Live
            }
            "offline" => Mode::Offline,
            other => {
                return Err(ConfigError::InvalidConfig(format!(
                    "Invalid mode: {} (expected auto, live or offline)",
                    other
                )))
            }
        };

        let base_fee = get("DEBENTURE_BASE_FEE")
            .unwrap_or_else(|| DEFAULT_BASE_FEE.to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidConfig(format!("Invalid base fee: {}", e)))?;

        let tx_timeout_secs = get("DEBENTURE_TX_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_TX_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidConfig(format!("Invalid tx timeout: {}", e)))?;

        // Validate timeout is reasonable (1 second to 5 minutes)
        if !(1..=300).contains(&tx_timeout_secs) {
            return Err(ConfigError::InvalidConfig(
                "Transaction timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        let defaults = AddressHeuristic::default();
        let address_heuristic = AddressHeuristic {
            prefix: get("DEBENTURE_ADDRESS_PREFIX").unwrap_or(defaults.prefix),
            min_len_exclusive: match get("DEBENTURE_ADDRESS_MIN_LEN") {
                Some(v) => v.parse::<usize>().map_err(|e| {
                    ConfigError::InvalidConfig(format!("Invalid address min length: {}", e))
                })?,
                None => defaults.min_len_exclusive,
            },
        };

        info!(
            network = %network,
            rpc_url = %rpc_url,
            mode = %mode,
            contracts = contracts.configured(),
            "Configuration loaded"
        );
        debug!(base_fee, tx_timeout_secs, "Transaction settings");

        Ok(Config {
            network,
            rpc_url,
            network_passphrase,
            signing_secret,
            contracts,
            mode,
            base_fee,
            tx_timeout_secs,
            address_heuristic,
        })
    }

    /// Offline configuration with no contracts, mostly for tests and demos
    pub fn offline() -> Self {
        Config {
            network: Network::Testnet,
            rpc_url: Network::Testnet.default_rpc_url().to_string(),
            network_passphrase: Network::Testnet.passphrase().to_string(),
            signing_secret: None,
            contracts: ContractAddresses::default(),
            mode: Mode::Offline,
            base_fee: DEFAULT_BASE_FEE,
            tx_timeout_secs: DEFAULT_TX_TIMEOUT_SECS,
            address_heuristic: AddressHeuristic::default(),
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::File {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
