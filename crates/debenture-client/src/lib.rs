//! Soroban view-call client for the debenture contracts
//!
//! Encodes typed arguments into Soroban wire values, simulates read-only
//! invocations and signs and submits state-changing ones, then decodes the
//! typed return value. An offline fixture provider stands in for the network
//! when no credentials are configured.

pub mod address;
pub mod batch;
pub mod caller;
pub mod client;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod legacy;
pub mod offline;
pub mod render;
pub mod rpc;
pub mod service;
pub mod signer;
pub mod transport;
pub mod tx;
pub mod types;

pub use batch::{call_views, BatchEntry};
pub use caller::{connect, ContractCaller};
pub use client::LiveClient;
pub use config::{Config, ConfigError, ContractAddresses, ContractRole, Mode, Network};
pub use decoder::{decode_scval, decode_scval_bytes, decode_scval_native};
pub use encoder::{encode, encode_args, encode_base64};
pub use error::{CallError, ErrorKind};
pub use legacy::AddressHeuristic;
pub use offline::{Fixtures, OfflineClient};
pub use rpc::StellarRpcClient;
pub use service::{Dashboard, DebentureService, IpcaPoint, BOND_FIELDS};
pub use signer::Signer;
pub use transport::{HttpTransport, MockTransport, RpcTransport};
pub use types::*;
