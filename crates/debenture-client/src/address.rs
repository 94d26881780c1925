/// Conversions between Stellar strkeys and XDR address types
use crate::error::CallError;
use stellar_strkey::{ed25519, Contract, Strkey};
use stellar_xdr::curr::{AccountId, ContractId, Hash, MuxedAccount, PublicKey, ScAddress, Uint256};

/// Parse a `G...` account or `C...` contract strkey into an `ScAddress`
pub fn parse_address(s: &str) -> Result<ScAddress, CallError> {
    match Strkey::from_string(s) {
        Ok(Strkey::PublicKeyEd25519(ed25519::PublicKey(bytes))) => Ok(ScAddress::Account(
            AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(bytes))),
        )),
        Ok(Strkey::Contract(Contract(bytes))) => Ok(ScAddress::Contract(ContractId(Hash(bytes)))),
        Ok(_) => Err(CallError::EncodingUnsupported(format!(
            "{} is neither an account nor a contract address",
            s
        ))),
        Err(e) => Err(CallError::EncodingUnsupported(format!(
            "invalid address '{}': {:?}",
            s, e
        ))),
    }
}

/// Parse a contract strkey into raw contract id bytes
pub fn parse_contract_id(s: &str) -> Result<ScAddress, CallError> {
    match Contract::from_string(s) {
        Ok(Contract(bytes)) => Ok(ScAddress::Contract(ContractId(Hash(bytes)))),
        Err(e) => Err(CallError::EncodingUnsupported(format!(
            "invalid contract id '{}': {:?}",
            s, e
        ))),
    }
}

/// Format an address in Stellar strkey format
pub fn format_address(addr: &ScAddress) -> Result<String, CallError> {
    match addr {
        ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(bytes)))) => {
            Ok(ed25519::PublicKey(*bytes).to_string())
        }
        ScAddress::Contract(ContractId(Hash(bytes))) => Ok(Contract(*bytes).to_string()),
        other => Err(CallError::DecodingFailed(format!(
            "unsupported address kind: {:?}",
            other
        ))),
    }
}

/// XDR account id for a raw ed25519 public key
pub fn account_id(public_key: [u8; 32]) -> AccountId {
    AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(public_key)))
}

/// Transaction source for a raw ed25519 public key
pub fn muxed_account(public_key: [u8; 32]) -> MuxedAccount {
    MuxedAccount::Ed25519(Uint256(public_key))
}

/// Strkey (`G...`) for a raw ed25519 public key
pub fn account_strkey(public_key: [u8; 32]) -> String {
    ed25519::PublicKey(public_key).to_string()
}
