/// ed25519 transaction signing
use crate::address::account_strkey;
use crate::error::CallError;
use crate::tx::transaction_hash;
use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;
use std::fmt;
use stellar_strkey::ed25519::PrivateKey;
use stellar_xdr::curr::{BytesM, DecoratedSignature, Signature as XdrSignature, SignatureHint, Transaction};

/// Signing identity derived from a Stellar secret seed (`S...`)
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl Signer {
    pub fn from_secret(secret: &str) -> Result<Self, CallError> {
        let seed = PrivateKey::from_string(secret.trim())
            .map_err(|e| CallError::SigningFailed(format!("invalid secret seed: {:?}", e)))?;
        Ok(Self::from_bytes(seed.0))
    }

    pub fn from_bytes(seed: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(&seed),
        }
    }

    /// Fresh random keypair
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Account strkey (`G...`)
    pub fn address(&self) -> String {
        account_strkey(self.public_key())
    }

    /// Secret seed strkey (`S...`)
    pub fn secret_strkey(&self) -> String {
        PrivateKey(self.key.to_bytes()).to_string()
    }

    /// Last four bytes of the public key
    pub fn hint(&self) -> SignatureHint {
        let pk = self.public_key();
        SignatureHint([pk[28], pk[29], pk[30], pk[31]])
    }

    pub fn sign(&self, payload: &[u8]) -> [u8; 64] {
        self.key.sign(payload).to_bytes()
    }

    /// Sign a transaction for the network identified by `network_passphrase`
    pub fn sign_transaction(
        &self,
        tx: &Transaction,
        network_passphrase: &str,
    ) -> Result<DecoratedSignature, CallError> {
        let hash = transaction_hash(tx, network_passphrase)?;
        let signature: BytesM<64> = self
            .sign(&hash)
            .to_vec()
            .try_into()
            .map_err(|e| CallError::SigningFailed(format!("signature: {}", e)))?;

        Ok(DecoratedSignature {
            hint: self.hint(),
            signature: XdrSignature(signature),
        })
    }
}
