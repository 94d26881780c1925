//! Error taxonomy for contract calls

use thiserror::Error;

/// Coarse classification of a [`CallError`], for callers that render
/// loading / error / data states without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Account,
    Simulation,
    Encoding,
    Decoding,
    Signing,
    Submission,
    Network,
}

#[derive(Debug, Error)]
pub enum CallError {
    /// Endpoint, credential or contract address absent from the configuration
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    /// Source account not found, or the network could not be reached to fetch it
    #[error("Account resolution failed: {0}")]
    AccountResolutionFailed(String),

    /// Simulation finished without a return value
    #[error("Simulation returned no value")]
    SimulationEmpty,

    /// The RPC node reported a simulation error
    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    /// An argument could not be mapped to a wire value
    #[error("Unsupported argument encoding: {0}")]
    EncodingUnsupported(String),

    /// A return value could not be mapped back to a native value
    #[error("Failed to decode return value: {0}")]
    DecodingFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Signed transaction rejected; carries the provider message
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error: {code} - {message}")]
    Rpc { code: i64, message: String },
}

impl CallError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CallError::ConfigurationMissing(_) => ErrorKind::Configuration,
            CallError::AccountResolutionFailed(_) => ErrorKind::Account,
            CallError::SimulationEmpty | CallError::SimulationFailed(_) => ErrorKind::Simulation,
            CallError::EncodingUnsupported(_) => ErrorKind::Encoding,
            CallError::DecodingFailed(_) => ErrorKind::Decoding,
            CallError::SigningFailed(_) => ErrorKind::Signing,
            CallError::SubmissionFailed(_) => ErrorKind::Submission,
            CallError::Transport(_) | CallError::Rpc { .. } => ErrorKind::Network,
        }
    }

    /// Short message suitable for end users
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Configuration => {
                format!("Client is not configured for this operation ({})", self)
            }
            ErrorKind::Account => {
                "Could not load the signing account. Check that it exists and is funded.".to_string()
            }
            ErrorKind::Simulation => {
                "The contract did not return a value. Check the contract address and method.".to_string()
            }
            ErrorKind::Encoding => format!("Invalid argument: {}", self),
            ErrorKind::Decoding => "The contract returned a value that could not be read.".to_string(),
            ErrorKind::Signing => "The transaction could not be signed. Check the secret key.".to_string(),
            ErrorKind::Submission => format!("The network rejected the transaction: {}", self),
            ErrorKind::Network => "Network unavailable. Try again later.".to_string(),
        }
    }

    /// Re-classify a network failure that happened while resolving the source account
    pub(crate) fn into_account_error(self) -> CallError {
        match self {
            CallError::AccountResolutionFailed(_) => self,
            other => CallError::AccountResolutionFailed(other.to_string()),
        }
    }

    /// Re-classify a network failure that happened while submitting
    pub(crate) fn into_submission_error(self) -> CallError {
        match self {
            CallError::Transport(_) | CallError::Rpc { .. } => {
                CallError::SubmissionFailed(self.to_string())
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for CallError {
    fn from(e: serde_json::Error) -> Self {
        CallError::Transport(format!("Invalid RPC payload: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            CallError::ConfigurationMissing("secret key".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(CallError::SimulationEmpty.kind(), ErrorKind::Simulation);
        assert_eq!(
            CallError::Rpc { code: -32601, message: "x".into() }.kind(),
            ErrorKind::Network
        );
    }

    #[test]
    fn test_account_reclassification() {
        let err = CallError::Transport("connection refused".into()).into_account_error();
        assert_eq!(err.kind(), ErrorKind::Account);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_submission_reclassification_keeps_other_kinds() {
        let err = CallError::SigningFailed("bad key".into()).into_submission_error();
        assert_eq!(err.kind(), ErrorKind::Signing);

        let err = CallError::Rpc { code: -32600, message: "txBadSeq".into() }.into_submission_error();
        assert_eq!(err.kind(), ErrorKind::Submission);
        assert!(err.to_string().contains("txBadSeq"));
    }
}
