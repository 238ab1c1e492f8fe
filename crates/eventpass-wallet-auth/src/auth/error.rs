/*
[INPUT]:  Provider failures, backend errors, storage errors, local validation
[OUTPUT]: The public auth error taxonomy and user-facing notification text
[POS]:    Error handling layer - the only error type crossing the orchestrator boundary
[UPDATE]: When the taxonomy or user-facing messages change
*/

use thiserror::Error;

use crate::http::BackendError;
use crate::storage::StoreError;
use crate::wallet::ProviderFailure;

/// Errors surfaced by the wallet auth orchestrator
///
/// All are recoverable from the user's point of view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No supported wallet found")]
    NoWalletFound,

    /// User declined a connection or signature prompt
    #[error("Wallet request rejected: {0}")]
    ProviderRejected(String),

    #[error("Wallet error: {0}")]
    ProviderError(String),

    /// Transport failure, timeout, or backend unavailable
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid challenge response: {0}")]
    InvalidChallengeResponse(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid {field}: {message}")]
    ValidationError { field: &'static str, message: String },

    /// Backend refused the signature, address, or token
    #[error("Login rejected: {0}")]
    LoginRejected(String),

    /// No wallet session matching the requested address
    #[error("Wallet not connected for address {0}")]
    WalletNotConnected(String),

    #[error("Another authentication attempt is already in progress")]
    AuthInProgress,

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Single human-readable notification for this failure
    pub fn user_message(&self) -> String {
        match self {
            AuthError::NoWalletFound => {
                "No Aptos wallet detected. Install Petra, Martian or Pontem and try again.".to_string()
            }
            AuthError::ProviderRejected(_) => "The request was rejected in your wallet.".to_string(),
            AuthError::ProviderError(msg) => format!("Your wallet reported an error: {msg}"),
            AuthError::NetworkError(_) => {
                "Could not reach the EventPass server. Check your connection and try again.".to_string()
            }
            AuthError::InvalidChallengeResponse(_) => {
                "The server sent an unexpected sign-in challenge. Please try again.".to_string()
            }
            AuthError::SigningFailed(_) => "Your wallet could not sign the sign-in message.".to_string(),
            AuthError::ValidationError { field, message } => format!("{field} {message}"),
            AuthError::LoginRejected(msg) => format!("Sign-in was rejected: {msg}"),
            AuthError::WalletNotConnected(_) => "Connect your wallet before signing in.".to_string(),
            AuthError::AuthInProgress => "Sign-in is already in progress.".to_string(),
            AuthError::Storage(_) => "Could not save your session on this device.".to_string(),
        }
    }

    /// Check if retrying the same call can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::NetworkError(_)
                | AuthError::InvalidChallengeResponse(_)
                | AuthError::SigningFailed(_)
                | AuthError::AuthInProgress
        )
    }

    pub(crate) fn from_provider(failure: ProviderFailure) -> Self {
        match failure {
            ProviderFailure::Rejected(msg) => AuthError::ProviderRejected(msg),
            ProviderFailure::Disconnected(msg) | ProviderFailure::Other(msg) => {
                AuthError::ProviderError(msg)
            }
        }
    }

    /// Normalize a backend error from the nonce endpoint
    pub(crate) fn from_challenge(err: BackendError) -> Self {
        if err.is_transport() {
            return AuthError::network(&err);
        }
        match err {
            BackendError::Api { status: 401 | 403, message } => AuthError::LoginRejected(message),
            other => AuthError::InvalidChallengeResponse(other.to_string()),
        }
    }

    /// Normalize a backend error from login/register/profile endpoints
    pub(crate) fn from_exchange(err: BackendError) -> Self {
        if err.is_transport() {
            return AuthError::network(&err);
        }
        match err {
            BackendError::Api { message, .. } | BackendError::Unsuccessful { message } => {
                AuthError::LoginRejected(message)
            }
            other => AuthError::LoginRejected(other.to_string()),
        }
    }

    fn network(err: &BackendError) -> Self {
        if err.is_timeout() {
            AuthError::NetworkError("request timed out".to_string())
        } else {
            AuthError::NetworkError(err.to_string())
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Storage(err.to_string())
    }
}
