/*
[INPUT]:  Connection requests and sign-message parameters
[OUTPUT]: Wallet accounts, signatures, provider-local failures
[POS]:    Wallet layer - capability set every wallet provider exposes
[UPDATE]: When wallet providers gain or change capabilities
*/

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw failure reported by a wallet provider
///
/// Never leaves the crate's orchestrator; it is normalized into `AuthError`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// User declined the prompt
    #[error("user rejected the request: {0}")]
    Rejected(String),

    /// Provider dropped the connection
    #[error("wallet disconnected: {0}")]
    Disconnected(String),

    #[error("{0}")]
    Other(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderFailure>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Parameters passed to `sign_message`
///
/// Providers disagree on which fields they require; see `SignatureShape`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageParams {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_new_format: Option<bool>,
}

impl SignMessageParams {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            nonce: None,
            use_new_format: None,
        }
    }

    pub fn with_nonce(message: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            nonce: Some(nonce.into()),
            use_new_format: None,
        }
    }

    pub fn new_format(mut self) -> Self {
        self.use_new_format = Some(true);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageResponse {
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_message: Option<String>,
}

/// Capability set of a wallet provider (Petra, Martian, Pontem, ...)
///
/// The trait is async to support browser bridges and external signers.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Prompt the user to connect and return the approved account
    async fn connect(&self) -> ProviderResult<WalletAccount>;

    /// Currently connected account
    async fn account(&self) -> ProviderResult<WalletAccount>;

    async fn sign_message(&self, params: &SignMessageParams) -> ProviderResult<SignMessageResponse>;

    /// Providers without a disconnect capability keep this no-op
    async fn disconnect(&self) -> ProviderResult<()> {
        Ok(())
    }
}
