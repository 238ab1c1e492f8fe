/*
[INPUT]:  Wallet provider handle and an AuthChallenge
[OUTPUT]: Signature response using the provider's parameter shape
[POS]:    Wallet layer - per-wallet signing quirks behind one interface
[UPDATE]: When a provider changes which sign-message fields it accepts
*/

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::provider::{
    ProviderFailure, ProviderResult, SignMessageParams, SignMessageResponse, WalletProvider,
};
use crate::types::{AuthChallenge, ProviderKind};

/// Field set a provider expects in `sign_message`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureShape {
    /// `{message}`
    MessageOnly,
    /// `{message, nonce}`
    MessageAndNonce,
    /// `{message, nonce, useNewFormat: true}`
    NewFormat,
}

impl SignatureShape {
    pub fn params(self, challenge: &AuthChallenge) -> SignMessageParams {
        match self {
            SignatureShape::MessageOnly => SignMessageParams::message_only(&challenge.message),
            SignatureShape::MessageAndNonce => {
                SignMessageParams::with_nonce(&challenge.message, &challenge.nonce)
            }
            SignatureShape::NewFormat => {
                SignMessageParams::with_nonce(&challenge.message, &challenge.nonce).new_format()
            }
        }
    }
}

/// One adapter per wallet kind, wrapping the provider object
#[derive(Clone)]
pub enum ProviderAdapter {
    Petra(Arc<dyn WalletProvider>),
    Martian(Arc<dyn WalletProvider>),
    Pontem(Arc<dyn WalletProvider>),
}

impl ProviderAdapter {
    pub fn new(kind: ProviderKind, provider: Arc<dyn WalletProvider>) -> Self {
        match kind {
            ProviderKind::Petra => ProviderAdapter::Petra(provider),
            ProviderKind::Martian => ProviderAdapter::Martian(provider),
            ProviderKind::Pontem => ProviderAdapter::Pontem(provider),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderAdapter::Petra(_) => ProviderKind::Petra,
            ProviderAdapter::Martian(_) => ProviderKind::Martian,
            ProviderAdapter::Pontem(_) => ProviderKind::Pontem,
        }
    }

    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        match self {
            ProviderAdapter::Petra(p) | ProviderAdapter::Martian(p) | ProviderAdapter::Pontem(p) => p,
        }
    }

    pub fn primary_shape(&self) -> SignatureShape {
        match self {
            ProviderAdapter::Petra(_) => SignatureShape::MessageAndNonce,
            ProviderAdapter::Martian(_) => SignatureShape::MessageOnly,
            ProviderAdapter::Pontem(_) => SignatureShape::NewFormat,
        }
    }

    pub fn alternate_shape(&self) -> SignatureShape {
        match self {
            ProviderAdapter::Petra(_) => SignatureShape::MessageOnly,
            ProviderAdapter::Martian(_) | ProviderAdapter::Pontem(_) => SignatureShape::MessageAndNonce,
        }
    }

    /// Sign the challenge, retrying once with the alternate shape.
    ///
    /// Workaround for providers that are inconsistent about required fields;
    /// kept for compatibility only. Rejections and disconnects are not retried.
    pub async fn sign(&self, challenge: &AuthChallenge) -> ProviderResult<SignMessageResponse> {
        let kind = self.kind();
        let primary = match self.sign_with(self.primary_shape(), challenge).await {
            Ok(response) => return Ok(response),
            Err(failure @ (ProviderFailure::Rejected(_) | ProviderFailure::Disconnected(_))) => {
                return Err(failure);
            }
            Err(failure) => failure,
        };

        warn!(
            %kind,
            error = %primary,
            shape = ?self.alternate_shape(),
            "primary sign-message shape failed; retrying with alternate shape"
        );

        match self.sign_with(self.alternate_shape(), challenge).await {
            Ok(response) => Ok(response),
            Err(ProviderFailure::Other(alternate)) => Err(ProviderFailure::Other(format!(
                "primary attempt: {primary}; alternate attempt: {alternate}"
            ))),
            Err(failure) => Err(failure),
        }
    }

    async fn sign_with(
        &self,
        shape: SignatureShape,
        challenge: &AuthChallenge,
    ) -> ProviderResult<SignMessageResponse> {
        debug!(kind = %self.kind(), ?shape, "requesting wallet signature");
        let response = self.provider().sign_message(&shape.params(challenge)).await?;
        if response.signature.trim().is_empty() {
            return Err(ProviderFailure::Other(
                "wallet returned an empty signature".to_string(),
            ));
        }
        Ok(response)
    }
}

impl fmt::Debug for ProviderAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProviderAdapter").field(&self.kind()).finish()
    }
}
