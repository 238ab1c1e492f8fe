/*
[INPUT]:  Ed25519 key pair and sign-message parameters
[OUTPUT]: Aptos-style signed messages without a browser extension
[POS]:    Wallet layer - local keystore wallet implementation
[UPDATE]: When the signed-message format of Aptos wallets changes
*/

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::debug;

use super::provider::{
    ProviderFailure, ProviderResult, SignMessageParams, SignMessageResponse, WalletAccount,
    WalletProvider,
};
use super::signer::Ed25519Signer;
use crate::types::ProviderKind;

/// Text an Aptos wallet actually signs for `{message, nonce}`
pub fn aptos_full_message(message: &str, nonce: Option<&str>) -> String {
    match nonce {
        Some(nonce) => format!("APTOS\nmessage: {message}\nnonce: {nonce}"),
        None => format!("APTOS\nmessage: {message}"),
    }
}

/// Wallet provider backed by a locally stored Ed25519 key
#[derive(Debug)]
pub struct LocalKeyWallet {
    kind: ProviderKind,
    signer: Ed25519Signer,
    address: String,
    decline_connect: bool,
    connected: AtomicBool,
}

impl LocalKeyWallet {
    pub fn new(kind: ProviderKind, signer: Ed25519Signer) -> Self {
        let address = signer.address();
        Self {
            kind,
            signer,
            address,
            decline_connect: false,
            connected: AtomicBool::new(false),
        }
    }

    /// Simulate a user who declines the connection prompt
    pub fn declining_connect(mut self) -> Self {
        self.decline_connect = true;
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn wallet_account(&self) -> WalletAccount {
        WalletAccount {
            address: self.address.clone(),
            public_key: Some(self.signer.public_key_hex()),
        }
    }

    fn ensure_connected(&self) -> ProviderResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProviderFailure::Disconnected(format!(
                "{} wallet is not connected",
                self.kind
            )))
        }
    }
}

#[async_trait]
impl WalletProvider for LocalKeyWallet {
    async fn connect(&self) -> ProviderResult<WalletAccount> {
        if self.decline_connect {
            return Err(ProviderFailure::Rejected(
                "connection request declined".to_string(),
            ));
        }
        self.connected.store(true, Ordering::SeqCst);
        debug!(kind = %self.kind, address = %self.address, "local wallet connected");
        Ok(self.wallet_account())
    }

    async fn account(&self) -> ProviderResult<WalletAccount> {
        self.ensure_connected()?;
        Ok(self.wallet_account())
    }

    async fn sign_message(&self, params: &SignMessageParams) -> ProviderResult<SignMessageResponse> {
        self.ensure_connected()?;
        if params.message.is_empty() {
            return Err(ProviderFailure::Other("message must not be empty".to_string()));
        }

        let full_message = aptos_full_message(&params.message, params.nonce.as_deref());
        Ok(SignMessageResponse {
            signature: self.signer.sign_hex(&full_message),
            full_message: Some(full_message),
        })
    }

    async fn disconnect(&self) -> ProviderResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}
