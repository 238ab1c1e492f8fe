/*
[INPUT]:  Scripted connect/sign outcomes
[OUTPUT]: Deterministic wallet provider for tests and demos
[POS]:    Wallet layer - mock provider implementation
[UPDATE]: When tests need new scripted provider behavior
*/

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::provider::{
    ProviderFailure, ProviderResult, SignMessageParams, SignMessageResponse, WalletAccount,
    WalletProvider,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConnectOutcome {
    Approve,
    Reject,
    Fail(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignOutcome {
    Sign,
    Reject,
    Disconnect,
}

/// Mock wallet provider with predetermined answers
#[derive(Debug)]
pub struct MockWalletProvider {
    account: WalletAccount,
    signature: String,
    connect_outcome: ConnectOutcome,
    sign_outcome: SignOutcome,
    failing_sign_attempts: AtomicUsize,
    disconnect_error: Option<String>,
    connected: AtomicBool,
    sign_calls: Mutex<Vec<SignMessageParams>>,
    disconnects: AtomicUsize,
}

impl MockWalletProvider {
    /// Create a mock that approves connections and signs with `signature`
    pub fn new(address: &str, signature: &str) -> Self {
        Self {
            account: WalletAccount {
                address: address.to_string(),
                public_key: None,
            },
            signature: signature.to_string(),
            connect_outcome: ConnectOutcome::Approve,
            sign_outcome: SignOutcome::Sign,
            failing_sign_attempts: AtomicUsize::new(0),
            disconnect_error: None,
            connected: AtomicBool::new(false),
            sign_calls: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
        }
    }

    pub fn with_public_key(mut self, public_key: &str) -> Self {
        self.account.public_key = Some(public_key.to_string());
        self
    }

    /// The user declines the connection prompt
    pub fn rejecting_connect(mut self) -> Self {
        self.connect_outcome = ConnectOutcome::Reject;
        self
    }

    pub fn failing_connect(mut self, message: &str) -> Self {
        self.connect_outcome = ConnectOutcome::Fail(message.to_string());
        self
    }

    /// The first `attempts` sign calls fail with a generic provider error
    pub fn failing_sign_attempts(self, attempts: usize) -> Self {
        self.failing_sign_attempts.store(attempts, Ordering::SeqCst);
        self
    }

    pub fn rejecting_signatures(mut self) -> Self {
        self.sign_outcome = SignOutcome::Reject;
        self
    }

    /// The provider reports a dropped connection when asked to sign
    pub fn disconnecting_on_sign(mut self) -> Self {
        self.sign_outcome = SignOutcome::Disconnect;
        self
    }

    pub fn failing_disconnect(mut self, message: &str) -> Self {
        self.disconnect_error = Some(message.to_string());
        self
    }

    /// Every sign-message call seen so far, in order
    pub fn sign_calls(&self) -> Vec<SignMessageParams> {
        self.sign_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn connect(&self) -> ProviderResult<WalletAccount> {
        match &self.connect_outcome {
            ConnectOutcome::Approve => {
                self.connected.store(true, Ordering::SeqCst);
                Ok(self.account.clone())
            }
            ConnectOutcome::Reject => Err(ProviderFailure::Rejected(
                "User rejected the request".to_string(),
            )),
            ConnectOutcome::Fail(message) => Err(ProviderFailure::Other(message.clone())),
        }
    }

    async fn account(&self) -> ProviderResult<WalletAccount> {
        if self.is_connected() {
            Ok(self.account.clone())
        } else {
            Err(ProviderFailure::Disconnected("not connected".to_string()))
        }
    }

    async fn sign_message(&self, params: &SignMessageParams) -> ProviderResult<SignMessageResponse> {
        if let Ok(mut calls) = self.sign_calls.lock() {
            calls.push(params.clone());
        }

        match self.sign_outcome {
            SignOutcome::Reject => {
                return Err(ProviderFailure::Rejected("User rejected the request".to_string()));
            }
            SignOutcome::Disconnect => {
                self.connected.store(false, Ordering::SeqCst);
                return Err(ProviderFailure::Disconnected("wallet locked".to_string()));
            }
            SignOutcome::Sign => {}
        }

        let remaining = self.failing_sign_attempts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_sign_attempts.store(remaining - 1, Ordering::SeqCst);
            return Err(ProviderFailure::Other("Invalid sign-message parameters".to_string()));
        }

        Ok(SignMessageResponse {
            signature: self.signature.clone(),
            full_message: None,
        })
    }

    async fn disconnect(&self) -> ProviderResult<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        match &self.disconnect_error {
            Some(message) => Err(ProviderFailure::Other(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockWalletProvider::new("0x1234567890abcdef", "0xmock_signature");

        let account = provider.connect().await.unwrap();
        assert_eq!(account.address, "0x1234567890abcdef");

        let signed = provider
            .sign_message(&SignMessageParams::message_only("test message"))
            .await
            .unwrap();
        assert_eq!(signed.signature, "0xmock_signature");
        assert_eq!(provider.sign_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_rejecting_connect() {
        let provider = MockWalletProvider::new("0x1", "0xsig").rejecting_connect();
        let err = provider.connect().await.unwrap_err();
        assert!(matches!(err, ProviderFailure::Rejected(_)));
        assert!(provider.account().await.is_err());
    }
}
