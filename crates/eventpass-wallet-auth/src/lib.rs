/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public EventPass wallet auth crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod storage;
pub mod types;
pub mod wallet;

// Re-export commonly used types from auth
pub use auth::{AuthError, AuthResult, WalletAuthOrchestrator};

// Re-export commonly used types from http
pub use http::{BackendClient, BackendError, ClientConfig, Endpoints, NonceMethod};

// Re-export commonly used types from storage
pub use storage::{FileStore, KeyValueStore, MemoryStore, SessionStore};

// Re-export all types
pub use types::*;

// Re-export commonly used types from wallet
pub use wallet::{
    Discovery, Ed25519Signer, InjectedGlobals, Keystore, LocalKeyWallet, MockWalletProvider,
    ProviderAdapter, ProviderFailure, ProviderRegistry, WalletProvider,
};
