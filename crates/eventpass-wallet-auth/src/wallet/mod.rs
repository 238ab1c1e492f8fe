/*
[INPUT]:  Wallet provider objects and key material
[OUTPUT]: Provider adapters, registry detection, signatures
[POS]:    Wallet layer - everything on the wallet side of the handshake
[UPDATE]: When adding wallet kinds or provider implementations
*/

pub mod adapter;
pub mod keystore;
pub mod local;
pub mod mock;
pub mod provider;
pub mod registry;
pub mod signer;

pub use adapter::{ProviderAdapter, SignatureShape};
pub use keystore::Keystore;
pub use local::{LocalKeyWallet, aptos_full_message};
pub use mock::MockWalletProvider;
pub use provider::{
    ProviderFailure, ProviderResult, SignMessageParams, SignMessageResponse, WalletAccount,
    WalletProvider,
};
pub use registry::{Discovery, InjectedGlobals, ProviderRegistry};
pub use signer::Ed25519Signer;
