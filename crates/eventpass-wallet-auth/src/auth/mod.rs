/*
[INPUT]:  Wallet providers, backend client, session store
[OUTPUT]: The wallet auth orchestrator and its error taxonomy
[POS]:    Auth layer - the handshake state machine
[UPDATE]: When the auth flow or error taxonomy changes
*/

pub mod error;
pub mod orchestrator;

pub use error::AuthError;
pub use orchestrator::{AuthResult, WalletAuthOrchestrator};
