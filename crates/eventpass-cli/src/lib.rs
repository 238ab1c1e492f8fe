/*
[INPUT]:  Public API exports for eventpass-cli crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod commands;
pub mod config;
pub mod wallets;

// Re-export main types for convenience
pub use config::CliConfig;
pub use wallets::detect_wallets;
