/*
[INPUT]:  Wallet configuration and the on-disk keystore
[OUTPUT]: Provider registry of local keystore wallets
[POS]:    Wallet detection - the CLI's stand-in for injected browser wallets
[UPDATE]: When wallet discovery or keystore layout changes
*/

use std::sync::Arc;

use eventpass_wallet_auth::{
    Discovery, Keystore, LocalKeyWallet, ProviderKind, ProviderRegistry, WalletProvider,
};
use tracing::{debug, warn};

use crate::config::WalletConfig;

/// Register one local wallet per readable key in the keystore
pub fn detect_wallets(config: &WalletConfig) -> ProviderRegistry {
    let keystore = Keystore::new(&config.keystore_dir);
    let mut registry = ProviderRegistry::new();

    for kind in keystore.stored_kinds() {
        let Some(signer) = keystore.load_signer(kind) else {
            warn!(%kind, path = %keystore.key_file_path(kind).display(), "unreadable wallet key; skipping");
            continue;
        };

        let mut wallet = LocalKeyWallet::new(kind, signer);
        if config.declined.contains(&kind) {
            wallet = wallet.declining_connect();
        }
        let provider: Arc<dyn WalletProvider> = Arc::new(wallet);
        registry.register(kind, discovery_for(kind, config.petra_flagged), provider);
    }

    debug!(installed = ?registry.installed(), "local wallets detected");
    registry
}

fn discovery_for(kind: ProviderKind, petra_flagged: bool) -> Discovery {
    match kind {
        ProviderKind::Petra if petra_flagged => Discovery::PetraFlag,
        ProviderKind::Petra => Discovery::PetraFallback,
        ProviderKind::Martian | ProviderKind::Pontem => Discovery::Injected,
    }
}
