/*
[INPUT]:  CLI configuration and parsed subcommand arguments
[OUTPUT]: Wallet connections, sessions and keystore changes
[POS]:    Command layer - wires config into the orchestrator per invocation
[UPDATE]: When adding subcommands or changing their flow
*/

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use eventpass_wallet_auth::{
    BackendClient, FileStore, Keystore, ProfileInput, ProviderKind, Session, SessionStore,
    WalletAuthOrchestrator,
};
use tracing::info;

use crate::config::CliConfig;
use crate::wallets::detect_wallets;

/// One orchestrator built from configuration
#[derive(Debug)]
pub struct App {
    config: CliConfig,
    store: SessionStore,
    orchestrator: WalletAuthOrchestrator,
}

impl App {
    pub fn new(config: CliConfig) -> Result<Self> {
        let registry = detect_wallets(&config.wallet);
        let client = BackendClient::with_config(config.client_config(), &config.backend.base_url)
            .context("invalid backend configuration")?;
        let store = SessionStore::new(Arc::new(FileStore::new(&config.session.file)));

        Ok(Self {
            orchestrator: WalletAuthOrchestrator::new(registry, client, store.clone()),
            store,
            config,
        })
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &WalletAuthOrchestrator {
        &self.orchestrator
    }

    /// Connect `wallet`, the configured preference, or the detected wallet
    pub async fn connect(&self, wallet: Option<ProviderKind>) -> Result<String> {
        let kind = wallet.or(self.config.wallet.preferred);
        Ok(self.orchestrator.connect(kind).await?)
    }

    pub async fn login(&self, wallet: Option<ProviderKind>) -> Result<Session> {
        let address = self.connect(wallet).await?;
        Ok(self.orchestrator.login(&address).await?)
    }

    pub async fn register(
        &self,
        wallet: Option<ProviderKind>,
        profile: &ProfileInput,
    ) -> Result<Session> {
        // Reject bad input before prompting the wallet
        profile.validate()?;
        let address = self.connect(wallet).await?;
        Ok(self.orchestrator.register(&address, profile).await?)
    }

    /// Connect and restore the persisted session, if it belongs to this wallet
    pub async fn whoami(&self, wallet: Option<ProviderKind>) -> Result<Option<Session>> {
        self.connect(wallet).await?;
        Ok(self.orchestrator.restore_session().await?)
    }

    /// When the persisted session was last written
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.store.saved_at().ok().flatten()
    }

    pub async fn logout(&self) -> Result<()> {
        self.orchestrator.logout().await;
        Ok(())
    }
}

/// Create (or reuse) the local key for `kind` and return its address
pub fn keygen(config: &CliConfig, kind: ProviderKind) -> Result<String> {
    let keystore = Keystore::new(&config.wallet.keystore_dir);
    let signer = keystore
        .get_or_create_signer(kind)
        .with_context(|| format!("failed to write key for {kind}"))?;
    info!(%kind, path = %keystore.key_file_path(kind).display(), "wallet key ready");
    Ok(signer.address())
}

/// Installed wallets in detection priority order
pub fn installed_wallets(config: &CliConfig) -> Vec<ProviderKind> {
    detect_wallets(&config.wallet).installed()
}

pub fn describe_session(session: &Session, saved_at: Option<DateTime<Utc>>) -> String {
    let user = &session.user;
    let mut lines = vec![
        format!("address:  {}", user.address),
        format!("name:     {}", user.display_name),
        format!("email:    {}", user.email),
        format!("role:     {}", user.role),
        format!("verified: {}", user.verified),
    ];
    if let Some(organization) = &user.organization_name {
        lines.push(format!("org:      {organization}"));
    }
    if let Some(saved_at) = saved_at {
        let local = saved_at.with_timezone(&Local);
        lines.push(format!("since:    {}", local.format("%Y-%m-%d %H:%M")));
    }
    lines.join("\n")
}
