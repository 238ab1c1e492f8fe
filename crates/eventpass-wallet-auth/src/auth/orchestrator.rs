/*
[INPUT]:  Provider registry, backend client, session store
[OUTPUT]: Wallet connections and authenticated sessions
[POS]:    Auth layer - orchestrates the wallet challenge/response handshake
[UPDATE]: When handshake steps, state transitions or error mapping change
*/

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::AuthError;
use crate::http::{BackendClient, BackendError};
use crate::storage::SessionStore;
use crate::types::{
    AuthChallenge, AuthState, LoginRequest, ProfileInput, ProviderKind, RegisterRequest, Session,
    SignedChallenge, UserProfile, WalletSession, addresses_match, parse_challenge, parse_exchange,
    parse_profile,
};
use crate::wallet::{ProviderAdapter, ProviderFailure, ProviderRegistry};

/// Result type alias for orchestrator operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Clone)]
struct ActiveWallet {
    session: WalletSession,
    adapter: ProviderAdapter,
    public_key: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    state: AuthState,
    wallet: Option<ActiveWallet>,
    session: Option<Session>,
}

#[derive(Debug, Clone, Copy)]
enum Exchange<'a> {
    Login,
    Register(&'a ProfileInput),
}

impl Exchange<'_> {
    fn name(&self) -> &'static str {
        match self {
            Exchange::Login => "login",
            Exchange::Register(_) => "register",
        }
    }
}

/// Holds `Authenticating` for one round trip; reverts on drop unless committed
struct AuthAttempt<'a> {
    inner: &'a RwLock<Inner>,
    previous: AuthState,
    committed: bool,
}

impl<'a> AuthAttempt<'a> {
    fn begin(inner: &'a RwLock<Inner>) -> Self {
        let mut guard = inner.write().unwrap_or_else(PoisonError::into_inner);
        let previous = guard.state;
        guard.state = AuthState::Authenticating;
        Self {
            inner,
            previous,
            committed: false,
        }
    }

    /// Persist and publish the session atomically with the wallet check
    fn commit(
        mut self,
        wallet_address: &str,
        session: Session,
        store: &SessionStore,
    ) -> AuthResult<Session> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let still_connected = guard
            .wallet
            .as_ref()
            .is_some_and(|wallet| addresses_match(&wallet.session.address, wallet_address));
        if !still_connected {
            return Err(AuthError::WalletNotConnected(wallet_address.to_string()));
        }

        store.save(&session)?;
        guard.session = Some(session.clone());
        guard.state = AuthState::Authenticated;
        self.committed = true;
        Ok(session)
    }
}

impl Drop for AuthAttempt<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if guard.state != AuthState::Authenticating {
            return;
        }
        guard.state = if guard.wallet.is_none() {
            AuthState::Disconnected
        } else if self.previous == AuthState::Authenticated && guard.session.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::WalletConnected
        };
    }
}

/// Mediates between an installed wallet provider and the auth backend
///
/// One orchestrator corresponds to one browser context: at most one wallet
/// session and one authenticated session at a time.
#[derive(Debug)]
pub struct WalletAuthOrchestrator {
    registry: ProviderRegistry,
    client: BackendClient,
    store: SessionStore,
    inner: RwLock<Inner>,
    flow: Mutex<()>,
}

impl WalletAuthOrchestrator {
    pub fn new(registry: ProviderRegistry, client: BackendClient, store: SessionStore) -> Self {
        Self {
            registry,
            client,
            store,
            inner: RwLock::new(Inner::default()),
            flow: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn state(&self) -> AuthState {
        self.read().state
    }

    pub fn wallet_session(&self) -> Option<WalletSession> {
        self.read().wallet.as_ref().map(|wallet| wallet.session.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.read().session.clone()
    }

    /// Highest-priority installed provider: pontem, martian, petra (flag), petra (fallback)
    pub fn detect_provider(&self) -> Option<ProviderKind> {
        self.registry.detect()
    }

    /// Connect to `kind`, or to the detected provider when `None`
    pub async fn connect(&self, kind: Option<ProviderKind>) -> AuthResult<String> {
        let Some(kind) = kind.or_else(|| self.detect_provider()) else {
            warn!("no wallet provider installed");
            return Err(AuthError::NoWalletFound);
        };
        let adapter = self.registry.resolve(kind).ok_or_else(|| {
            warn!(%kind, "requested wallet provider is not installed");
            AuthError::NoWalletFound
        })?;

        let account = adapter.provider().connect().await.map_err(|failure| {
            warn!(%kind, error = %failure, "wallet connection failed");
            AuthError::from_provider(failure)
        })?;
        let address = account.address.trim().to_string();
        if address.is_empty() {
            return Err(AuthError::ProviderError(
                "wallet returned an empty address".to_string(),
            ));
        }

        let previous = {
            let mut inner = self.write();
            let keeps_session = inner
                .session
                .as_ref()
                .is_some_and(|session| addresses_match(&session.user.address, &address));
            if !keeps_session {
                inner.session = None;
            }
            let previous = inner.wallet.replace(ActiveWallet {
                session: WalletSession {
                    provider_kind: kind,
                    address: address.clone(),
                    connected: true,
                },
                adapter,
                public_key: account.public_key,
            });
            inner.state = if inner.session.is_some() {
                AuthState::Authenticated
            } else {
                AuthState::WalletConnected
            };
            previous
        };

        if let Some(previous) = previous.filter(|wallet| wallet.adapter.kind() != kind) {
            if let Err(err) = previous.adapter.provider().disconnect().await {
                warn!(kind = %previous.adapter.kind(), error = %err, "failed to release previous wallet");
            }
        }

        info!(%kind, %address, "wallet connected");
        Ok(address)
    }

    /// Ask the backend for a one-time challenge
    pub async fn request_challenge(&self, address: &str) -> AuthResult<AuthChallenge> {
        let body = self
            .client
            .request_nonce(address)
            .await
            .map_err(AuthError::from_challenge)?;
        let challenge = parse_challenge(&body)
            .map_err(|err| AuthError::InvalidChallengeResponse(detail(err)))?;
        debug!(%address, nonce = %challenge.nonce, "challenge issued");
        Ok(challenge)
    }

    /// Have the `kind` wallet sign the challenge
    pub async fn sign_challenge(
        &self,
        challenge: &AuthChallenge,
        kind: ProviderKind,
    ) -> AuthResult<SignedChallenge> {
        let adapter = self.registry.resolve(kind).ok_or(AuthError::NoWalletFound)?;
        let public_key = {
            let inner = self.read();
            inner
                .wallet
                .as_ref()
                .filter(|wallet| wallet.session.provider_kind == kind)
                .and_then(|wallet| wallet.public_key.clone())
        };

        match adapter.sign(challenge).await {
            Ok(response) => Ok(SignedChallenge {
                signature: response.signature,
                message: challenge.message.clone(),
                nonce: challenge.nonce.clone(),
                issued_at_unix_seconds: challenge.issued_at_unix_seconds,
                full_message: response.full_message,
                public_key,
            }),
            Err(ProviderFailure::Rejected(message)) => Err(AuthError::ProviderRejected(message)),
            Err(ProviderFailure::Disconnected(message)) => {
                self.forget_wallet(kind);
                Err(AuthError::ProviderError(message))
            }
            Err(ProviderFailure::Other(message)) => Err(AuthError::SigningFailed(message)),
        }
    }

    /// Challenge, sign and exchange against the login endpoint
    pub async fn login(&self, address: &str) -> AuthResult<Session> {
        self.authenticate(address, Exchange::Login).await
    }

    /// Validate `profile` locally, then challenge, sign and register
    pub async fn register(&self, address: &str, profile: &ProfileInput) -> AuthResult<Session> {
        profile.validate()?;
        self.authenticate(address, Exchange::Register(profile)).await
    }

    async fn authenticate(&self, address: &str, exchange: Exchange<'_>) -> AuthResult<Session> {
        let Ok(_flow) = self.flow.try_lock() else {
            debug!(flow = exchange.name(), "authentication already in flight");
            return Err(AuthError::AuthInProgress);
        };

        let result = self.run_exchange(address, exchange).await;
        match &result {
            Ok(session) => {
                info!(
                    flow = exchange.name(),
                    address = %session.user.address,
                    role = %session.user.role,
                    "authenticated"
                );
            }
            Err(err) => warn!(flow = exchange.name(), %address, error = %err, "authentication failed"),
        }
        result
    }

    async fn run_exchange(&self, address: &str, exchange: Exchange<'_>) -> AuthResult<Session> {
        let wallet = self.active_wallet_for(address)?;
        let kind = wallet.session.provider_kind;
        let wallet_address = wallet.session.address;

        let attempt = AuthAttempt::begin(&self.inner);
        debug!(%kind, address = %wallet_address, flow = exchange.name(), "authenticating");

        let challenge = self.request_challenge(&wallet_address).await?;
        let signed = self.sign_challenge(&challenge, kind).await?;

        let response = match exchange {
            Exchange::Login => {
                self.client
                    .login(&LoginRequest::new(&wallet_address, &signed))
                    .await
            }
            Exchange::Register(profile) => {
                self.client
                    .register(&RegisterRequest::new(&wallet_address, &signed, profile))
                    .await
            }
        }
        .map_err(AuthError::from_exchange)?;

        let session =
            parse_exchange(&response).map_err(|err| AuthError::LoginRejected(detail(err)))?;
        if !addresses_match(&session.user.address, &wallet_address) {
            return Err(AuthError::LoginRejected(
                "session profile does not belong to the connected wallet".to_string(),
            ));
        }

        attempt.commit(&wallet_address, session, &self.store)
    }

    /// Release the wallet and drop the in-memory session. Never fails.
    pub async fn disconnect(&self) {
        let wallet = self.read().wallet.clone();
        if let Some(wallet) = &wallet {
            if let Err(err) = wallet.adapter.provider().disconnect().await {
                warn!(kind = %wallet.adapter.kind(), error = %err, "wallet disconnect failed");
            }
        }

        {
            let mut inner = self.write();
            inner.wallet = None;
            inner.session = None;
            inner.state = AuthState::Disconnected;
        }

        match wallet {
            Some(wallet) => info!(kind = %wallet.session.provider_kind, "wallet disconnected"),
            None => debug!("disconnect called without an active wallet"),
        }
    }

    /// Invalidate the session everywhere, then disconnect. Never fails.
    pub async fn logout(&self) {
        let token = self.read().session.as_ref().map(|session| session.token.clone());
        let token = match token {
            Some(token) => Some(token),
            None => self.store.token().unwrap_or_else(|err| {
                warn!(error = %err, "could not read persisted token");
                None
            }),
        };

        if let Some(token) = token {
            if let Err(err) = self.client.logout(&token).await {
                warn!(error = %err, "backend logout failed; clearing local session anyway");
            }
        }

        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear persisted session");
        }

        self.disconnect().await;
        info!("logged out");
    }

    /// Restore a persisted session for the connected wallet
    ///
    /// Returns `None` when nothing is stored, the stored profile belongs to
    /// another address, or the backend no longer accepts the token. A backend
    /// that cannot be reached keeps the cached profile.
    pub async fn restore_session(&self) -> AuthResult<Option<Session>> {
        let Ok(_flow) = self.flow.try_lock() else {
            return Err(AuthError::AuthInProgress);
        };

        let Some(wallet_address) = self.wallet_session().map(|wallet| wallet.address) else {
            debug!("no wallet connected; skipping session restore");
            return Ok(None);
        };
        let Some(cached) = self.store.load()? else {
            debug!("no persisted session");
            return Ok(None);
        };
        if !addresses_match(&cached.user.address, &wallet_address) {
            info!(%wallet_address, "persisted session belongs to another wallet; clearing");
            self.store.clear()?;
            return Ok(None);
        }

        let session = match self.client.fetch_profile(&cached.token).await {
            Ok(body) => match parse_profile(&body) {
                Ok(user) if addresses_match(&user.address, &wallet_address) => {
                    self.store.update_user(&user)?;
                    Session {
                        token: cached.token,
                        user,
                    }
                }
                Ok(_) => {
                    warn!("backend profile address differs from cached session; clearing");
                    self.store.clear()?;
                    return Ok(None);
                }
                Err(err) => {
                    warn!(error = %err, "malformed profile response; keeping cached profile");
                    cached
                }
            },
            Err(err) if err.is_auth_rejection() => {
                info!("persisted token rejected by backend; clearing");
                self.store.clear()?;
                return Ok(None);
            }
            Err(err) => {
                warn!(error = %err, "could not revalidate persisted session; keeping cached profile");
                cached
            }
        };

        {
            let mut inner = self.write();
            let still_connected = inner
                .wallet
                .as_ref()
                .is_some_and(|wallet| addresses_match(&wallet.session.address, &wallet_address));
            if !still_connected {
                return Ok(None);
            }
            inner.session = Some(session.clone());
            inner.state = AuthState::Authenticated;
        }

        info!(address = %session.user.address, "session restored");
        Ok(Some(session))
    }

    /// Re-fetch the profile for the active session.
    ///
    /// Shares the flow lock with login and register, so a refresh never
    /// writes a profile over a session that an exchange is replacing.
    pub async fn refresh_profile(&self) -> AuthResult<UserProfile> {
        let Ok(_flow) = self.flow.try_lock() else {
            return Err(AuthError::AuthInProgress);
        };
        let Some(session) = self.session() else {
            return Err(AuthError::LoginRejected("not signed in".to_string()));
        };

        let body = match self.client.fetch_profile(&session.token).await {
            Ok(body) => body,
            Err(err) => {
                if err.is_auth_rejection() {
                    info!("session token rejected; dropping session");
                    self.invalidate_session(&session.token);
                }
                return Err(AuthError::from_exchange(err));
            }
        };

        let user = parse_profile(&body).map_err(|err| AuthError::LoginRejected(detail(err)))?;
        if !addresses_match(&user.address, &session.user.address) {
            return Err(AuthError::LoginRejected(
                "profile address does not match the session".to_string(),
            ));
        }

        {
            let mut inner = self.write();
            match inner.session.as_mut() {
                Some(current) if current.token == session.token => {
                    self.store.update_user(&user)?;
                    current.user = user.clone();
                }
                _ => {
                    debug!("session ended during profile refresh; discarding profile");
                    return Err(AuthError::LoginRejected("not signed in".to_string()));
                }
            }
        }
        debug!(address = %user.address, "profile refreshed");
        Ok(user)
    }

    fn active_wallet_for(&self, address: &str) -> AuthResult<ActiveWallet> {
        self.read()
            .wallet
            .as_ref()
            .filter(|wallet| addresses_match(&wallet.session.address, address))
            .cloned()
            .ok_or_else(|| AuthError::WalletNotConnected(address.to_string()))
    }

    /// The provider dropped its connection on its own
    fn forget_wallet(&self, kind: ProviderKind) {
        let mut inner = self.write();
        let matches_kind = inner
            .wallet
            .as_ref()
            .is_some_and(|wallet| wallet.session.provider_kind == kind);
        if matches_kind {
            warn!(%kind, "wallet provider disconnected");
            inner.wallet = None;
            inner.session = None;
            inner.state = AuthState::Disconnected;
        }
    }

    fn invalidate_session(&self, token: &str) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear persisted session");
        }
        let mut inner = self.write();
        if inner.session.as_ref().is_some_and(|session| session.token == token) {
            inner.session = None;
            if inner.state == AuthState::Authenticated {
                inner.state = AuthState::WalletConnected;
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn detail(err: BackendError) -> String {
    match err {
        BackendError::InvalidResponse(message) => message,
        other => other.to_string(),
    }
}
