/*
[INPUT]:  EVENTPASS_BACKEND_URL environment variable
[OUTPUT]: Authenticated session from a throwaway local wallet
[POS]:    Examples - wallet sign-in flow demonstration
[UPDATE]: When auth flow changes
*/

use std::sync::Arc;

use eventpass_wallet_auth::*;

/// Example: wallet sign-in flow
///
/// 1. Register a local Ed25519 wallet as the injected Petra provider
/// 2. Detect and connect it
/// 3. Log in (challenge, sign, exchange)
/// 4. Log out
#[tokio::main]
async fn main() {
    println!("=== EventPass Wallet Sign-in Example ===\n");

    let base_url = std::env::var("EVENTPASS_BACKEND_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = match BackendClient::new(&base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created for {}", base_url);

    let wallet = LocalKeyWallet::new(ProviderKind::Petra, Ed25519Signer::generate());
    println!("✓ Local wallet address: {}", wallet.address());

    let provider: Arc<dyn WalletProvider> = Arc::new(wallet);
    let registry = ProviderRegistry::from_injected(InjectedGlobals {
        aptos: Some((provider, true)),
        ..InjectedGlobals::default()
    });
    let store = SessionStore::new(Arc::new(MemoryStore::new()));
    let orchestrator = WalletAuthOrchestrator::new(registry, client, store);
    println!("✓ Detected wallet: {:?}", orchestrator.detect_provider());

    let address = match orchestrator.connect(None).await {
        Ok(address) => address,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return;
        }
    };
    println!("✓ Connected {}", address);

    match orchestrator.login(&address).await {
        Ok(session) => println!("✓ Signed in as {} ({})", session.user.display_name, session.user.role),
        Err(e) => {
            eprintln!("Sign-in failed: {}", e.user_message());
            return;
        }
    }

    orchestrator.logout().await;
    println!("\n✓ Sign-in example complete (state: {})", orchestrator.state());
}
