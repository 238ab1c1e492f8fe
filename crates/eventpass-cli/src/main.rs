/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Wallet connection, sign-in and session management from a terminal
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or shutdown handling
*/

mod cli;

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use console::style;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use eventpass_cli::CliConfig;
use eventpass_cli::commands::{self, App};
use eventpass_cli::config::default_config_path;
use eventpass_wallet_auth::{AuthError, ProviderKind, UserRole};

use crate::cli::prompt::{ProfileArgs, collect_profile};

#[derive(Parser, Debug)]
#[command(name = "eventpass", version, about = "EventPass wallet sign-in")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: String,
    /// Override the backend base URL from config
    #[arg(long = "backend-url", value_name = "URL", global = true)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Create a local key for a wallet and print its address
    Keygen {
        #[arg(long, value_name = "KIND")]
        wallet: ProviderKind,
    },
    /// List installed wallets in detection order
    Detect,
    /// Connect a wallet and restore its saved session
    Connect {
        #[arg(long, value_name = "KIND")]
        wallet: Option<ProviderKind>,
    },
    /// Sign in with a wallet signature
    Login {
        #[arg(long, value_name = "KIND")]
        wallet: Option<ProviderKind>,
    },
    /// Create an account with a wallet signature
    Register {
        #[arg(long, value_name = "KIND")]
        wallet: Option<ProviderKind>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_name = "ROLE")]
        role: Option<UserRole>,
        #[arg(long = "org-name")]
        organization_name: Option<String>,
        #[arg(long = "org-description")]
        organization_description: Option<String>,
    },
    /// Show the signed-in profile for a wallet
    Whoami {
        #[arg(long, value_name = "KIND")]
        wallet: Option<ProviderKind>,
    },
    /// Sign out and forget the saved session
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(&args.log_level) {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    if let Command::Init { output } = &args.command {
        let output = output.clone().unwrap_or_else(default_config_path);
        return cli::init::run_init(&output);
    }

    let mut config = CliConfig::load(args.config_path.as_deref())?;
    if let Some(url) = args.backend_url {
        config.backend.base_url = url;
    }
    info!(backend = %config.backend.base_url, "configuration loaded");

    match args.command {
        Command::Init { .. } => Ok(()),
        Command::Keygen { wallet } => {
            let address = commands::keygen(&config, wallet)?;
            println!("{wallet}: {address}");
            Ok(())
        }
        Command::Detect => {
            let wallets = commands::installed_wallets(&config);
            if wallets.is_empty() {
                println!("{}", style("No wallets installed. Run `eventpass keygen`.").yellow());
            }
            for (index, kind) in wallets.iter().enumerate() {
                let marker = if index == 0 { " (detected)" } else { "" };
                println!("{kind}{marker}");
            }
            Ok(())
        }
        Command::Connect { wallet } => {
            let app = App::new(config)?;
            with_shutdown(async {
                let address = app.connect(wallet).await?;
                println!("connected: {address}");
                match app.orchestrator().restore_session().await? {
                    Some(session) => println!("{}", commands::describe_session(&session, app.saved_at())),
                    None => println!("{}", style("not signed in").dim()),
                }
                Ok::<(), anyhow::Error>(())
            })
            .await
        }
        Command::Login { wallet } => {
            let app = App::new(config)?;
            with_shutdown(async {
                let session = app.login(wallet).await?;
                println!("{}", style("Signed in").bold().green());
                println!("{}", commands::describe_session(&session, app.saved_at()));
                Ok::<(), anyhow::Error>(())
            })
            .await
        }
        Command::Register {
            wallet,
            name,
            email,
            role,
            organization_name,
            organization_description,
        } => {
            let profile = collect_profile(ProfileArgs {
                name,
                email,
                role,
                organization_name,
                organization_description,
            })?;
            let app = App::new(config)?;
            with_shutdown(async {
                let session = app.register(wallet, &profile).await?;
                println!("{}", style("Registered").bold().green());
                println!("{}", commands::describe_session(&session, app.saved_at()));
                Ok::<(), anyhow::Error>(())
            })
            .await
        }
        Command::Whoami { wallet } => {
            let app = App::new(config)?;
            with_shutdown(async {
                match app.whoami(wallet).await? {
                    Some(session) => println!("{}", commands::describe_session(&session, app.saved_at())),
                    None => println!("{}", style("not signed in").dim()),
                }
                Ok::<(), anyhow::Error>(())
            })
            .await
        }
        Command::Logout => {
            let app = App::new(config)?;
            with_shutdown(app.logout()).await?;
            println!("signed out");
            Ok(())
        }
    }
}

/// Run `work` until it finishes or a shutdown signal arrives
async fn with_shutdown<F>(work: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    tokio::select! {
        result = work => result,
        _ = shutdown.cancelled() => {
            warn!("interrupted; in-flight sign-in abandoned");
            Err(anyhow!("interrupted"))
        }
    }
}

/// Auth failures get their single user-facing line; everything else the error chain
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<AuthError>() {
        Some(auth) => {
            warn!(error = %auth, "command failed");
            eprintln!("{}", style(auth.user_message()).red());
        }
        None => eprintln!("{} {err:#}", style("error:").red().bold()),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
