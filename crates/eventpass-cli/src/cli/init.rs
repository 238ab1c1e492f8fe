/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When CliConfig schema changes
*/

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::{Path, PathBuf};

use eventpass_wallet_auth::{NonceMethod, ProviderKind};
use eventpass_cli::CliConfig;

pub fn run_init(output: &Path) -> Result<()> {
    println!("{}", style("Welcome to EventPass CLI setup").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a new configuration file.").dim()
    );

    let theme = ColorfulTheme::default();
    let mut config = CliConfig::default();

    println!("\n{}", style("--- Backend ---").bold());
    config.backend.base_url = Input::with_theme(&theme)
        .with_prompt("Backend URL")
        .default(config.backend.base_url.clone())
        .interact_text()?;

    let methods = ["POST", "GET"];
    let method = Select::with_theme(&theme)
        .with_prompt("Nonce request method")
        .items(&methods)
        .default(0)
        .interact()?;
    config.backend.endpoints.nonce_method = if method == 1 {
        NonceMethod::Get
    } else {
        NonceMethod::Post
    };

    println!("\n{}", style("--- Wallet ---").bold());
    let mut choices = vec!["auto-detect".to_string()];
    choices.extend(ProviderKind::ALL.iter().map(ToString::to_string));
    let preferred = Select::with_theme(&theme)
        .with_prompt("Preferred wallet")
        .items(&choices)
        .default(0)
        .interact()?;
    config.wallet.preferred = preferred
        .checked_sub(1)
        .and_then(|index| ProviderKind::ALL.get(index).copied());

    let keystore_dir: String = Input::with_theme(&theme)
        .with_prompt("Keystore directory")
        .default(config.wallet.keystore_dir.display().to_string())
        .interact_text()?;
    config.wallet.keystore_dir = PathBuf::from(keystore_dir);

    let session_file: String = Input::with_theme(&theme)
        .with_prompt("Session file")
        .default(config.session.file.display().to_string())
        .interact_text()?;
    config.session.file = PathBuf::from(session_file);

    if output.exists() {
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", style("Aborted; nothing written.").yellow());
            return Ok(());
        }
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(output, config.to_yaml()?)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!("Configuration written to: {}", style(output.display()).cyan());

    Ok(())
}
