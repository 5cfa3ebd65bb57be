//! Keyward CLI - keypair lifecycle manager for bridge authentication

use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use keyward_core::config::Config;
use keyward_core::domain::keys::{
    KeyLifecycleService, KeyStatus, KeyStore, RegisterKeyRequest, UnregisterOutcome,
};
use keyward_core::infrastructure::bridge::BridgeClient;
use serde_json::json;
use tracing::info;

#[derive(Parser)]
#[command(name = "keyward")]
#[command(author, version, about = "Keypair lifecycle manager for bridge authentication", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new keypair and stage it locally
    Generate,

    /// Register the staged public key with the bridge
    Register,

    /// Revoke the public key on the bridge and clear local keys
    Unregister,

    /// Show local key status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("keyward=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate => {
            let (service, bridge) = open().await?;
            cmd_generate(&service, &bridge, cli.format, cli.quiet).await
        }
        Commands::Register => {
            let (service, bridge) = open().await?;
            cmd_register(&service, &bridge, cli.format, cli.quiet).await
        }
        Commands::Unregister => {
            let (service, bridge) = open().await?;
            cmd_unregister(&service, &bridge, cli.format, cli.quiet).await
        }
        Commands::Status => {
            let (service, _bridge) = open().await?;
            cmd_status(&service, cli.format).await
        }
        Commands::Config { action } => cmd_config(action, cli.quiet),
    }
}

/// Wire the lifecycle service and bridge client from configuration
async fn open() -> anyhow::Result<(KeyLifecycleService, BridgeClient)> {
    let config = Config::load()?;
    let storage = config.storage.open()?;
    let store = KeyStore::load(storage)
        .await
        .context("Failed to load keys from storage")?;
    let service = KeyLifecycleService::with_options(Arc::new(store), config.lifecycle.options());
    let bridge = config.bridge.client()?;
    info!(backend = %config.storage.backend, bridge = %bridge.base_url(), "Opened key store");
    Ok((service, bridge))
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_generate(
    service: &KeyLifecycleService,
    bridge: &BridgeClient,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    if service.store().state().is_complete() {
        return Err(anyhow!(
            "A keypair is already staged. Run `keyward unregister` before generating a new one."
        ));
    }

    let keypair = service.generate_keypair(Some(bridge)).await?;

    match format {
        OutputFormat::Json => println!("{}", json!({ "public_key": keypair.public_key() })),
        OutputFormat::Text => {
            if !quiet {
                println!("Keypair generated and stored locally.");
                println!("  Public key: {}", keypair.public_key());
                println!("\nNext step: run `keyward register` to register it with the bridge.");
            } else {
                println!("{}", keypair.public_key());
            }
        }
    }
    Ok(())
}

async fn cmd_register(
    service: &KeyLifecycleService,
    bridge: &BridgeClient,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let public_key = service.store().public_key();
    if public_key.is_empty() {
        return Err(anyhow!("No keypair staged. Run `keyward generate` first."));
    }

    service
        .register_key(RegisterKeyRequest::new(Some(bridge), public_key.clone()))
        .await?;

    match format {
        OutputFormat::Json => println!("{}", json!({ "registered": true, "public_key": public_key })),
        OutputFormat::Text => {
            if !quiet {
                println!("Public key registered with {}", bridge.base_url());
            }
        }
    }
    Ok(())
}

async fn cmd_unregister(
    service: &KeyLifecycleService,
    bridge: &BridgeClient,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let outcome = service.unregister_key(bridge).await?;

    let outcome_name = match outcome {
        UnregisterOutcome::NothingToRemove => "nothing_to_remove",
        UnregisterOutcome::Removed => "removed",
        UnregisterOutcome::NotFound => "not_found",
    };

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "outcome": outcome_name, "status": outcome.status() })
        ),
        OutputFormat::Text => {
            if !quiet {
                println!("{}", outcome.status().unwrap_or("No keypair to unregister."));
            }
        }
    }
    Ok(())
}

async fn cmd_status(service: &KeyLifecycleService, format: OutputFormat) -> anyhow::Result<()> {
    let status = service.status().await?;

    match format {
        OutputFormat::Json => {
            let value = match &status {
                KeyStatus::Absent => json!({ "status": "absent" }),
                KeyStatus::Present { public_key } => {
                    json!({ "status": "present", "public_key": public_key })
                }
                KeyStatus::Diverged => json!({ "status": "diverged" }),
            };
            println!("{}", value);
        }
        OutputFormat::Text => match &status {
            KeyStatus::Absent => println!("No keypair stored."),
            KeyStatus::Present { public_key } => println!("Keypair stored. Public key: {}", public_key),
            KeyStatus::Diverged => {
                println!("Local key state is inconsistent between memory and storage.");
                println!("Run `keyward unregister` to revoke and clear it.");
            }
        },
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod main_tests;
