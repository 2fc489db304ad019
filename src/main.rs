//! VaultLink - browser credential-manager runtime
//!
//! Entry point for the stdio bridge and configuration tooling.

mod cli;
mod cmd_bridge;
mod cmd_config;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vaultlink_config::{
    Config, ConfigLoader, ConfigValidator, LoggingConfig, ValidationWarning,
};

use cli::{Cli, Commands};

fn vaultlink_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".vaultlink"))
        .unwrap_or_else(|| PathBuf::from(".vaultlink"))
}

/// Initialize tracing with stderr and file output.
///
/// Stdout carries the bridge protocol, so console logs go to stderr. Log
/// files rotate daily under `~/.vaultlink/logs/` unless configured otherwise.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = match &logging.dir {
        Some(dir) => PathBuf::from(ConfigLoader::expand_path(&dir.to_string_lossy())),
        None => vaultlink_dir().join("logs"),
    };
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("vaultlink")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the file writer alive for the program duration.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => ConfigLoader::load_or_default(&ConfigLoader::default_path())
            .context("loading default config"),
    }
}

/// Reject a config the validator flags, returning its warnings.
fn validate_config(config: &Config) -> anyhow::Result<Vec<ValidationWarning>> {
    ConfigValidator::validate(config)
        .into_result()
        .context("invalid configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckConfig => {
            let path = cli.config.unwrap_or_else(ConfigLoader::default_path);
            cmd_config::check(&path)
        }
        Commands::Bridge { vault_url } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(url) = vault_url {
                config.vault.base_url = url;
            }
            let warnings = validate_config(&config)?;
            init_tracing(&config.logging)?;
            for warning in &warnings {
                warn!(path = %warning.path, "{}", warning.message);
            }
            cmd_bridge::run(&config).await
        }
    }
}
