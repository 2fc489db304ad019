//! CLI definitions for VaultLink.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// VaultLink CLI.
#[derive(Parser)]
#[command(name = "vaultlink")]
#[command(about = "Browser credential-manager runtime")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.vaultlink/config.toml)
    #[arg(short, long, global = true, env = "VAULTLINK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Route newline-delimited JSON requests from stdin to the background
    Bridge {
        /// Vault API base URL, overriding the config file
        #[arg(long)]
        vault_url: Option<String>,
    },

    /// Load and validate the configuration file
    CheckConfig,
}
