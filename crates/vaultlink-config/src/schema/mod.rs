//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod schema_content;

pub use schema_content::*;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub autofill: AutofillConfig,

    #[serde(default)]
    pub save_prompt: SavePromptConfig,

    #[serde(default)]
    pub menu: MenuConfig,

    #[serde(default)]
    pub badge: BadgeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Vault API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Loopback origin of the vault service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_vault_timeout")]
    pub timeout_seconds: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_vault_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8765".to_string()
}

fn default_vault_timeout() -> u64 {
    10
}

/// Session lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Initial auto-lock policy in minutes; `-1` locks on browser close.
    /// A policy saved by the user in local storage takes precedence.
    #[serde(default = "default_auto_lock_minutes")]
    pub auto_lock_minutes: i64,

    /// Keep-alive heartbeat interval under the lock-on-close policy.
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u64,

    /// Delay between a window-removed event and the window/tab count check.
    #[serde(default = "default_window_close_settle_ms")]
    pub window_close_settle_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_lock_minutes: default_auto_lock_minutes(),
            keep_alive_seconds: default_keep_alive_seconds(),
            window_close_settle_ms: default_window_close_settle_ms(),
        }
    }
}

fn default_auto_lock_minutes() -> i64 {
    15
}

fn default_keep_alive_seconds() -> u64 {
    20
}

fn default_window_close_settle_ms() -> u64 {
    500
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rotated log files.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
