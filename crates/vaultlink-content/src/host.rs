//! Page-side host surface: dialogs, notifications and the clipboard.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vaultlink_protocols::HostError;

use crate::gate::SecurityRisk;

/// User-visible, non-blocking notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    /// A fill was aborted at the security warning.
    FillCancelled,
    /// The one-time code was copied because the page has no field for it.
    TotpCopied,
    ClipboardDenied,
    /// The popup could not be opened programmatically.
    PopupUnavailable,
    VaultLocked,
    Saved,
    Updated,
    /// A background request failed.
    RequestFailed { message: String },
}

/// Blocking confirmation dialog shown before filling on a risky page.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Returns whether the user chose to continue.
    async fn confirm(&self, risks: &[SecurityRisk]) -> bool;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice);
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), HostError>;
}
