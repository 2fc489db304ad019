//! Browser host runtime errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Alarm error: {0}")]
    Alarm(String),

    /// A broadcast reached no listening context.
    #[error("No listeners for broadcast")]
    NoListeners,

    #[error("Popup could not be opened: {0}")]
    PopupUnavailable(String),

    #[error("Tab not found: {0}")]
    TabNotFound(u32),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
