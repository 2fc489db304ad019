//! Vault API errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    /// The vault rejected the session token. Treated as an authoritative lock.
    #[error("Unauthorized: session expired or vault locked")]
    Unauthorized,

    #[error("Invalid master password")]
    InvalidPassword,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

impl VaultError {
    /// Map a non-success HTTP status to an error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => VaultError::Unauthorized,
            _ => VaultError::Api {
                status,
                message: message.into(),
            },
        }
    }

    /// Whether this error means the session is gone.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, VaultError::Unauthorized)
    }
}
