//! Message routing errors.

use thiserror::Error;

use super::{HostError, VaultError};

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Vault is locked: {0}")]
    Locked(String),

    #[error("Unknown message type: {0}")]
    UnknownType(String),

    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Error reported in-band by the other side.
    #[error("{0}")]
    Remote(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl RouterError {
    /// Whether the failure means the vault is locked.
    pub fn is_locked(&self) -> bool {
        match self {
            RouterError::Locked(_) => true,
            RouterError::Vault(e) => e.is_unauthorized(),
            _ => false,
        }
    }
}
