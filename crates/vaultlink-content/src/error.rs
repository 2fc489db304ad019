//! Content runtime errors.

use thiserror::Error;

use vaultlink_protocols::{HostError, RouterError};

use crate::dom::NodeId;

#[derive(Debug, Error)]
pub enum FillError {
    #[error("Fill cancelled by user")]
    Cancelled,

    #[error("Field {0:?} is no longer on the page")]
    FieldDetached(NodeId),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Entry has nothing to fill")]
    NothingToFill,

    #[error("Vault is locked")]
    Locked,

    #[error("Request failed: {0}")]
    Router(RouterError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

impl From<RouterError> for FillError {
    fn from(err: RouterError) -> Self {
        if err.is_locked() {
            FillError::Locked
        } else {
            FillError::Router(err)
        }
    }
}
