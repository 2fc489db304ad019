//! Cross-context message contract.
//!
//! Every request is a tagged union `{type, ...payload}` answered by exactly one
//! [`Response`]. Failures are carried in-band as [`Response::Error`] so a
//! listener never has to surface a transport error to its caller.

use serde::{Deserialize, Serialize};

use crate::entry::CredentialEntry;
use crate::error::RouterError;
use crate::session::AutoLockPolicy;

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

/// Request sent from a content script or the popup to the background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    Unlock {
        password: String,
    },
    Lock,
    /// Acknowledgement echo of the locked broadcast.
    VaultLocked,
    GetStatus,
    GetItems,
    GetMatches {
        url: String,
    },
    GetMatchCount {
        url: String,
    },
    GetTotp {
        id: String,
    },
    GeneratePassword {
        #[serde(default)]
        options: GeneratePasswordOptions,
    },
    CreateItem {
        item: CredentialEntry,
    },
    UpdateItem {
        id: String,
        item: CredentialEntry,
    },
    DeleteItem {
        id: String,
    },
    OpenPopup,
    GetAutoLock,
    SetAutoLock {
        policy: AutoLockPolicy,
    },
}

impl Request {
    /// Wire name of the request type.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Unlock { .. } => "UNLOCK",
            Request::Lock => "LOCK",
            Request::VaultLocked => "VAULT_LOCKED",
            Request::GetStatus => "GET_STATUS",
            Request::GetItems => "GET_ITEMS",
            Request::GetMatches { .. } => "GET_MATCHES",
            Request::GetMatchCount { .. } => "GET_MATCH_COUNT",
            Request::GetTotp { .. } => "GET_TOTP",
            Request::GeneratePassword { .. } => "GENERATE_PASSWORD",
            Request::CreateItem { .. } => "CREATE_ITEM",
            Request::UpdateItem { .. } => "UPDATE_ITEM",
            Request::DeleteItem { .. } => "DELETE_ITEM",
            Request::OpenPopup => "OPEN_POPUP",
            Request::GetAutoLock => "GET_AUTO_LOCK",
            Request::SetAutoLock { .. } => "SET_AUTO_LOCK",
        }
    }

    /// Whether the request reaches into the vault and so needs an open session.
    pub fn requires_unlock(&self) -> bool {
        matches!(
            self,
            Request::GetItems
                | Request::GetMatches { .. }
                | Request::GetMatchCount { .. }
                | Request::GetTotp { .. }
                | Request::GeneratePassword { .. }
                | Request::CreateItem { .. }
                | Request::UpdateItem { .. }
                | Request::DeleteItem { .. }
        )
    }

    /// Whether handling this request slides the auto-lock deadline.
    pub fn refreshes_auto_lock(&self) -> bool {
        !matches!(self, Request::Lock | Request::VaultLocked)
    }
}

/// Character-set options for password generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratePasswordOptions {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "default_true")]
    pub uppercase: bool,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_true")]
    pub numbers: bool,
    #[serde(default = "default_true")]
    pub symbols: bool,
}

fn default_length() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Default for GeneratePasswordOptions {
    fn default() -> Self {
        Self {
            length: default_length(),
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

/// Vault lock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub locked: bool,
}

/// Summary returned by a successful unlock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockSummary {
    #[serde(default)]
    pub item_count: usize,
}

/// A current one-time code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpCode {
    pub code: String,
    /// Seconds until the code rotates.
    pub remaining: u32,
}

/// Single response to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Status(StatusInfo),
    Unlocked(UnlockSummary),
    Items(Vec<CredentialEntry>),
    Item(CredentialEntry),
    MatchCount(usize),
    Totp(TotpCode),
    Password(String),
    AutoLock(AutoLockPolicy),
    Error {
        error: String,
        /// Set when the failure means the vault is (now) locked.
        #[serde(default)]
        locked: bool,
    },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
            locked: false,
        }
    }

    pub fn locked_error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
            locked: true,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Turn an in-band error into a [`RouterError`].
    pub fn into_result(self) -> Result<Response, RouterError> {
        match self {
            Response::Error { error, locked: true } => Err(RouterError::Locked(error)),
            Response::Error { error, .. } => Err(RouterError::Remote(error)),
            other => Ok(other),
        }
    }

    pub fn into_items(self) -> Result<Vec<CredentialEntry>, RouterError> {
        match self.into_result()? {
            Response::Items(items) => Ok(items),
            other => Err(RouterError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    pub fn into_status(self) -> Result<StatusInfo, RouterError> {
        match self.into_result()? {
            Response::Status(status) => Ok(status),
            other => Err(RouterError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    pub fn into_totp(self) -> Result<TotpCode, RouterError> {
        match self.into_result()? {
            Response::Totp(code) => Ok(code),
            other => Err(RouterError::UnexpectedResponse(format!("{:?}", other))),
        }
    }
}

/// Notification broadcast by the background to every listening context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    VaultLocked,
    VaultUnlocked,
}
