//! Typed request dispatch.
//!
//! Every context reaches the vault and the session through
//! [`MessageRouter::handle`]. Failures never escape: they come back as
//! [`Response::Error`], with `locked` set when the vault is (now) locked.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use vaultlink_matching::{count_matches, find_matching_entries};
use vaultlink_protocols::{
    BrowserHost, MessageBus, Request, Response, RouterError, StatusInfo, VaultError,
};

use crate::session::SessionCoordinator;
use crate::vault::VaultApi;

/// Wire names of every request type.
pub const REQUEST_TYPES: &[&str] = &[
    "UNLOCK",
    "LOCK",
    "VAULT_LOCKED",
    "GET_STATUS",
    "GET_ITEMS",
    "GET_MATCHES",
    "GET_MATCH_COUNT",
    "GET_TOTP",
    "GENERATE_PASSWORD",
    "CREATE_ITEM",
    "UPDATE_ITEM",
    "DELETE_ITEM",
    "OPEN_POPUP",
    "GET_AUTO_LOCK",
    "SET_AUTO_LOCK",
];

pub struct MessageRouter {
    coordinator: Arc<SessionCoordinator>,
    vault: Arc<dyn VaultApi>,
    browser: Arc<dyn BrowserHost>,
}

impl MessageRouter {
    pub fn new(
        coordinator: Arc<SessionCoordinator>,
        vault: Arc<dyn VaultApi>,
        browser: Arc<dyn BrowserHost>,
    ) -> Self {
        Self {
            coordinator,
            vault,
            browser,
        }
    }

    pub fn coordinator(&self) -> &Arc<SessionCoordinator> {
        &self.coordinator
    }

    /// Handle one request. Anything but a lock request slides the
    /// auto-lock deadline.
    pub async fn handle(&self, request: Request) -> Response {
        let kind = request.kind();
        debug!(kind, "Handling request");
        if request.refreshes_auto_lock() {
            self.coordinator.reset_auto_lock().await;
        }
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => self.error_response(kind, e).await,
        }
    }

    /// Handle a raw JSON message. Unknown or malformed messages get an
    /// error response.
    pub async fn handle_raw(&self, raw: &str) -> Response {
        match parse_request(raw) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "Rejected message");
                Response::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response, RouterError> {
        match request {
            Request::Unlock { password } => {
                let summary = self.coordinator.unlock(&password).await?;
                Ok(Response::Unlocked(summary))
            }
            Request::Lock => {
                self.coordinator.lock().await;
                Ok(Response::Ok)
            }
            Request::VaultLocked => Ok(Response::Ok),
            Request::GetStatus => Ok(Response::Status(StatusInfo {
                locked: !self.coordinator.is_unlocked().await,
            })),
            Request::GetItems => {
                let token = self.token().await?;
                Ok(Response::Items(self.vault.list_items(&token).await?))
            }
            Request::GetMatches { url } => {
                let token = self.token().await?;
                let items = self.vault.list_items(&token).await?;
                let matches = find_matching_entries(&items, &url)
                    .into_iter()
                    .cloned()
                    .collect();
                Ok(Response::Items(matches))
            }
            Request::GetMatchCount { url } => {
                let token = self.token().await?;
                let items = self.vault.list_items(&token).await?;
                Ok(Response::MatchCount(count_matches(&items, &url)))
            }
            Request::GetTotp { id } => {
                let token = self.token().await?;
                Ok(Response::Totp(self.vault.totp(&token, &id).await?))
            }
            Request::GeneratePassword { options } => {
                let token = self.token().await?;
                let password = self.vault.generate_password(&token, &options).await?;
                Ok(Response::Password(password))
            }
            Request::CreateItem { item } => {
                let token = self.token().await?;
                Ok(Response::Item(self.vault.create_item(&token, &item).await?))
            }
            Request::UpdateItem { id, item } => {
                let token = self.token().await?;
                Ok(Response::Item(
                    self.vault.update_item(&token, &id, &item).await?,
                ))
            }
            Request::DeleteItem { id } => {
                let token = self.token().await?;
                self.vault.delete_item(&token, &id).await?;
                Ok(Response::Ok)
            }
            Request::OpenPopup => {
                self.browser.open_popup().await?;
                Ok(Response::Ok)
            }
            Request::GetAutoLock => Ok(Response::AutoLock(
                self.coordinator.auto_lock_policy().await,
            )),
            Request::SetAutoLock { policy } => {
                self.coordinator.set_auto_lock_policy(policy).await?;
                Ok(Response::Ok)
            }
        }
    }

    async fn token(&self) -> Result<String, RouterError> {
        self.coordinator
            .token()
            .await
            .ok_or_else(|| RouterError::Locked("Vault is locked".to_string()))
    }

    async fn error_response(&self, kind: &str, error: RouterError) -> Response {
        if let RouterError::Vault(VaultError::Unauthorized) = error {
            self.coordinator.handle_unauthorized().await;
        }
        if error.is_locked() {
            debug!(kind, "Request refused, vault locked");
            return Response::locked_error(error.to_string());
        }
        warn!(kind, error = %error, "Request failed");
        Response::error(error.to_string())
    }
}

#[async_trait]
impl MessageBus for MessageRouter {
    async fn send(&self, request: Request) -> Response {
        self.handle(request).await
    }
}

/// Parse a raw message, telling unknown types apart from malformed ones.
pub fn parse_request(raw: &str) -> Result<Request, RouterError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| RouterError::Malformed(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| RouterError::Malformed("missing \"type\" field".to_string()))?;
    if !REQUEST_TYPES.contains(&kind) {
        return Err(RouterError::UnknownType(kind.to_string()));
    }
    serde_json::from_value(value).map_err(|e| RouterError::Malformed(e.to_string()))
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
