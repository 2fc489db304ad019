//! Browser host runtime surface.
//!
//! The background coordinator and the content scripts never touch browser
//! APIs directly; they go through these traits so the same logic runs against
//! a real extension host or an in-memory one.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HostError;
use crate::message::{Event, Request, Response};

/// Well-known storage keys.
pub mod storage_keys {
    /// Session record, kept in the ephemeral session store.
    pub const SESSION: &str = "session";
    /// Auto-lock policy, kept in the durable local store.
    pub const AUTO_LOCK: &str = "autoLockMinutes";
    /// Captured credentials awaiting a save/update decision (durable).
    pub const PENDING_CREDENTIAL: &str = "pendingCredential";
}

/// Key-value storage (local or session area).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, HostError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), HostError>;

    async fn remove(&self, key: &str) -> Result<(), HostError>;
}

/// Read and deserialize a stored value.
///
/// A value that no longer deserializes is treated as absent.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, HostError> {
    match store.get(key).await? {
        Some(value) => Ok(serde_json::from_value(value).ok()),
        None => Ok(None),
    }
}

/// Serialize and store a value.
pub async fn store_json<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), HostError> {
    let value = serde_json::to_value(value)?;
    store.set(key, value).await
}

/// Named one-shot alarms that survive coordinator suspension.
#[async_trait]
pub trait AlarmScheduler: Send + Sync {
    /// Create (or replace) the alarm `name`, firing after `delay_minutes`.
    async fn create(&self, name: &str, delay_minutes: u32) -> Result<(), HostError>;

    /// Clear the alarm. Returns whether one existed.
    async fn clear(&self, name: &str) -> Result<bool, HostError>;
}

/// A browser tab as seen by the background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: u32,
    pub window_id: u32,
    pub url: Option<String>,
}

/// Tab, window, toolbar and lifetime surface of the browser.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Number of open normal (non-popup, non-devtools) windows.
    async fn normal_window_count(&self) -> Result<usize, HostError>;

    /// Number of tabs across every window.
    async fn tab_count(&self) -> Result<usize, HostError>;

    async fn active_tab(&self) -> Result<Option<TabInfo>, HostError>;

    async fn set_badge(&self, tab_id: u32, text: &str, color: &str) -> Result<(), HostError>;

    /// Remove the badge from every tab.
    async fn clear_badges(&self) -> Result<(), HostError>;

    async fn set_locked_icon(&self, locked: bool) -> Result<(), HostError>;

    async fn open_popup(&self) -> Result<(), HostError>;

    /// Cheap call that keeps the background context from being suspended.
    async fn keep_alive(&self) -> Result<(), HostError>;
}

/// Fan-out of background notifications to every context.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, event: Event) -> Result<(), HostError>;
}

/// Request/response channel from a content script or popup to the background.
///
/// Always yields a response; transport failures are reported as
/// [`Response::Error`].
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn send(&self, request: Request) -> Response;
}
