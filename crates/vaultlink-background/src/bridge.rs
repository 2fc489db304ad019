//! Line protocol for the stdio bridge.
//!
//! A line with a `type` field is a [`Request`](vaultlink_protocols::Request)
//! for the router and always gets a response. A line with an `event` field is
//! a browser notification: it updates the in-memory browser, drives the
//! coordinator and only answers when it cannot be applied.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use vaultlink_protocols::{Response, TabInfo};

use crate::host::MemoryBrowser;
use crate::router::MessageRouter;

/// Window and tab notifications from the browser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostEvent {
    WindowCreated {
        window_id: u32,
    },
    WindowRemoved {
        window_id: u32,
    },
    TabUpdated {
        tab_id: u32,
        window_id: u32,
        #[serde(default)]
        url: Option<String>,
        /// The tab finished loading.
        #[serde(default)]
        complete: bool,
    },
    TabActivated {
        tab_id: u32,
    },
    TabRemoved {
        tab_id: u32,
    },
}

pub struct Bridge {
    router: MessageRouter,
    browser: Arc<MemoryBrowser>,
}

impl Bridge {
    pub fn new(router: MessageRouter, browser: Arc<MemoryBrowser>) -> Self {
        Self { router, browser }
    }

    /// Handle one input line. Returns the line to write back, if any.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(_) => return Some(self.router.handle_raw(line).await),
        };
        if value.get("event").is_none() {
            return Some(self.router.handle_raw(line).await);
        }
        match serde_json::from_value::<HostEvent>(value) {
            Ok(event) => self.apply(event).await.err(),
            Err(e) => {
                warn!(error = %e, "Rejected host event");
                Some(Response::error(format!("Malformed host event: {e}")))
            }
        }
    }

    /// Apply a browser notification.
    pub async fn apply(&self, event: HostEvent) -> Result<(), Response> {
        debug!(?event, "Host event");
        let coordinator = self.router.coordinator();
        match event {
            HostEvent::WindowCreated { window_id } => self.browser.open_window(window_id),
            HostEvent::WindowRemoved { window_id } => {
                self.browser.close_window(window_id);
                coordinator.on_window_removed().await;
            }
            HostEvent::TabUpdated {
                tab_id,
                window_id,
                url,
                complete,
            } => {
                self.browser.update_tab(TabInfo {
                    id: tab_id,
                    window_id,
                    url,
                });
                coordinator.on_tab_updated(tab_id, complete).await;
            }
            HostEvent::TabActivated { tab_id } => {
                if let Err(e) = self.browser.activate_tab(tab_id) {
                    warn!(error = %e, "Cannot activate tab");
                    return Err(Response::error(e.to_string()));
                }
                coordinator.on_tab_activated(tab_id).await;
            }
            HostEvent::TabRemoved { tab_id } => self.browser.close_tab(tab_id),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
