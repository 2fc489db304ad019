//! # VaultLink Background
//!
//! The long-lived half of the runtime. It owns the session (unlock, lock,
//! auto-lock alarm, keep-alive heartbeat, window-close locking), talks to the
//! vault service, keeps the toolbar badge current and routes every typed
//! request from content scripts and the popup.
//!
//! ## Main types
//!
//! - [`SessionCoordinator`] - session lifecycle and badge updates
//! - [`MessageRouter`] - request dispatch; also a [`MessageBus`](vaultlink_protocols::MessageBus)
//! - [`HttpVaultClient`] - [`VaultApi`] over HTTP
//! - [`Bridge`] - stdio line protocol: requests plus window/tab events
//! - [`host`] - in-memory host runtime for the bridge and tests

mod bridge;
pub mod host;
mod router;
mod session;
pub mod vault;

#[cfg(test)]
mod test_support;

pub use bridge::{Bridge, HostEvent};
pub use router::{MessageRouter, REQUEST_TYPES, parse_request};
pub use session::{
    AUTO_LOCK_ALARM, BackgroundHost, SessionCoordinator, SessionSettings, badge_text,
};
pub use vault::{HttpVaultClient, UnlockGrant, VaultApi};
