//! # VaultLink Protocols
//!
//! Shared definitions for the VaultLink runtime. Contains only data types and
//! interface definitions - no implementations.
//!
//! ## Contents
//!
//! - [`CredentialEntry`] - read-through copy of a vault entry
//! - [`Request`] / [`Response`] - the typed message contract between contexts
//! - [`Session`], [`AutoLockPolicy`], [`PendingCredential`] - lifecycle state
//! - Host traits ([`KeyValueStore`], [`AlarmScheduler`], [`BrowserHost`],
//!   [`Broadcaster`], [`MessageBus`]) - the browser runtime surface

pub mod entry;
pub mod error;
pub mod host;
pub mod message;
pub mod session;

pub use entry::{
    CardData, CredentialEntry, EntryType, IdentityData, LoginData, LoginUri, MatchPolicy,
};
pub use error::{HostError, RouterError, VaultError};
pub use host::{
    AlarmScheduler, Broadcaster, BrowserHost, KeyValueStore, MessageBus, TabInfo,
    load_json, storage_keys, store_json,
};
pub use message::{
    Event, GeneratePasswordOptions, Request, Response, StatusInfo, TotpCode, UnlockSummary,
};
pub use session::{AutoLockPolicy, PendingCredential, Session};
