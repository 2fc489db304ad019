//! # VaultLink Content
//!
//! The per-page half of the runtime: it finds login, card and identity
//! fields, attaches inline icons and menus, fills entries behind a security
//! check, and offers to save credentials the user submits.
//!
//! Everything runs against a [`Document`] model and a handful of host traits
//! ([`MessageBus`](vaultlink_protocols::MessageBus),
//! [`KeyValueStore`](vaultlink_protocols::KeyValueStore), [`Confirmer`],
//! [`Notifier`], [`Clipboard`]), so it needs no browser to test.

mod context;
pub mod detector;
pub mod dom;
mod error;
pub mod fill;
pub mod gate;
mod host;
pub mod menu;
pub mod save;

#[cfg(test)]
mod test_support;

pub use context::{ContentContext, ContentServices, ContentSettings, SavePrompt};
pub use detector::{FieldKind, FieldRecord, IdentityField, PROCESSED_ATTR, detect, detect_page};
pub use dom::{Document, Element, NodeId};
pub use error::FillError;
pub use fill::{FillOrchestrator, fill_value};
pub use gate::SecurityRisk;
pub use host::{Clipboard, Confirmer, Notice, Notifier};
pub use menu::{Affordance, AffordanceState, Menu, MenuAction, MenuKey, MenuKind};
pub use save::{PromptResponse, SaveDecision};
