//! Error types for the VaultLink protocol layer.

mod host;
mod router;
mod vault;

pub use host::*;
pub use router::*;
pub use vault::*;
