//! URI matching and credential selection.
//!
//! Everything here is pure: no I/O, no shared state, and no panics on bad
//! input. The functions run on every tab update, so a malformed URL or a
//! broken stored pattern simply yields "no match".
//!
//! - [`match_uri`] applies one [`MatchPolicy`] to a stored/current URI pair
//! - [`find_matching_entries`] filters and ranks login entries for a page
//! - [`FillCycle`] walks through multiple matches on repeated invocations

mod cycle;
mod matcher;
mod uri;

pub use cycle::FillCycle;
pub use matcher::{MatchOutcome, count_matches, entries_of_type, find_matching_entries};
pub use uri::{base_domain, hostname, match_uri, parse_url, same_hostname};

pub use vaultlink_protocols::MatchPolicy;
