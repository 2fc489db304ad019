//! Credential filtering and ranking.

use std::cmp::Ordering;

use tracing::debug;

use vaultlink_protocols::{CredentialEntry, EntryType};

use crate::uri::{match_uri, parse_url};

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;

/// Login entries with at least one URI that applies to `url`, best first.
///
/// Returns an empty list for empty input, for URLs that do not parse, and for
/// non-web schemes.
pub fn find_matching_entries<'a>(
    entries: &'a [CredentialEntry],
    url: &str,
) -> Vec<&'a CredentialEntry> {
    if entries.is_empty() {
        return Vec::new();
    }
    let Some(parsed) = parse_url(url) else {
        debug!("Skipping match for unparseable URL");
        return Vec::new();
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Vec::new();
    }

    let mut matches: Vec<&CredentialEntry> = entries
        .iter()
        .filter(|entry| entry.entry_type == EntryType::Login)
        .filter(|entry| {
            entry.login.as_ref().is_some_and(|login| {
                login
                    .uris
                    .iter()
                    .any(|uri| match_uri(&uri.uri, url, uri.policy()))
            })
        })
        .collect();

    matches.sort_by(|a, b| rank(a, b));
    matches
}

/// Number of entries that would be offered on `url`.
pub fn count_matches(entries: &[CredentialEntry], url: &str) -> usize {
    find_matching_entries(entries, url).len()
}

/// Entries of one type (cards, identities), ranked like login matches.
pub fn entries_of_type(entries: &[CredentialEntry], entry_type: EntryType) -> Vec<&CredentialEntry> {
    let mut selected: Vec<&CredentialEntry> = entries
        .iter()
        .filter(|entry| entry.entry_type == entry_type)
        .collect();
    selected.sort_by(|a, b| rank(a, b));
    selected
}

/// Favorites first, then most recently updated, then by name.
fn rank(a: &CredentialEntry, b: &CredentialEntry) -> Ordering {
    b.favorite
        .cmp(&a.favorite)
        .then_with(|| match (&a.updated_at, &b.updated_at) {
            (Some(x), Some(y)) => y.cmp(x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// How many entries a page offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    /// Nothing stored for this page; offer to create an entry.
    None,
    /// Exactly one candidate; fill without asking.
    Single(&'a CredentialEntry),
    /// Several candidates; show a menu or cycle.
    Multiple(Vec<&'a CredentialEntry>),
}

impl<'a> MatchOutcome<'a> {
    pub fn from_matches(mut matches: Vec<&'a CredentialEntry>) -> Self {
        match matches.len() {
            0 => MatchOutcome::None,
            1 => MatchOutcome::Single(matches.remove(0)),
            _ => MatchOutcome::Multiple(matches),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MatchOutcome::None => 0,
            MatchOutcome::Single(_) => 1,
            MatchOutcome::Multiple(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MatchOutcome::None)
    }
}
