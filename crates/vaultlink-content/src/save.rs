//! Capturing submitted credentials and deciding whether to offer a save.
//!
//! A submit is captured and written to durable storage at once, because the
//! page usually navigates away before anything can be shown. The record is
//! picked up again either on the same page shortly after the submit, or by
//! the next page on the same host.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vaultlink_matching::same_hostname;
use vaultlink_protocols::{
    CredentialEntry, HostError, KeyValueStore, PendingCredential, load_json, storage_keys,
    store_json,
};

use crate::detector::{FieldKind, FieldRecord};
use crate::dom::{Document, NodeId};

/// What to offer for a captured credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveDecision {
    /// Already stored; nothing to do.
    None,
    /// Unknown username; offer to save a new entry.
    Save,
    /// Known username with a new password; offer to update this entry.
    Update { entry: Box<CredentialEntry> },
}

/// User answer to a save/update prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptResponse {
    Accept,
    Dismiss,
}

/// Compare a captured credential with the entries stored for its host.
pub fn decide(pending: &PendingCredential, existing: &[CredentialEntry]) -> SaveDecision {
    let same_user: Vec<&CredentialEntry> = existing
        .iter()
        .filter(|e| e.username().unwrap_or_default() == pending.username)
        .collect();
    if same_user
        .iter()
        .any(|e| e.password() == Some(pending.password.as_str()))
    {
        return SaveDecision::None;
    }
    match same_user.first() {
        Some(entry) => SaveDecision::Update {
            entry: Box::new((*entry).clone()),
        },
        None => SaveDecision::Save,
    }
}

/// Read `{username, password}` from the submitted form.
///
/// Uses the first visible, non-empty password field (inside `form` when
/// given) and the username field detection paired with it.
pub fn capture(
    doc: &Document,
    records: &[FieldRecord],
    form: Option<NodeId>,
) -> Option<PendingCredential> {
    let passwords: Vec<&FieldRecord> = records
        .iter()
        .filter(|r| r.kind == FieldKind::LoginPassword)
        .filter(|r| {
            doc.is_connected(r.element)
                && doc
                    .get(r.element)
                    .is_some_and(|e| e.is_visible && !e.value.is_empty())
        })
        .collect();

    let chosen = form
        .and_then(|form| {
            passwords
                .iter()
                .find(|r| doc.enclosing_form(r.element) == Some(form))
        })
        .or_else(|| passwords.first())?;

    let password = doc.get(chosen.element)?.value.clone();
    let username = chosen
        .partner
        .and_then(|id| doc.get(id))
        .map(|e| e.value.trim().to_string())
        .unwrap_or_default();
    Some(PendingCredential::new(username, password, doc.url()))
}

/// Entry created when the user accepts a save prompt.
pub fn new_login_entry(pending: &PendingCredential) -> CredentialEntry {
    let (name, uri) = match url::Url::parse(&pending.url) {
        Ok(url) => (
            url.host_str().unwrap_or(&pending.url).to_string(),
            url.origin().ascii_serialization(),
        ),
        Err(_) => (pending.url.clone(), pending.url.clone()),
    };
    CredentialEntry::login(
        "",
        name,
        pending.username.clone(),
        pending.password.clone(),
        uri,
    )
}

pub async fn persist(
    store: &dyn KeyValueStore,
    pending: &PendingCredential,
) -> Result<(), HostError> {
    store_json(store, storage_keys::PENDING_CREDENTIAL, pending).await
}

pub async fn load(store: &dyn KeyValueStore) -> Result<Option<PendingCredential>, HostError> {
    load_json(store, storage_keys::PENDING_CREDENTIAL).await
}

pub async fn clear(store: &dyn KeyValueStore) -> Result<(), HostError> {
    store.remove(storage_keys::PENDING_CREDENTIAL).await
}

/// The stored record, if the page at `current_url` is the one that should
/// act on it: a different URL on the same host, within `max_age`.
///
/// Expired records are removed. Records for other hosts are left alone.
pub async fn take_for_navigation(
    store: &dyn KeyValueStore,
    current_url: &str,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Result<Option<PendingCredential>, HostError> {
    let Some(pending) = load(store).await? else {
        return Ok(None);
    };
    if pending.is_expired(now, max_age) {
        debug!("Discarding expired pending credential");
        clear(store).await?;
        return Ok(None);
    }
    if pending.url == current_url || !same_hostname(&pending.url, current_url) {
        return Ok(None);
    }
    Ok(Some(pending))
}

#[cfg(test)]
#[path = "save_tests.rs"]
mod tests;
