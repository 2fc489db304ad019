//! Writing entry values into the page.

use std::sync::Arc;

use tracing::{debug, info, warn};

use vaultlink_protocols::{CardData, CredentialEntry, IdentityData, MessageBus, Request};

use crate::detector::{FieldKind, FieldRecord, IdentityField, find_one_time_code_field};
use crate::dom::{DomEventKind, Document, NodeId};
use crate::error::FillError;
use crate::gate;
use crate::host::{Clipboard, Confirmer, Notice, Notifier};

/// Set a field's value the way a user edit would look to the page: the value
/// changes, then bubbling `input` and `change` events fire, then the field
/// flashes.
pub fn fill_value(doc: &mut Document, target: NodeId, value: &str) -> Result<(), FillError> {
    if !doc.is_connected(target) {
        return Err(FillError::FieldDetached(target));
    }
    doc.set_value(target, value);
    doc.dispatch(target, DomEventKind::Input);
    doc.dispatch(target, DomEventKind::Change);
    doc.dispatch(target, DomEventKind::Highlight);
    Ok(())
}

/// Value of a card entry for a card field.
fn card_value(card: &CardData, kind: FieldKind) -> Option<String> {
    let value = match kind {
        FieldKind::CardNumber => card.number.clone(),
        FieldKind::CardCvv => card.code.clone(),
        FieldKind::CardExpiry => card.expiry(),
        FieldKind::CardExpMonth => card
            .exp_month
            .as_deref()
            .map(|m| format!("{:0>2}", m.trim())),
        FieldKind::CardExpYear => card.exp_year.clone(),
        FieldKind::CardHolder => card.cardholder_name.clone(),
        _ => None,
    };
    value.filter(|v| !v.trim().is_empty())
}

/// Value of an identity entry for a profile field.
fn identity_value(identity: &IdentityData, field: IdentityField) -> Option<String> {
    let value = match field {
        IdentityField::FullName => identity.full_name(),
        IdentityField::FirstName => identity.first_name.clone(),
        IdentityField::LastName => identity.last_name.clone(),
        IdentityField::Email => identity.email.clone(),
        IdentityField::Phone => identity.phone.clone(),
        IdentityField::Address1 => identity.address1.clone(),
        IdentityField::Address2 => identity.address2.clone(),
        IdentityField::City => identity.city.clone(),
        IdentityField::State => identity.state.clone(),
        IdentityField::PostalCode => identity.postal_code.clone(),
        IdentityField::Country => identity.country.clone(),
        IdentityField::Company => identity.company.clone(),
    };
    value.filter(|v| !v.trim().is_empty())
}

/// Records that belong to the same form as `anchor` (or the page, when the
/// anchor is not inside a form).
pub fn same_scope<'a>(
    doc: &Document,
    anchor: NodeId,
    records: &'a [FieldRecord],
) -> Vec<&'a FieldRecord> {
    let form = doc.enclosing_form(anchor);
    records
        .iter()
        .filter(|r| doc.is_connected(r.element))
        .filter(|r| form.is_none() || doc.enclosing_form(r.element) == form)
        .collect()
}

/// Runs the security gate and performs login, card and identity fills.
pub struct FillOrchestrator {
    bus: Arc<dyn MessageBus>,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
    totp_autofill: bool,
}

impl FillOrchestrator {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            bus,
            confirmer,
            notifier,
            clipboard,
            totp_autofill: true,
        }
    }

    pub fn with_totp_autofill(mut self, enabled: bool) -> Self {
        self.totp_autofill = enabled;
        self
    }

    /// Ask for confirmation when the page is risky. Declining aborts with a
    /// cancellation notice.
    pub async fn check_gate(&self, doc: &Document) -> Result<(), FillError> {
        let risks = gate::assess(doc.url(), doc.is_top_level());
        if risks.is_empty() {
            return Ok(());
        }
        debug!(?risks, "Fill requires confirmation");
        if self.confirmer.confirm(&risks).await {
            Ok(())
        } else {
            info!("Fill cancelled at security warning");
            self.notifier.notify(Notice::FillCancelled).await;
            Err(FillError::Cancelled)
        }
    }

    /// Gate, then write every planned value. Returns how many fields changed.
    async fn apply(
        &self,
        doc: &mut Document,
        writes: Vec<(NodeId, String)>,
    ) -> Result<usize, FillError> {
        if writes.is_empty() {
            return Err(FillError::NothingToFill);
        }
        self.check_gate(doc).await?;
        let mut filled = 0;
        for (target, value) in writes {
            match fill_value(doc, target, &value) {
                Ok(()) => filled += 1,
                Err(e) => debug!(error = %e, "Skipping field"),
            }
        }
        Ok(filled)
    }

    pub async fn fill_login(
        &self,
        doc: &mut Document,
        username: Option<NodeId>,
        password: Option<NodeId>,
        entry: &CredentialEntry,
    ) -> Result<usize, FillError> {
        let mut writes = Vec::new();
        if let (Some(field), Some(value)) = (username, entry.username()) {
            writes.push((field, value.to_string()));
        }
        if let (Some(field), Some(value)) = (password, entry.password()) {
            writes.push((field, value.to_string()));
        }
        let filled = self.apply(doc, writes).await?;

        if self.totp_autofill && entry.has_totp() {
            self.fill_totp(doc, entry).await;
        }
        Ok(filled)
    }

    pub async fn fill_card(
        &self,
        doc: &mut Document,
        anchor: NodeId,
        records: &[FieldRecord],
        entry: &CredentialEntry,
    ) -> Result<usize, FillError> {
        let card = entry.card.as_ref().ok_or(FillError::NothingToFill)?;
        let writes = same_scope(doc, anchor, records)
            .into_iter()
            .filter(|r| r.kind.is_card())
            .filter_map(|r| card_value(card, r.kind).map(|v| (r.element, v)))
            .collect();
        self.apply(doc, writes).await
    }

    pub async fn fill_identity(
        &self,
        doc: &mut Document,
        anchor: NodeId,
        records: &[FieldRecord],
        entry: &CredentialEntry,
    ) -> Result<usize, FillError> {
        let identity = entry.identity.as_ref().ok_or(FillError::NothingToFill)?;
        let writes = same_scope(doc, anchor, records)
            .into_iter()
            .filter_map(|r| match r.kind {
                FieldKind::Identity(field) => {
                    identity_value(identity, field).map(|v| (r.element, v))
                }
                _ => None,
            })
            .collect();
        self.apply(doc, writes).await
    }

    /// Fetch the current code and put it in the page's code field, or on the
    /// clipboard when there is none. Failures only produce a notice.
    async fn fill_totp(&self, doc: &mut Document, entry: &CredentialEntry) {
        let response = self
            .bus
            .send(Request::GetTotp {
                id: entry.id.clone(),
            })
            .await;
        let code = match response.into_totp() {
            Ok(code) => code,
            Err(e) => {
                warn!(error = %e, "Could not fetch one-time code");
                self.notifier
                    .notify(Notice::RequestFailed {
                        message: e.to_string(),
                    })
                    .await;
                return;
            }
        };

        if let Some(field) = find_one_time_code_field(doc) {
            if fill_value(doc, field, &code.code).is_ok() {
                return;
            }
        }
        match self.clipboard.write_text(&code.code).await {
            Ok(()) => self.notifier.notify(Notice::TotpCopied).await,
            Err(e) => {
                warn!(error = %e, "Clipboard write refused");
                self.notifier.notify(Notice::ClipboardDenied).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "fill_tests.rs"]
mod tests;
