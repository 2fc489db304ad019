//! Form field detection.
//!
//! Detection runs in a fixed order: CVV inputs, card inputs, password/username
//! pairs, then identity inputs. Every classified field is tagged with
//! [`PROCESSED_ATTR`] as soon as it is recognized, and tagged fields are
//! skipped by every later pass. That ordering is what keeps a
//! `type=password name=cvv` input out of the login pass.

mod patterns;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Document, NodeId};

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;

/// Marker attribute carrying a field's classification.
pub const PROCESSED_ATTR: &str = "data-vaultlink-processed";

/// Profile field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityField {
    FullName,
    FirstName,
    LastName,
    Email,
    Phone,
    Address1,
    Address2,
    City,
    State,
    PostalCode,
    Country,
    Company,
}

impl IdentityField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityField::FullName => "full-name",
            IdentityField::FirstName => "first-name",
            IdentityField::LastName => "last-name",
            IdentityField::Email => "email",
            IdentityField::Phone => "phone",
            IdentityField::Address1 => "address1",
            IdentityField::Address2 => "address2",
            IdentityField::City => "city",
            IdentityField::State => "state",
            IdentityField::PostalCode => "postal-code",
            IdentityField::Country => "country",
            IdentityField::Company => "company",
        }
    }
}

/// Classification of a detected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    LoginUsername,
    LoginPassword,
    CardNumber,
    CardCvv,
    CardExpiry,
    CardExpMonth,
    CardExpYear,
    CardHolder,
    Identity(IdentityField),
}

impl FieldKind {
    /// Marker value written into [`PROCESSED_ATTR`].
    pub fn marker(&self) -> String {
        match self {
            FieldKind::LoginUsername => "login-username".to_string(),
            FieldKind::LoginPassword => "login-password".to_string(),
            FieldKind::CardNumber => "card-number".to_string(),
            FieldKind::CardCvv => "card-cvv".to_string(),
            FieldKind::CardExpiry => "card-exp".to_string(),
            FieldKind::CardExpMonth => "card-exp-month".to_string(),
            FieldKind::CardExpYear => "card-exp-year".to_string(),
            FieldKind::CardHolder => "card-holder".to_string(),
            FieldKind::Identity(field) => format!("identity-{}", field.as_str()),
        }
    }

    pub fn is_card(&self) -> bool {
        matches!(
            self,
            FieldKind::CardNumber
                | FieldKind::CardCvv
                | FieldKind::CardExpiry
                | FieldKind::CardExpMonth
                | FieldKind::CardExpYear
                | FieldKind::CardHolder
        )
    }

    pub fn is_login(&self) -> bool {
        matches!(self, FieldKind::LoginUsername | FieldKind::LoginPassword)
    }

    /// Whether an inline icon is attached to fields of this kind.
    pub fn has_affordance(&self) -> bool {
        matches!(
            self,
            FieldKind::LoginUsername | FieldKind::CardNumber | FieldKind::Identity(_)
        )
    }
}

/// A classified field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub element: NodeId,
    pub kind: FieldKind,
    /// For a username: the password it was paired with. For a password: its
    /// username, if one was found.
    pub partner: Option<NodeId>,
}

impl FieldRecord {
    fn new(element: NodeId, kind: FieldKind) -> Self {
        Self {
            element,
            kind,
            partner: None,
        }
    }
}

/// Whether a field already carries a classification.
pub fn is_processed(doc: &Document, id: NodeId) -> bool {
    doc.get(id).is_some_and(|e| e.data(PROCESSED_ATTR).is_some())
}

fn mark(doc: &mut Document, record: &FieldRecord) {
    doc.set_data(record.element, PROCESSED_ATTR, &record.kind.marker());
}

/// Unprocessed, enabled, visible controls under `root`.
fn candidates(doc: &Document, root: NodeId) -> Vec<NodeId> {
    doc.form_controls(root)
        .into_iter()
        .filter(|id| !is_processed(doc, *id))
        .filter(|id| doc.get(*id).is_some_and(patterns::is_candidate))
        .collect()
}

/// Classify the new fields under `root`.
///
/// Safe to call repeatedly: fields classified by an earlier run are skipped,
/// so a second call over an unchanged page returns nothing. Values are never
/// touched.
pub fn detect(doc: &mut Document, root: NodeId) -> Vec<FieldRecord> {
    let mut records = Vec::new();

    // CVV first; these are often type=password.
    for id in candidates(doc, root) {
        if doc.get(id).is_some_and(patterns::is_cvv) {
            let record = FieldRecord::new(id, FieldKind::CardCvv);
            mark(doc, &record);
            records.push(record);
        }
    }

    for id in candidates(doc, root) {
        if let Some(kind) = doc.get(id).and_then(patterns::card_kind) {
            let record = FieldRecord::new(id, kind);
            mark(doc, &record);
            records.push(record);
        }
    }

    let passwords: Vec<NodeId> = candidates(doc, root)
        .into_iter()
        .filter(|id| doc.get(*id).is_some_and(|e| e.input_type() == "password"))
        .collect();
    for password in passwords {
        let username = find_username(doc, password);
        let mut password_record = FieldRecord::new(password, FieldKind::LoginPassword);
        password_record.partner = username;
        mark(doc, &password_record);
        records.push(password_record);

        if let Some(username) = username {
            if !is_processed(doc, username) {
                let record = FieldRecord {
                    element: username,
                    kind: FieldKind::LoginUsername,
                    partner: Some(password),
                };
                mark(doc, &record);
                records.push(record);
            }
        }
    }

    for id in candidates(doc, root) {
        if let Some(field) = doc.get(id).and_then(patterns::identity_kind) {
            let record = FieldRecord::new(id, FieldKind::Identity(field));
            mark(doc, &record);
            records.push(record);
        }
    }

    if !records.is_empty() {
        debug!(count = records.len(), "Detected fields");
    }
    records
}

/// Classify the new fields of the whole page.
pub fn detect_page(doc: &mut Document) -> Vec<FieldRecord> {
    let body = doc.body();
    detect(doc, body)
}

/// Username field associated with a password input.
///
/// Looks for username-like inputs in the password's form (or the whole page),
/// preferring the closest one positioned above the password. Falls back to
/// the nearest preceding text or email input in document order.
fn find_username(doc: &Document, password: NodeId) -> Option<NodeId> {
    let scope = doc.enclosing_form(password).unwrap_or_else(|| doc.body());
    let password_box = doc.get(password)?.bounding_box;

    let usable = |id: &NodeId| {
        doc.get(*id).is_some_and(|e| {
            patterns::is_candidate(e) && patterns::is_username_candidate(e)
        }) && doc
            .get(*id)
            .and_then(|e| e.data(PROCESSED_ATTR))
            .is_none_or(|m| m == "login-username")
    };

    let likely: Vec<NodeId> = doc
        .form_controls(scope)
        .into_iter()
        .filter(|id| usable(id))
        .filter(|id| doc.get(*id).is_some_and(patterns::is_username_like))
        .collect();

    let above = likely
        .iter()
        .filter_map(|id| doc.get(*id).map(|e| (*id, e.bounding_box.y)))
        .filter(|(_, y)| *y < password_box.y)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id);
    if let Some(id) = above.or_else(|| likely.first().copied()) {
        return Some(id);
    }

    let order = doc.form_controls(doc.body());
    let position = order.iter().position(|id| *id == password)?;
    order[..position].iter().rev().copied().find(|id| usable(id))
}

/// Input that takes a one-time code, if the page has one.
pub fn find_one_time_code_field(doc: &Document) -> Option<NodeId> {
    doc.form_controls(doc.body()).into_iter().find(|id| {
        doc.get(*id).is_some_and(|e| {
            patterns::is_candidate(e)
                && e.input_type() != "password"
                && patterns::is_one_time_code(e)
        })
    })
}
