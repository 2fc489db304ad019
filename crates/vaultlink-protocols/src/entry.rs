//! Vault entry data model.
//!
//! Entries are owned by the external vault. The runtime only ever holds
//! read-through copies fetched per request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;

/// Kind of vault entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Login,
    Card,
    SecureNote,
    Identity,
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::Login => write!(f, "login"),
            EntryType::Card => write!(f, "card"),
            EntryType::SecureNote => write!(f, "secure_note"),
            EntryType::Identity => write!(f, "identity"),
        }
    }
}

/// Rule deciding whether a stored URI applies to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Registrable domain equality (`login.example.com` matches `example.com`).
    #[default]
    Domain,
    /// Exact host, including the port.
    Host,
    /// Plain string prefix.
    StartsWith,
    /// Plain string equality.
    Exact,
    /// The stored URI is a regular expression.
    RegularExpression,
    /// Never matches.
    Never,
}

/// A URI attached to a login entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUri {
    pub uri: String,
    /// Policy override; `None` means [`MatchPolicy::Domain`].
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_policy: Option<MatchPolicy>,
}

impl LoginUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            match_policy: None,
        }
    }

    pub fn with_policy(uri: impl Into<String>, policy: MatchPolicy) -> Self {
        Self {
            uri: uri.into(),
            match_policy: Some(policy),
        }
    }

    /// The effective policy for this URI.
    pub fn policy(&self) -> MatchPolicy {
        self.match_policy.unwrap_or_default()
    }
}

/// Login payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// One-time-code secret. Opaque to the runtime; codes are minted by the vault.
    #[serde(default)]
    pub totp: Option<String>,
    #[serde(default)]
    pub uris: Vec<LoginUri>,
}

/// Payment card payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    #[serde(default)]
    pub cardholder_name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub exp_month: Option<String>,
    #[serde(default)]
    pub exp_year: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl CardData {
    /// Last four digits of the card number, if known.
    pub fn last_four(&self) -> Option<&str> {
        let number = self.number.as_deref()?;
        let digits = number.trim();
        if digits.len() < 4 {
            return None;
        }
        digits.get(digits.len() - 4..)
    }

    /// Expiry rendered as `MM/YY`.
    pub fn expiry(&self) -> Option<String> {
        let month = self.exp_month.as_deref()?.trim();
        let year = self.exp_year.as_deref()?.trim();
        let month_valid = matches!(month.len(), 1 | 2) && month.bytes().all(|b| b.is_ascii_digit());
        let year_valid = matches!(year.len(), 2 | 4) && year.bytes().all(|b| b.is_ascii_digit());
        if !month_valid || !year_valid {
            return None;
        }
        let short_year = year.get(year.len() - 2..)?;
        Some(format!("{:0>2}/{}", month, short_year))
    }
}

/// Identity payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl IdentityData {
    /// First and last name joined by a space, skipping missing parts.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// A stored credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<LoginData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CredentialEntry {
    /// Build a login entry with a single Domain-policy URI.
    pub fn login(
        id: impl Into<String>,
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entry_type: EntryType::Login,
            name: name.into(),
            login: Some(LoginData {
                username: Some(username.into()),
                password: Some(password.into()),
                totp: None,
                uris: vec![LoginUri::new(uri)],
            }),
            card: None,
            identity: None,
            notes: None,
            favorite: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Build a card entry.
    pub fn card(id: impl Into<String>, name: impl Into<String>, card: CardData) -> Self {
        Self {
            id: id.into(),
            entry_type: EntryType::Card,
            name: name.into(),
            login: None,
            card: Some(card),
            identity: None,
            notes: None,
            favorite: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Build an identity entry.
    pub fn identity(
        id: impl Into<String>,
        name: impl Into<String>,
        identity: IdentityData,
    ) -> Self {
        Self {
            id: id.into(),
            entry_type: EntryType::Identity,
            name: name.into(),
            login: None,
            card: None,
            identity: Some(identity),
            notes: None,
            favorite: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_totp(mut self, secret: impl Into<String>) -> Self {
        if let Some(login) = self.login.as_mut() {
            login.totp = Some(secret.into());
        }
        self
    }

    pub fn with_uri(mut self, uri: LoginUri) -> Self {
        if let Some(login) = self.login.as_mut() {
            login.uris.push(uri);
        }
        self
    }

    pub fn favorite(mut self) -> Self {
        self.favorite = true;
        self
    }

    pub fn username(&self) -> Option<&str> {
        self.login.as_ref()?.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.login.as_ref()?.password.as_deref()
    }

    pub fn has_totp(&self) -> bool {
        self.login
            .as_ref()
            .and_then(|l| l.totp.as_deref())
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Secondary line shown under the entry name in menus.
    pub fn subtitle(&self) -> Option<String> {
        match self.entry_type {
            EntryType::Login => self.username().map(str::to_string),
            EntryType::Card => self
                .card
                .as_ref()
                .and_then(|c| c.last_four())
                .map(|digits| format!("\u{2022}\u{2022}\u{2022}\u{2022} {}", digits)),
            EntryType::Identity => self.identity.as_ref().and_then(|i| {
                i.email.clone().or_else(|| i.full_name())
            }),
            EntryType::SecureNote => None,
        }
    }
}
