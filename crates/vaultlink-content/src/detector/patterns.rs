//! Attribute heuristics for field classification.

use crate::dom::Element;

use super::{FieldKind, IdentityField};

/// Input types that can never hold a credential or profile value.
const IGNORED_TYPES: &[&str] = &[
    "hidden", "submit", "button", "reset", "image", "file", "checkbox", "radio", "range",
    "color",
];

const CVV_TOKENS: &[&str] = &["cvv", "cvc", "csc", "securitycode", "cardverification"];

const CARD_NUMBER_TOKENS: &[&str] = &["cardnumber", "ccnumber", "ccnum", "cardno"];

const CARD_HOLDER_TOKENS: &[&str] = &["cardholder", "ccname", "nameoncard", "cardname"];

const USERNAME_TOKENS: &[&str] = &["user", "login", "email", "account"];

const ONE_TIME_CODE_TOKENS: &[&str] = &["otp", "totp", "2fa", "mfa", "onetimecode", "verificationcode"];

/// Lowercase and drop separators so `card-number`, `card_number` and
/// `card[number]` compare equal.
pub(super) fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Normalized `name` and `id` of an element.
fn name_tokens(element: &Element) -> Vec<String> {
    [&element.attributes.name, &element.attributes.id]
        .into_iter()
        .flatten()
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Normalized `placeholder` and `aria-label`: the visible hints a page gives
/// when `name` and `id` are generated.
fn label_tokens(element: &Element) -> Vec<String> {
    [&element.attributes.placeholder, &element.attributes.aria_label]
        .into_iter()
        .flatten()
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .collect()
}

fn autocomplete(element: &Element) -> String {
    element
        .attributes
        .autocomplete
        .as_deref()
        .map(|a| a.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

fn any_token_contains(tokens: &[String], needles: &[&str]) -> bool {
    tokens
        .iter()
        .any(|token| needles.iter().any(|needle| token.contains(needle)))
}

/// Whether the element is a control detection may look at.
pub(super) fn is_candidate(element: &Element) -> bool {
    element.is_form_control()
        && !element.disabled
        && element.is_visible
        && !IGNORED_TYPES.contains(&element.input_type().as_str())
}

fn is_texty(element: &Element) -> bool {
    matches!(
        element.input_type().as_str(),
        "text" | "password" | "tel" | "number" | "search"
    )
}

pub(super) fn is_cvv(element: &Element) -> bool {
    if !is_texty(element) {
        return false;
    }
    let ac = autocomplete(element);
    if ac == "cc-csc" {
        return true;
    }
    let mut tokens = name_tokens(element);
    tokens.push(normalize(&ac));
    any_token_contains(&tokens, CVV_TOKENS)
}

/// Card number, expiry or holder classification.
pub(super) fn card_kind(element: &Element) -> Option<FieldKind> {
    match autocomplete(element).as_str() {
        "cc-number" => return Some(FieldKind::CardNumber),
        "cc-exp" => return Some(FieldKind::CardExpiry),
        "cc-exp-month" => return Some(FieldKind::CardExpMonth),
        "cc-exp-year" => return Some(FieldKind::CardExpYear),
        "cc-name" => return Some(FieldKind::CardHolder),
        _ => {}
    }
    let tokens = name_tokens(element);
    if any_token_contains(&tokens, CARD_NUMBER_TOKENS) {
        return Some(FieldKind::CardNumber);
    }
    if any_token_contains(&tokens, CARD_HOLDER_TOKENS) {
        return Some(FieldKind::CardHolder);
    }
    let is_expiry = |t: &String| {
        t.contains("expir") || t.contains("ccexp") || t.contains("expdate") || t == "exp"
    };
    for token in tokens.iter().filter(|t| is_expiry(t) || t.starts_with("exp")) {
        if token.contains("month") || token.ends_with("mm") {
            return Some(FieldKind::CardExpMonth);
        }
        if token.contains("year") || token.ends_with("yy") {
            return Some(FieldKind::CardExpYear);
        }
        if is_expiry(token) {
            return Some(FieldKind::CardExpiry);
        }
    }
    None
}

/// Whether a text-like input looks like a username field.
pub(super) fn is_username_like(element: &Element) -> bool {
    let ty = element.input_type();
    if ty == "email" {
        return true;
    }
    let ac = autocomplete(element);
    if ac == "username" || ac == "email" {
        return true;
    }
    any_token_contains(&name_tokens(element), USERNAME_TOKENS)
        || any_token_contains(&label_tokens(element), USERNAME_TOKENS)
}

/// Plain text or email input that could hold a username.
pub(super) fn is_username_candidate(element: &Element) -> bool {
    matches!(element.input_type().as_str(), "text" | "email" | "tel")
        && element.tag_name == "input"
}

pub(super) fn identity_kind(element: &Element) -> Option<IdentityField> {
    let from_autocomplete = match autocomplete(element).as_str() {
        "name" => Some(IdentityField::FullName),
        "given-name" => Some(IdentityField::FirstName),
        "family-name" => Some(IdentityField::LastName),
        "email" => Some(IdentityField::Email),
        "tel" | "tel-national" => Some(IdentityField::Phone),
        "street-address" | "address-line1" => Some(IdentityField::Address1),
        "address-line2" => Some(IdentityField::Address2),
        "address-level2" => Some(IdentityField::City),
        "address-level1" => Some(IdentityField::State),
        "postal-code" => Some(IdentityField::PostalCode),
        "country" | "country-name" => Some(IdentityField::Country),
        "organization" => Some(IdentityField::Company),
        _ => None,
    };
    if from_autocomplete.is_some() {
        return from_autocomplete;
    }
    if element.input_type() == "email" {
        return Some(IdentityField::Email);
    }
    if element.input_type() == "tel" {
        return Some(IdentityField::Phone);
    }

    let tokens = name_tokens(element);
    if any_token_contains(&tokens, &["user", "login", "pass", "search", "captcha"]) {
        return None;
    }
    let has = |needles: &[&str]| any_token_contains(&tokens, needles);
    if has(&["firstname", "fname", "givenname", "forename"]) {
        Some(IdentityField::FirstName)
    } else if has(&["lastname", "lname", "surname", "familyname"]) {
        Some(IdentityField::LastName)
    } else if has(&["fullname", "yourname"]) || tokens.iter().any(|t| t == "name") {
        Some(IdentityField::FullName)
    } else if has(&["email", "mail"]) {
        Some(IdentityField::Email)
    } else if has(&["phone", "mobile", "telephone"]) {
        Some(IdentityField::Phone)
    } else if has(&["address2", "addressline2", "apartment", "suite"]) {
        Some(IdentityField::Address2)
    } else if has(&["address", "street"]) {
        Some(IdentityField::Address1)
    } else if has(&["city", "town", "locality"]) {
        Some(IdentityField::City)
    } else if has(&["state", "province", "region"]) {
        Some(IdentityField::State)
    } else if has(&["zip", "postal", "postcode"]) {
        Some(IdentityField::PostalCode)
    } else if has(&["country"]) {
        Some(IdentityField::Country)
    } else if has(&["company", "organization", "organisation"]) {
        Some(IdentityField::Company)
    } else {
        None
    }
}

pub(super) fn is_one_time_code(element: &Element) -> bool {
    if autocomplete(element) == "one-time-code" {
        return true;
    }
    any_token_contains(&name_tokens(element), ONE_TIME_CODE_TOKENS)
        || any_token_contains(&label_tokens(element), ONE_TIME_CODE_TOKENS)
}
