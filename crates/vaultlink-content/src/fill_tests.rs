use super::*;
use crate::detector::detect_page;
use crate::dom::Element;
use crate::gate::SecurityRisk;
use crate::test_support::{FixedConfirmer, MemoryClipboard, RecordingNotifier, ScriptedBus};
use vaultlink_protocols::{Response, TotpCode};

fn totp_bus() -> Arc<ScriptedBus> {
    ScriptedBus::new(|request| match request {
        Request::GetTotp { .. } => Response::Totp(TotpCode {
            code: "123456".to_string(),
            remaining: 20,
        }),
        _ => Response::error("unexpected"),
    })
}

struct Harness {
    orchestrator: FillOrchestrator,
    confirmer: Arc<FixedConfirmer>,
    notifier: Arc<RecordingNotifier>,
    clipboard: Arc<MemoryClipboard>,
}

fn harness(confirm: bool, clipboard: Arc<MemoryClipboard>) -> Harness {
    let confirmer = FixedConfirmer::new(confirm);
    let notifier = RecordingNotifier::new();
    let orchestrator = FillOrchestrator::new(
        totp_bus(),
        confirmer.clone(),
        notifier.clone(),
        clipboard.clone(),
    );
    Harness {
        orchestrator,
        confirmer,
        notifier,
        clipboard,
    }
}

fn login_page(url: &str) -> (Document, NodeId, NodeId) {
    let mut doc = Document::new(url);
    let form = doc.append(doc.body(), Element::form());
    let user = doc.append(form, Element::input("text").with_name("username"));
    let pass = doc.append(form, Element::input("password").with_name("password"));
    (doc, user, pass)
}

fn alice() -> CredentialEntry {
    CredentialEntry::login("1", "Example", "alice", "hunter2", "example.com")
}

#[test]
fn test_fill_value_dispatches_events() {
    let (mut doc, user, _) = login_page("https://example.com/login");
    fill_value(&mut doc, user, "alice").unwrap();

    assert_eq!(doc.get(user).unwrap().value, "alice");
    assert_eq!(
        doc.events_for(user),
        vec![
            DomEventKind::Input,
            DomEventKind::Change,
            DomEventKind::Highlight
        ]
    );
    assert!(doc.events().iter().take(2).all(|e| e.bubbles));
}

#[test]
fn test_fill_value_detached_field() {
    let (mut doc, user, _) = login_page("https://example.com/login");
    doc.remove(user);
    assert!(matches!(
        fill_value(&mut doc, user, "x"),
        Err(FillError::FieldDetached(_))
    ));
}

#[tokio::test]
async fn test_fill_login_https_no_prompt() {
    let h = harness(false, MemoryClipboard::new());
    let (mut doc, user, pass) = login_page("https://example.com/login");

    let filled = h
        .orchestrator
        .fill_login(&mut doc, Some(user), Some(pass), &alice())
        .await
        .unwrap();
    assert_eq!(filled, 2);
    assert_eq!(doc.get(user).unwrap().value, "alice");
    assert_eq!(doc.get(pass).unwrap().value, "hunter2");
    assert!(h.confirmer.asked().is_empty());
}

#[tokio::test]
async fn test_http_fill_blocked_when_declined() {
    let h = harness(false, MemoryClipboard::new());
    let (mut doc, user, pass) = login_page("http://example.com/login");

    let result = h
        .orchestrator
        .fill_login(&mut doc, Some(user), Some(pass), &alice())
        .await;
    assert!(matches!(result, Err(FillError::Cancelled)));
    assert_eq!(doc.get(user).unwrap().value, "");
    assert_eq!(doc.get(pass).unwrap().value, "");
    assert_eq!(h.confirmer.asked(), vec![vec![SecurityRisk::InsecureHttp]]);
    assert_eq!(h.notifier.notices(), vec![Notice::FillCancelled]);
}

#[tokio::test]
async fn test_http_fill_proceeds_when_confirmed() {
    let h = harness(true, MemoryClipboard::new());
    let (mut doc, user, pass) = login_page("http://example.com/login");

    h.orchestrator
        .fill_login(&mut doc, Some(user), Some(pass), &alice())
        .await
        .unwrap();
    assert_eq!(doc.get(pass).unwrap().value, "hunter2");
}

#[tokio::test]
async fn test_frame_triggers_gate() {
    let h = harness(false, MemoryClipboard::new());
    let mut doc = Document::new("https://example.com/login").in_frame();
    let user = doc.append(doc.body(), Element::input("text"));

    let result = h
        .orchestrator
        .fill_login(&mut doc, Some(user), None, &alice())
        .await;
    assert!(matches!(result, Err(FillError::Cancelled)));
    assert_eq!(h.confirmer.asked(), vec![vec![SecurityRisk::CrossFrame]]);
}

#[tokio::test]
async fn test_nothing_to_fill_skips_gate() {
    let h = harness(false, MemoryClipboard::new());
    let (mut doc, _, _) = login_page("http://example.com/login");

    let result = h.orchestrator.fill_login(&mut doc, None, None, &alice()).await;
    assert!(matches!(result, Err(FillError::NothingToFill)));
    assert!(h.confirmer.asked().is_empty());
}

#[tokio::test]
async fn test_totp_filled_into_code_field() {
    let h = harness(true, MemoryClipboard::new());
    let (mut doc, user, pass) = login_page("https://example.com/login");
    let otp = doc.append(doc.body(), Element::input("text").with_autocomplete("one-time-code"));

    h.orchestrator
        .fill_login(&mut doc, Some(user), Some(pass), &alice().with_totp("JBSWY3DPEHPK3PXP"))
        .await
        .unwrap();
    assert_eq!(doc.get(otp).unwrap().value, "123456");
    assert!(h.clipboard.text().is_none());
}

#[tokio::test]
async fn test_totp_copied_without_code_field() {
    let h = harness(true, MemoryClipboard::new());
    let (mut doc, user, pass) = login_page("https://example.com/login");

    h.orchestrator
        .fill_login(&mut doc, Some(user), Some(pass), &alice().with_totp("JBSWY3DPEHPK3PXP"))
        .await
        .unwrap();
    assert_eq!(h.clipboard.text().as_deref(), Some("123456"));
    assert_eq!(h.notifier.notices(), vec![Notice::TotpCopied]);
}

#[tokio::test]
async fn test_totp_clipboard_denied_is_reported() {
    let h = harness(true, MemoryClipboard::denying());
    let (mut doc, user, pass) = login_page("https://example.com/login");

    let filled = h
        .orchestrator
        .fill_login(&mut doc, Some(user), Some(pass), &alice().with_totp("secret"))
        .await
        .unwrap();
    assert_eq!(filled, 2);
    assert_eq!(h.notifier.notices(), vec![Notice::ClipboardDenied]);
}

#[tokio::test]
async fn test_totp_disabled() {
    let h = harness(true, MemoryClipboard::new());
    let orchestrator = h.orchestrator.with_totp_autofill(false);
    let (mut doc, user, pass) = login_page("https://example.com/login");

    orchestrator
        .fill_login(&mut doc, Some(user), Some(pass), &alice().with_totp("secret"))
        .await
        .unwrap();
    assert!(h.clipboard.text().is_none());
}

#[tokio::test]
async fn test_fill_card() {
    let h = harness(true, MemoryClipboard::new());
    let mut doc = Document::new("https://shop.example.com/pay");
    let form = doc.append(doc.body(), Element::form());
    let number = doc.append(form, Element::input("text").with_autocomplete("cc-number"));
    let exp = doc.append(form, Element::input("text").with_autocomplete("cc-exp"));
    let cvv = doc.append(form, Element::input("password").with_name("cvv"));
    let holder = doc.append(form, Element::input("text").with_autocomplete("cc-name"));
    let records = detect_page(&mut doc);

    let entry = CredentialEntry::card(
        "c1",
        "Visa",
        CardData {
            cardholder_name: Some("Alice Smith".to_string()),
            brand: Some("Visa".to_string()),
            number: Some("4111111111111111".to_string()),
            exp_month: Some("3".to_string()),
            exp_year: Some("2029".to_string()),
            code: Some("123".to_string()),
        },
    );
    let filled = h
        .orchestrator
        .fill_card(&mut doc, number, &records, &entry)
        .await
        .unwrap();
    assert_eq!(filled, 4);
    assert_eq!(doc.get(number).unwrap().value, "4111111111111111");
    assert_eq!(doc.get(exp).unwrap().value, "03/29");
    assert_eq!(doc.get(cvv).unwrap().value, "123");
    assert_eq!(doc.get(holder).unwrap().value, "Alice Smith");
}

#[tokio::test]
async fn test_fill_card_split_expiry() {
    let h = harness(true, MemoryClipboard::new());
    let mut doc = Document::new("https://shop.example.com/pay");
    let number = doc.append(doc.body(), Element::input("text").with_name("cardnumber"));
    let month = doc.append(doc.body(), Element::input("text").with_autocomplete("cc-exp-month"));
    let year = doc.append(doc.body(), Element::input("text").with_autocomplete("cc-exp-year"));
    let records = detect_page(&mut doc);

    let entry = CredentialEntry::card(
        "c1",
        "Visa",
        CardData {
            number: Some("4111111111111111".to_string()),
            exp_month: Some("7".to_string()),
            exp_year: Some("2030".to_string()),
            ..Default::default()
        },
    );
    h.orchestrator
        .fill_card(&mut doc, number, &records, &entry)
        .await
        .unwrap();
    assert_eq!(doc.get(month).unwrap().value, "07");
    assert_eq!(doc.get(year).unwrap().value, "2030");
}

#[tokio::test]
async fn test_fill_identity_scoped_to_form() {
    let h = harness(true, MemoryClipboard::new());
    let mut doc = Document::new("https://example.com/checkout");
    let shipping = doc.append(doc.body(), Element::form());
    let first = doc.append(shipping, Element::input("text").with_autocomplete("given-name"));
    let city = doc.append(shipping, Element::input("text").with_name("city"));
    let other = doc.append(doc.body(), Element::form());
    let other_city = doc.append(other, Element::input("text").with_name("city"));
    let records = detect_page(&mut doc);

    let entry = CredentialEntry::identity(
        "i1",
        "Home",
        IdentityData {
            first_name: Some("Alice".to_string()),
            city: Some("Springfield".to_string()),
            ..Default::default()
        },
    );
    let filled = h
        .orchestrator
        .fill_identity(&mut doc, first, &records, &entry)
        .await
        .unwrap();
    assert_eq!(filled, 2);
    assert_eq!(doc.get(first).unwrap().value, "Alice");
    assert_eq!(doc.get(city).unwrap().value, "Springfield");
    assert_eq!(doc.get(other_city).unwrap().value, "");
}

#[tokio::test]
async fn test_fill_card_requires_card_data() {
    let h = harness(true, MemoryClipboard::new());
    let (mut doc, user, _) = login_page("https://example.com/login");
    let result = h.orchestrator.fill_card(&mut doc, user, &[], &alice()).await;
    assert!(matches!(result, Err(FillError::NothingToFill)));
}
