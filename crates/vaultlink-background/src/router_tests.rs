use super::*;
use std::time::Duration;

use crate::session::AUTO_LOCK_ALARM;
use crate::test_support::{Fixture, MASTER};
use vaultlink_protocols::{AutoLockPolicy, CredentialEntry, GeneratePasswordOptions};

fn router_for(f: &Fixture) -> MessageRouter {
    MessageRouter::new(f.coordinator.clone(), f.vault.clone(), f.browser.clone())
}

fn items() -> Vec<CredentialEntry> {
    vec![
        CredentialEntry::login("1", "Example", "alice", "hunter2", "example.com")
            .with_totp("JBSWY3DPEHPK3PXP"),
        CredentialEntry::login("2", "Other", "bob", "pw", "other.org"),
    ]
}

async fn unlocked() -> (Fixture, MessageRouter) {
    let f = Fixture::new(items());
    let router = router_for(&f);
    let response = router
        .handle(Request::Unlock {
            password: MASTER.to_string(),
        })
        .await;
    assert!(matches!(response, Response::Unlocked(_)));
    (f, router)
}

#[test]
fn test_request_types_cover_every_variant() {
    let requests = vec![
        Request::Unlock {
            password: String::new(),
        },
        Request::Lock,
        Request::VaultLocked,
        Request::GetStatus,
        Request::GetItems,
        Request::GetMatches { url: String::new() },
        Request::GetMatchCount { url: String::new() },
        Request::GetTotp { id: String::new() },
        Request::GeneratePassword {
            options: GeneratePasswordOptions::default(),
        },
        Request::CreateItem {
            item: items().remove(0),
        },
        Request::UpdateItem {
            id: String::new(),
            item: items().remove(0),
        },
        Request::DeleteItem { id: String::new() },
        Request::OpenPopup,
        Request::GetAutoLock,
        Request::SetAutoLock {
            policy: AutoLockPolicy::default(),
        },
    ];
    assert_eq!(requests.len(), REQUEST_TYPES.len());
    for request in requests {
        assert!(REQUEST_TYPES.contains(&request.kind()), "{}", request.kind());
    }
}

#[test]
fn test_parse_request() {
    let request = parse_request(r#"{"type":"GET_MATCHES","url":"https://example.com"}"#).unwrap();
    assert_eq!(
        request,
        Request::GetMatches {
            url: "https://example.com".to_string()
        }
    );

    let err = parse_request(r#"{"type":"FORMAT_DISK"}"#).unwrap_err();
    assert!(matches!(err, RouterError::UnknownType(t) if t == "FORMAT_DISK"));

    let err = parse_request(r#"{"type":"GET_MATCHES"}"#).unwrap_err();
    assert!(matches!(err, RouterError::Malformed(_)));

    let err = parse_request(r#"{"url":"x"}"#).unwrap_err();
    assert!(matches!(err, RouterError::Malformed(_)));

    let err = parse_request("not json").unwrap_err();
    assert!(matches!(err, RouterError::Malformed(_)));
}

#[tokio::test]
async fn test_unknown_type_gets_error_response() {
    let f = Fixture::new(items());
    let router = router_for(&f);
    match router.handle_raw(r#"{"type":"NOPE"}"#).await {
        Response::Error { error, locked } => {
            assert_eq!(error, "Unknown message type: NOPE");
            assert!(!locked);
        }
        other => panic!("expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_vault_requests_need_unlock() {
    let f = Fixture::new(items());
    let router = router_for(&f);

    let response = router
        .handle(Request::GetMatches {
            url: "https://example.com".to_string(),
        })
        .await;
    assert!(matches!(response, Response::Error { locked: true, .. }));
    assert_eq!(f.vault.calls("list_items"), 0);

    let status = router.handle(Request::GetStatus).await;
    assert_eq!(status, Response::Status(StatusInfo { locked: true }));
}

#[tokio::test]
async fn test_get_matches_filters_by_url() {
    let (_f, router) = unlocked().await;
    let items = router
        .handle(Request::GetMatches {
            url: "https://login.example.com/".to_string(),
        })
        .await
        .into_items()
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].username(), Some("alice"));

    let count = router
        .handle(Request::GetMatchCount {
            url: "https://other.org".to_string(),
        })
        .await;
    assert_eq!(count, Response::MatchCount(1));
}

#[tokio::test]
async fn test_totp_and_generate() {
    let (_f, router) = unlocked().await;
    let code = router
        .handle(Request::GetTotp { id: "1".to_string() })
        .await
        .into_totp()
        .unwrap();
    assert_eq!(code.code, "123456");

    let missing = router.handle(Request::GetTotp { id: "2".to_string() }).await;
    assert!(matches!(missing, Response::Error { locked: false, .. }));

    let password = router
        .handle(Request::GeneratePassword {
            options: GeneratePasswordOptions {
                length: 12,
                ..Default::default()
            },
        })
        .await;
    assert_eq!(password, Response::Password("x".repeat(12)));
}

#[tokio::test]
async fn test_item_lifecycle() {
    let (f, router) = unlocked().await;
    let response = router
        .handle(Request::CreateItem {
            item: CredentialEntry::login("", "New", "dave", "pw", "new.site"),
        })
        .await;
    let Response::Item(created) = response else {
        panic!("expected an item");
    };
    assert!(!created.id.is_empty());

    let mut changed = created.clone();
    changed.name = "Renamed".to_string();
    let updated = router
        .handle(Request::UpdateItem {
            id: created.id.clone(),
            item: changed,
        })
        .await;
    assert!(matches!(updated, Response::Item(ref e) if e.name == "Renamed"));

    let deleted = router
        .handle(Request::DeleteItem {
            id: created.id.clone(),
        })
        .await;
    assert_eq!(deleted, Response::Ok);
    assert_eq!(f.vault.calls("delete_item"), 1);
}

#[tokio::test]
async fn test_unauthorized_locks_session() {
    let (f, router) = unlocked().await;
    let mut events = f.broadcaster.subscribe();
    f.vault.expire_tokens();

    let response = router.handle(Request::GetItems).await;
    assert!(matches!(response, Response::Error { locked: true, .. }));
    assert!(!f.coordinator.is_unlocked().await);
    assert_eq!(
        events.recv().await.unwrap(),
        vaultlink_protocols::Event::VaultLocked
    );
}

#[tokio::test]
async fn test_network_error_stays_in_band() {
    let (f, router) = unlocked().await;
    f.vault.set_offline(true);
    match router.handle(Request::GetItems).await {
        Response::Error { error, locked } => {
            assert!(error.contains("Network error"));
            assert!(!locked);
        }
        other => panic!("expected error, got {:?}", other),
    }
    assert!(f.coordinator.is_unlocked().await);
}

#[tokio::test]
async fn test_wrong_password_response() {
    let f = Fixture::new(items());
    let router = router_for(&f);
    let response = router
        .handle(Request::Unlock {
            password: "nope".to_string(),
        })
        .await;
    assert!(matches!(response, Response::Error { locked: false, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_message_refreshes_sliding_timer() {
    let (f, router) = unlocked().await;
    tokio::time::advance(Duration::from_secs(14 * 60)).await;
    assert_eq!(
        f.alarms.remaining(AUTO_LOCK_ALARM),
        Some(Duration::from_secs(60))
    );

    router.handle(Request::GetStatus).await;
    assert_eq!(
        f.alarms.remaining(AUTO_LOCK_ALARM),
        Some(Duration::from_secs(15 * 60))
    );
}

#[tokio::test(start_paused = true)]
async fn test_lock_message_does_not_refresh() {
    let (f, router) = unlocked().await;
    tokio::time::advance(Duration::from_secs(60)).await;
    router.handle(Request::VaultLocked).await;
    assert_eq!(
        f.alarms.remaining(AUTO_LOCK_ALARM),
        Some(Duration::from_secs(14 * 60))
    );

    router.handle(Request::Lock).await;
    assert!(!f.alarms.is_armed(AUTO_LOCK_ALARM));
    assert!(!f.coordinator.is_unlocked().await);
}

#[tokio::test]
async fn test_auto_lock_round_trip() {
    let (_f, router) = unlocked().await;
    assert_eq!(
        router.handle(Request::GetAutoLock).await,
        Response::AutoLock(AutoLockPolicy::Minutes(15))
    );
    router
        .handle(Request::SetAutoLock {
            policy: AutoLockPolicy::OnBrowserClose,
        })
        .await;
    assert_eq!(
        router.handle(Request::GetAutoLock).await,
        Response::AutoLock(AutoLockPolicy::OnBrowserClose)
    );
}

#[tokio::test]
async fn test_open_popup() {
    let f = Fixture::new(Vec::new());
    let router = router_for(&f);
    assert_eq!(router.handle(Request::OpenPopup).await, Response::Ok);
    assert_eq!(f.browser.popups_opened(), 1);

    f.browser.set_popup_available(false);
    let response = router.handle(Request::OpenPopup).await;
    assert!(response.is_error());
}
