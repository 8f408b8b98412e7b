// Integration tests for session persistence
// Session file round trips through FileSessionStorage in a temp directory

mod fixtures;

use std::fs;
use std::path::Path;
use std::time::Duration;

use bak_clinic::services::api::ApiClient;
use bak_clinic::services::session::{FileSessionStorage, SessionEvent, SessionService};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use pretty_assertions::assert_eq;
use serde::Serialize;
use tempfile::TempDir;

#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: i64,
}

fn token_valid_for(seconds: i64) -> String {
    encode(
        &Header::default(),
        &Claims {
            sub: "1".to_string(),
            exp: Utc::now().timestamp() + seconds,
        },
        &EncodingKey::from_secret(b"server-secret"),
    )
    .unwrap()
}

fn service_at(path: &Path) -> SessionService {
    let client = ApiClient::new("http://localhost:3001", Duration::from_secs(5)).unwrap();
    SessionService::new(Box::new(FileSessionStorage::new(path)), client)
}

#[test]
fn test_session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let token = token_valid_for(3600);

    let mut first = service_at(&path);
    first
        .establish(token.clone(), fixtures::admin_user())
        .unwrap();
    assert!(path.exists());

    let mut second = service_at(&path);
    let restored = second.restore().cloned();
    assert_eq!(restored, Some(fixtures::admin_user()));
    assert_eq!(second.token(), Some(token.as_str()));
    assert_eq!(second.client().token(), Some(token));
}

#[test]
fn test_corrupt_session_file_is_discarded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, "{\"token\": 42").unwrap();

    let mut service = service_at(&path);
    assert!(service.restore().is_none());
    assert!(!service.is_authenticated());
    assert!(!path.exists());
}

#[test]
fn test_expired_token_is_not_restored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    service_at(&path)
        .establish(token_valid_for(-60), fixtures::admin_user())
        .unwrap();

    let mut service = service_at(&path);
    assert!(service.restore().is_none());
    assert!(!service.client().has_token());
    assert!(!path.exists());
}

#[test]
fn test_logout_clears_file_and_notifies() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    let mut service = service_at(&path);
    let events = service.subscribe();
    service
        .establish(token_valid_for(3600), fixtures::admin_user())
        .unwrap();
    service.logout();

    assert!(!path.exists());
    assert!(!service.client().has_token());
    let received: Vec<SessionEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            SessionEvent::LoggedIn(fixtures::admin_user()),
            SessionEvent::LoggedOut
        ]
    );
}
