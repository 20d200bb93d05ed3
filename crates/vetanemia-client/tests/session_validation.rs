//! The session cache driven by the real HTTP identity provider.

use std::sync::Arc;

use serde_json::json;
use vetanemia_client::VetClient;
use vetanemia_session::{
    IdentityError, KeyValueStore, MemoryStore, Mount, SessionManager, TOKEN_KEY, USER_KEY,
    Validation,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn manager_for(server: &MockServer, store: Arc<MemoryStore>) -> SessionManager {
    let client = VetClient::new(&server.uri()).unwrap();
    SessionManager::new(store, Arc::new(client))
}

#[tokio::test]
async fn repeated_mounts_validate_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me/"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "email": "vet@clinic.test",
            "firstName": "Ada",
            "lastName": "Moss",
            "role": "Veterinarian",
            "clinicId": "CL-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let session = manager_for(&server, store.clone());
    session.begin_session("abc").unwrap();

    let Mount::Mounted(first) = session.ensure_user().unwrap() else {
        panic!("expected mount");
    };
    let outcome = first.validation.unwrap().wait().await;
    assert!(matches!(outcome, Validation::Valid(ref u) if u.id == 7));

    for _ in 0..5 {
        let Mount::Mounted(again) = session.ensure_user().unwrap() else {
            panic!("expected mount");
        };
        assert_eq!(again.user.as_ref().map(|u| u.id), Some(7));
        assert!(again.validation.is_none());
    }

    let snapshot = store.get(USER_KEY).unwrap().unwrap();
    assert!(snapshot.contains("\"firstName\":\"Ada\""));
}

#[tokio::test]
async fn unauthorized_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "expired").unwrap();
    let session = manager_for(&server, store.clone());

    let Mount::Mounted(mounted) = session.ensure_user().unwrap() else {
        panic!("expected mount");
    };
    let outcome = mounted.validation.unwrap().wait().await;
    assert_eq!(outcome, Validation::Terminated(IdentityError::Rejected(401)));
    assert!(store.is_empty());
    assert!(matches!(session.ensure_user().unwrap(), Mount::Redirect(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "abc").unwrap();
    let client = VetClient::new("http://127.0.0.1:9").unwrap();
    let session = SessionManager::new(store.clone(), Arc::new(client));

    let Mount::Mounted(mounted) = session.ensure_user().unwrap() else {
        panic!("expected mount");
    };
    let outcome = mounted.validation.unwrap().wait().await;
    assert!(matches!(
        outcome,
        Validation::Terminated(IdentityError::Transport(_))
    ));
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}
