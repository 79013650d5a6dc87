#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` and `Transport` using wiremock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wakelan_api::middleware::{Exchange, ResponseMiddleware};
use wakelan_api::{
    ApiClient, CreateDevice, CredentialStore, DeviceState, Envelope, Error, LoginCredentials,
    Transport, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = client_for(&server, Duration::from_secs(5));
    (server, client)
}

fn client_for(server: &MockServer, timeout: Duration) -> ApiClient {
    let config = TransportConfig::new(&format!("{}/api", server.uri()), timeout).unwrap();
    let transport = Transport::new(&config, Arc::new(CredentialStore::in_memory())).unwrap();
    ApiClient::new(Arc::new(transport))
}

fn log_in(client: &ApiClient, token: &str) {
    client
        .credentials()
        .set_token(&SecretString::from(token.to_owned()));
}

// ── Token injection ─────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_header_attached_when_token_stored() {
    let (server, client) = setup().await;
    log_in(&client, "token_1_admin");

    Mock::given(method("GET"))
        .and(path("/api/equipos"))
        .and(header("authorization", "Bearer token_1_admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "equipos": [],
            "total": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let res = client.list_devices().await.unwrap();
    assert!(res.is_success());
}

#[tokio::test]
async fn test_no_bearer_header_without_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "version": "1.0.0",
            "endpoints": {"auth": ["/api/auth/login"]}
        })))
        .mount(&server)
        .await;

    let status = client.server_status().await.unwrap();
    assert_eq!(status.version.as_deref(), Some("1.0.0"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

// ── 401 handling ────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_clears_credentials_from_any_endpoint() {
    let (server, client) = setup().await;
    log_in(&client, "token_9_stale");

    Mock::given(method("POST"))
        .and(path("/api/equipos/4/encender"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_token",
            "message": "Token inválido"
        })))
        .mount(&server)
        .await;

    let err = client.wake_device(4).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Token inválido");
    assert!(!client.credentials().is_authenticated());
    assert_eq!(client.error().as_deref(), Some("Token inválido"));
}

#[tokio::test]
async fn test_forbidden_keeps_credentials() {
    let (server, client) = setup().await;
    log_in(&client, "token_2_ana");

    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "insufficient_permissions",
            "message": "Se requieren permisos de administrador"
        })))
        .mount(&server)
        .await;

    let err = client.list_users().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(client.credentials().is_authenticated());
}

// ── Facade flags ────────────────────────────────────────────────────

#[tokio::test]
async fn test_loading_cleared_after_success_and_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/equipos/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "equipo": {
                "id": 1,
                "nombre": "desk",
                "mac_address": "AA:BB:CC:DD:EE:01",
                "estado": "apagado"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/equipos/2"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Equipo no encontrado"})),
        )
        .mount(&server)
        .await;

    let ok = client.get_device(1).await.unwrap();
    assert_eq!(ok.device.unwrap().state, DeviceState::Off);
    assert!(!client.loading());
    assert_eq!(client.error(), None);

    let err = client.get_device(2).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!client.loading());
    assert_eq!(client.error().as_deref(), Some("Equipo no encontrado"));
}

#[tokio::test]
async fn test_loading_set_while_call_in_flight() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/equipos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "equipos": []}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let client = Arc::new(client);
    let call = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.list_devices().await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(client.loading());

    let listed = call.await.unwrap().unwrap();
    assert!(listed.success);
    assert!(!client.loading());
}

#[tokio::test]
async fn test_next_call_clears_previous_error() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/equipos/3"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/equipos/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let err = client.delete_device(3).await.unwrap_err();
    assert_eq!(err.user_message(), "request failed with status code 500");
    assert!(client.error().is_some());

    client.delete_device(3).await.unwrap();
    assert_eq!(client.error(), None);
}

#[tokio::test]
async fn test_forked_client_has_isolated_flags() {
    let (server, client) = setup().await;
    let other = client.fork();

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;

    client.me().await.unwrap_err();
    assert_eq!(client.error().as_deref(), Some("boom"));
    assert_eq!(other.error(), None);
}

// ── Transport failures ──────────────────────────────────────────────

#[tokio::test]
async fn test_timeout_maps_to_timeout_error() {
    let server = MockServer::start().await;
    let client = client_for(&server, Duration::from_millis(100));

    Mock::given(method("GET"))
        .and(path("/api/equipos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let config = TransportConfig::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
    let transport = Transport::new(&config, Arc::new(CredentialStore::in_memory())).unwrap();
    let client = ApiClient::new(Arc::new(transport));

    let err = client.list_devices().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_) | Error::Timeout { .. }));
    assert!(!err.user_message().is_empty());
    assert!(client.error().is_some());
}

// ── Request bodies ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_sends_plain_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "admin123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "token_1_admin",
            "user": {"id": 1, "username": "admin", "role": "admin"}
        })))
        .mount(&server)
        .await;

    let res = client
        .login(&LoginCredentials::new("admin", "admin123"))
        .await
        .unwrap();
    assert_eq!(res.token.unwrap().expose_secret(), "token_1_admin");
    assert!(res.user.unwrap().is_admin());
}

#[tokio::test]
async fn test_create_device_uses_wire_field_names() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/equipos"))
        .and(body_json(json!({
            "nombre": "nas",
            "mac_address": "AA:BB:CC:DD:EE:FF"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "equipo": {"id": 5, "nombre": "nas", "mac_address": "AA:BB:CC:DD:EE:FF"}
        })))
        .mount(&server)
        .await;

    let res = client
        .create_device(&CreateDevice {
            name: "nas".into(),
            mac_address: "AA:BB:CC:DD:EE:FF".into(),
            ..CreateDevice::default()
        })
        .await
        .unwrap();
    assert_eq!(res.device.unwrap().state, DeviceState::Unknown);
}

#[tokio::test]
async fn test_wake_posts_id_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/wake"))
        .and(body_json(json!({"id": 12})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Magic packet enviado"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let res = client.wake(12).await.unwrap();
    assert_eq!(res.message(), Some("Magic packet enviado"));
}

#[tokio::test]
async fn test_assign_device_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/assign-equipo"))
        .and(body_json(json!({"user_id": 2, "equipo_id": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.assign_device(2, 7).await.unwrap().is_success());
}

// ── Extra middleware ────────────────────────────────────────────────

struct CountFailures(Arc<AtomicUsize>);

impl ResponseMiddleware for CountFailures {
    fn on_failure(&self, _exchange: &Exchange<'_>, _error: &Error) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_appended_middleware_sees_failures() {
    let server = MockServer::start().await;
    let failures = Arc::new(AtomicUsize::new(0));
    let config = TransportConfig::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let transport = Transport::builder(config, Arc::new(CredentialStore::in_memory()))
        .response_middleware(CountFailures(Arc::clone(&failures)))
        .build()
        .unwrap();
    let client = ApiClient::new(Arc::new(transport));

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token requerido"})))
        .mount(&server)
        .await;

    client.me().await.unwrap_err();
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}
