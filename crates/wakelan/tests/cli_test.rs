//! Integration tests for the `wakelan` binary.
//!
//! Argument parsing, help output and completions run offline; session and
//! device flows run against a wiremock backend with config and session
//! files isolated in a temp directory.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Temp HOME / XDG dirs so tests never touch the user's real files.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("wakelan");
        cmd.env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join("config"))
            .env("XDG_DATA_HOME", self.root().join("data"))
            .env("WAKELAN_CONFIG", self.root().join("config.toml"))
            .env_remove("WAKELAN_API_URL")
            .env_remove("WAKELAN_TIMEOUT_MS")
            .env_remove("WAKELAN_DEBUG")
            .env_remove("WAKELAN_CREDENTIALS__BACKEND")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Command pointed at a mock backend.
    fn api_cmd(&self, server: &MockServer) -> assert_cmd::Command {
        let mut cmd = self.cmd();
        cmd.args(["--api-url", &format!("{}/api", server.uri())]);
        cmd
    }

    async fn login(&self, server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "token_1_admin",
                "user": {"id": 1, "username": "admin", "role": "admin"}
            })))
            .mount(server)
            .await;

        self.api_cmd(server)
            .args(["login", "--username", "admin", "--password-stdin"])
            .write_stdin("admin123\n")
            .assert()
            .success()
            .stderr(predicate::str::contains("Welcome"));
    }
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let sandbox = Sandbox::new();
    let output = sandbox.cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    Sandbox::new().cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("devices")
            .and(predicate::str::contains("wake"))
            .and(predicate::str::contains("login")),
    );
}

#[test]
fn test_completions_bash() {
    Sandbox::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_config_path_honours_flag() {
    let sandbox = Sandbox::new();
    let custom = sandbox.root().join("elsewhere.toml");
    sandbox
        .cmd()
        .args(["config", "path", "--config"])
        .arg(&custom)
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere.toml"));
}

#[test]
fn test_config_show_reads_file() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.root().join("config.toml"),
        "api_url = \"http://10.0.0.5:5000/api\"\n",
    )
    .unwrap();
    sandbox
        .cmd()
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://10.0.0.5:5000/api"));
}

#[test]
fn test_config_show_survives_broken_file() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.root().join("config.toml"), "api_url = [unterminated\n").unwrap();

    sandbox
        .cmd()
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:5000/api"))
        .stderr(predicate::str::contains("showing defaults"));

    sandbox.cmd().arg("status").assert().code(1);
}

#[test]
fn test_bad_api_url_is_rejected() {
    Sandbox::new()
        .cmd()
        .args(["--api-url", "not a url", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("api_url"));
}

#[test]
fn test_devices_require_login() {
    Sandbox::new()
        .cmd()
        .args(["devices", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_unreachable_backend_exit_code() {
    Sandbox::new()
        .cmd()
        .args(["--api-url", "http://127.0.0.1:9/api", "--timeout", "2000", "status"])
        .assert()
        .code(7);
}

// ── Session flows ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_list_devices() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/equipos"))
        .and(header("authorization", "Bearer token_1_admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "equipos": [
                {"id": 3, "nombre": "nas", "mac_address": "AA:BB:CC:DD:EE:FF", "estado": "apagado"},
                {"id": 4, "nombre": "desk", "mac_address": "11:22:33:44:55:66", "estado": "encendido"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    sandbox
        .api_cmd(&server)
        .args(["devices", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("3\n4\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_password_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Credenciales inválidas",
            "message": "Usuario o contraseña incorrectos"
        })))
        .mount(&server)
        .await;

    Sandbox::new()
        .api_cmd(&server)
        .args(["login", "-u", "admin", "--password-stdin"])
        .write_stdin("wrong\n")
        .assert()
        .code(3)
        .stderr(
            predicate::str::contains("Authentication error")
                .and(predicate::str::contains("Usuario o contraseña incorrectos")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unsuccessful_login_envelope_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    Sandbox::new()
        .api_cmd(&server)
        .args(["login", "-u", "admin", "--password-stdin"])
        .write_stdin("wrong\n")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_token_is_forgotten() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/equipos"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Token inválido"})),
        )
        .mount(&server)
        .await;

    sandbox
        .api_cmd(&server)
        .args(["devices", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Token inválido"));

    sandbox
        .api_cmd(&server)
        .arg("whoami")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_clears_session_even_if_backend_fails() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    sandbox
        .api_cmd(&server)
        .arg("logout")
        .assert()
        .success();
    sandbox
        .api_cmd(&server)
        .args(["devices", "list"])
        .assert()
        .code(3);
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_mac_never_reaches_backend() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.login(&server).await;

    sandbox
        .api_cmd(&server)
        .args(["devices", "add", "nas", "--mac", "zz:zz"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("MAC"));

    let posts = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/api/equipos")
        .count();
    assert_eq!(posts, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wake_uses_card_flow() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/equipos/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "equipo": {"id": 3, "nombre": "nas", "mac_address": "AA:BB:CC:DD:EE:FF"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/wake"))
        .and(body_json(json!({"id": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    sandbox
        .api_cmd(&server)
        .args(["wake", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wake-on-LAN packet sent to nas"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remove_without_yes_refuses_non_interactive() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.login(&server).await;

    sandbox
        .api_cmd(&server)
        .args(["devices", "remove", "3"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}
