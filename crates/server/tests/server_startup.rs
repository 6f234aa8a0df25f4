use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::{NamedTempFile, TempDir};
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a config for the given backend, storing data under `data_dir`
fn config_for(port: u16, backend: &str, data_dir: &Path) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {port}

[storage]
backend = "{backend}"

[storage.file]
path = '{file}'

[storage.database]
path = '{db}'
"#,
        port = port,
        backend = backend,
        file = data_dir.join("data.json").display(),
        db = data_dir.join("tickets.db").display(),
    )
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_ticketdesk"))
        .env("TICKETDESK_CONFIG", config_path)
        .env_remove("PORT")
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_health_endpoint() {
    let port = get_available_port();
    let data_dir = TempDir::new().unwrap();
    let config = write_config(&config_for(port, "file", data_dir.path()));

    let mut server = spawn_server(config.path()).await;
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let json: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "Ticket System API läuft");
    assert_eq!(json["backend"], "file");

    // Bootstrap wrote the seed document
    assert!(data_dir.path().join("data.json").exists());

    server.kill().await.ok();
}

async fn tickets_survive_restart(backend: &str) {
    let data_dir = TempDir::new().unwrap();
    let client = Client::new();

    let port = get_available_port();
    let config = write_config(&config_for(port, backend, data_dir.path()));
    let mut server = spawn_server(config.path()).await;
    assert!(wait_for_server(port, 40).await, "Server did not start in time");

    let created: Value = client
        .post(format!("http://127.0.0.1:{}/api/tickets", port))
        .json(&json!({
            "title": "Monitor flackert",
            "description": "Seit dem Update",
            "author": "Tom Weber",
            "group": "Support"
        }))
        .send()
        .await
        .expect("Failed to create ticket")
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    server.kill().await.ok();
    let _ = server.wait().await;

    let port = get_available_port();
    let config = write_config(&config_for(port, backend, data_dir.path()));
    let mut server = spawn_server(config.path()).await;
    assert!(wait_for_server(port, 40).await, "Server did not restart in time");

    let response = client
        .get(format!("http://127.0.0.1:{}/api/tickets/{}", port, id))
        .send()
        .await
        .expect("Failed to fetch ticket");
    assert_eq!(response.status(), 200);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched, created);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_file_backend_persists_across_restart() {
    tickets_survive_restart("file").await;
}

#[tokio::test]
async fn test_sqlite_backend_persists_across_restart() {
    tickets_survive_restart("sqlite").await;
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_ticketdesk"))
            .env("TICKETDESK_CONFIG", "/nonexistent/config.toml")
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_port_zero_exits_with_error() {
    let config = write_config(
        r#"
[server]
port = 0
"#,
    );

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_ticketdesk"))
            .env("TICKETDESK_CONFIG", config.path())
            .env_remove("PORT")
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}
