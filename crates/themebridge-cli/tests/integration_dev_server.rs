//! Integration tests for the control server.
//!
//! A real listener on an ephemeral port, driven with raw HTTP/1.1 requests.

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;
use themebridge_cli::dev::{DevEvent, DevServer, DevServerState, SharedState};
use themebridge_core::{AssetCatalog, AssetPath};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Duration, sleep, timeout};

const THEME_PREFIX: &str = "wp-content/themes/flavor";

struct Fixture {
    _temp: TempDir,
    addr: SocketAddr,
    state: SharedState,
}

async fn start_server() -> Fixture {
    let temp = TempDir::new().unwrap();
    let theme = temp.path().join("flavor");
    fs::create_dir_all(theme.join("css")).unwrap();
    fs::create_dir_all(theme.join("img")).unwrap();
    fs::write(
        theme.join("css/style.css"),
        ".hero { background: url(../img/hero.png); }\n",
    )
    .unwrap();
    fs::write(theme.join("img/hero.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(theme.join("functions.php"), "<?php // secret").unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut catalog = AssetCatalog::empty();
    catalog.front.sources.insert(AssetPath::new("js/main.js"));

    let state = Arc::new(DevServerState::new(
        theme,
        &format!("http://{addr}"),
        THEME_PREFIX,
        Arc::new(catalog),
    ));

    let server = DevServer::new(Arc::clone(&state));
    tokio::spawn(async move {
        let _ = server.serve_on(listener).await;
    });

    Fixture {
        _temp: temp,
        addr,
        state,
    }
}

async fn request(addr: SocketAddr, method: &str, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("response within timeout")
        .unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

fn status(response: &str) -> &str {
    response.lines().next().unwrap_or_default()
}

#[tokio::test]
async fn test_ping_answers_pong() {
    let fixture = start_server().await;
    let response = request(fixture.addr, "GET", "/__themebridge__/ping").await;

    assert!(status(&response).contains("200"), "{response}");
    assert!(response.ends_with("pong"));
}

#[tokio::test]
async fn test_catalog_endpoint_serves_current_catalog() {
    let fixture = start_server().await;
    let response = request(fixture.addr, "GET", "/__themebridge__/catalog").await;
    assert!(response.contains("js/main.js"));
    assert!(response.contains(r#""buildFolder":"dist""#));

    let mut updated = AssetCatalog::empty();
    updated.admin.sources.insert(AssetPath::new("scss/editor.scss"));
    fixture.state.update_catalog(Arc::new(updated));

    let response = request(fixture.addr, "GET", "/__themebridge__/catalog").await;
    assert!(response.contains("scss/editor.scss"));
    assert!(!response.contains("js/main.js"));
}

#[tokio::test]
async fn test_client_scripts_are_served() {
    let fixture = start_server().await;

    let response = request(fixture.addr, "GET", "/__themebridge__/reload.js").await;
    assert!(status(&response).contains("200"));
    assert!(response.to_lowercase().contains("content-type: application/javascript"));
    assert!(response.contains("EventSource"));

    let response = request(fixture.addr, "GET", "/__themebridge__/body-reset.js").await;
    assert!(response.contains("createHotContext"));
}

#[tokio::test]
async fn test_css_urls_are_rewritten() {
    let fixture = start_server().await;
    let response = request(
        fixture.addr,
        "GET",
        &format!("/{THEME_PREFIX}/css/style.css"),
    )
    .await;

    assert!(status(&response).contains("200"), "{response}");
    assert!(response.to_lowercase().contains("content-type: text/css"));
    let expected = format!(
        r#"url("http://{}/{THEME_PREFIX}/img/hero.png")"#,
        fixture.addr
    );
    assert!(response.contains(&expected), "{response}");
}

#[tokio::test]
async fn test_static_images_are_served() {
    let fixture = start_server().await;
    let response = request(fixture.addr, "GET", "/img/hero.png").await;

    let lower = response.to_lowercase();
    assert!(status(&response).contains("200"));
    assert!(lower.contains("content-type: image/png"));
    assert!(lower.contains("cache-control: no-cache"));
}

#[tokio::test]
async fn test_php_and_traversal_are_rejected() {
    let fixture = start_server().await;

    let response = request(fixture.addr, "GET", "/functions.php").await;
    assert!(status(&response).contains("404"));
    assert!(!response.contains("secret"));

    let response = request(fixture.addr, "GET", "/../flavor/css/style.css").await;
    assert!(status(&response).contains("404") || status(&response).contains("400"));

    let response = request(fixture.addr, "GET", "/img/missing.png").await;
    assert!(status(&response).contains("404"));
}

#[tokio::test]
async fn test_options_preflight_is_answered() {
    let fixture = start_server().await;
    let response = request(fixture.addr, "OPTIONS", "/img/hero.png").await;
    let line = status(&response);
    assert!(line.contains("200") || line.contains("204"), "{response}");
    assert!(response.to_lowercase().contains("access-control-allow-methods"));
}

#[tokio::test]
async fn test_dev_server_broadcast_to_clients() {
    let fixture = start_server().await;
    let state = &fixture.state;

    let (_id1, mut rx1) = state.register_client();
    let (id2, mut rx2) = state.register_client();
    assert_eq!(state.client_count(), 2);

    state
        .broadcast(&DevEvent::FullReload {
            path: Some("header.php".to_string()),
        })
        .await;

    for rx in [&mut rx1, &mut rx2] {
        tokio::select! {
            msg = rx.recv() => {
                let json = msg.unwrap();
                assert!(json.contains("full-reload"));
                assert!(json.contains("header.php"));
            }
            _ = sleep(Duration::from_millis(100)) => {
                panic!("client did not receive broadcast");
            }
        }
    }

    drop(rx2);
    state.broadcast(&DevEvent::CatalogUpdated { sources: 1 }).await;
    assert_eq!(state.client_count(), 1);
    assert!(!state.clients.read().contains_key(&id2));
}
