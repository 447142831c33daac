//! Control server.
//!
//! The shim pings it before swapping tags, browsers subscribe to its event
//! stream, and stylesheets pull theme images and fonts from it.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use themebridge_core::CONTROL_PREFIX;
use tokio::net::TcpListener;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tower_http::cors::{Any, CorsLayer};

use crate::dev::{DevEvent, SharedState, static_files};
use crate::error::{CliError, Result};

const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");
const BODY_RESET_SCRIPT: &str = include_str!("../../assets/dev/body-reset.js");

pub struct DevServer {
    state: SharedState,
}

impl DevServer {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Serve on an already bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> Result<()> {
        let app = Self::build_router(self.state);
        axum::serve(listener, app)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {e}")))
    }

    pub fn build_router(state: SharedState) -> Router {
        Router::new()
            .route(&format!("{CONTROL_PREFIX}/ping"), get(handle_ping))
            .route(&format!("{CONTROL_PREFIX}/events"), get(handle_sse))
            .route(&format!("{CONTROL_PREFIX}/reload.js"), get(handle_reload_script))
            .route(&format!("{CONTROL_PREFIX}/body-reset.js"), get(handle_body_reset_script))
            .route(&format!("{CONTROL_PREFIX}/catalog"), get(handle_catalog))
            .fallback(handle_static)
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(state)
    }
}

async fn handle_ping() -> &'static str {
    "pong"
}

async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    tracing::debug!(id, "browser subscribed to reload events");

    state.broadcast(&DevEvent::ClientConnected { id }).await;

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn script(body: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

async fn handle_reload_script() -> Response {
    script(RELOAD_SCRIPT)
}

async fn handle_body_reset_script() -> Response {
    script(BODY_RESET_SCRIPT)
}

async fn handle_catalog(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.catalog())
}

/// Theme files by extension allowlist. CSS goes through `url()` rewriting.
/// Preflight requests never get here; the CORS layer answers them.
async fn handle_static(State(state): State<SharedState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path();
    let Some(file) = static_files::resolve(state.theme_dir(), state.theme_prefix(), path) else {
        return not_found(path);
    };
    let Some(mime) = static_files::content_type(&file) else {
        return not_found(path);
    };
    if !file.is_file() {
        return not_found(path);
    }

    let content = match tokio::fs::read(&file).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %file.display(), "failed to read static file: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let body = if mime.starts_with("text/css") {
        let css = String::from_utf8_lossy(&content);
        state.rewriter().rewrite(&css).into_owned().into_bytes()
    } else {
        content
    };

    (
        [(header::CONTENT_TYPE, mime), (header::CACHE_CONTROL, "no-cache")],
        body,
    )
        .into_response()
}

fn not_found(path: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("File not found: {path}")).into_response()
}
