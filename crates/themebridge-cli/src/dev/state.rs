//! Shared state for the control server.
//!
//! Uses parking_lot locks; the dev loop writes the catalog, request handlers
//! read it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use themebridge_core::{AssetCatalog, CssUrlRewriter};
use tokio::sync::mpsc;

use crate::dev::DevEvent;

/// Client connection tracker for Server-Sent Events.
pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

pub struct DevServerState {
    /// Connected SSE clients
    pub clients: ClientRegistry,

    /// Next client ID
    pub next_client_id: RwLock<usize>,

    /// Last catalog built by the dev loop
    catalog: RwLock<Arc<AssetCatalog>>,

    /// Root for static file requests
    theme_dir: PathBuf,

    /// URL path of the theme below the server origin, without slashes
    theme_prefix: String,

    rewriter: CssUrlRewriter,
}

impl DevServerState {
    /// `server_url` is the control server origin; `theme_prefix` the theme's
    /// path relative to the WordPress root (`wp-content/themes/flavor`).
    pub fn new(
        theme_dir: PathBuf,
        server_url: &str,
        theme_prefix: &str,
        catalog: Arc<AssetCatalog>,
    ) -> Self {
        let theme_prefix = theme_prefix.trim_matches('/').to_string();
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: RwLock::new(0),
            catalog: RwLock::new(catalog),
            rewriter: CssUrlRewriter::new(server_url, theme_prefix.as_str()),
            theme_dir,
            theme_prefix,
        }
    }

    pub fn catalog(&self) -> Arc<AssetCatalog> {
        Arc::clone(&*self.catalog.read())
    }

    pub fn update_catalog(&self, catalog: Arc<AssetCatalog>) {
        *self.catalog.write() = catalog;
    }

    pub fn theme_dir(&self) -> &Path {
        &self.theme_dir
    }

    pub fn theme_prefix(&self) -> &str {
        &self.theme_prefix
    }

    pub fn rewriter(&self) -> &CssUrlRewriter {
        &self.rewriter
    }

    /// Register a new SSE client.
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let (tx, rx) = mpsc::channel(100);
        self.clients.write().insert(id, tx);

        (id, rx)
    }

    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Send `event` to every connected client, dropping the ones that left.
    pub async fn broadcast(&self, event: &DevEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize dev event: {e}");
                return;
            }
        };

        let clients = self.clients.read().clone();
        let mut failed_ids = Vec::new();
        for (id, tx) in clients {
            if tx.send(json.clone()).await.is_err() {
                failed_ids.push(id);
            }
        }

        for id in failed_ids {
            self.unregister_client(id);
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;
