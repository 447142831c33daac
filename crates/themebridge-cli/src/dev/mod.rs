//! Dev session plumbing.
//!
//! - control server: ping probe for the shim, SSE reload stream, client
//!   scripts, catalog JSON and static theme files
//! - shared state: connected clients and the current catalog
//! - watcher: theme PHP files and the `.env` file

pub mod config;
pub mod server;
pub mod state;
pub mod static_files;
pub mod watcher;

pub use config::DevConfig;
pub use server::DevServer;
pub use state::{ClientRegistry, DevServerState, SharedState};
pub use watcher::{FileChange, FileWatcher, debounce};

use serde::{Deserialize, Serialize};

/// Messages pushed to browsers over the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DevEvent {
    /// Reload the page; `path` names the file that triggered it
    FullReload { path: Option<String> },

    /// The catalog was rebuilt and the shim reinstalled
    CatalogUpdated { sources: usize },

    /// A browser subscribed to the event stream
    ClientConnected { id: usize },
}
