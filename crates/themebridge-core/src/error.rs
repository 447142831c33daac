//! Error types for the core crate.
//!
//! Catalog construction never fails from the caller's point of view; these
//! errors cover the operations that touch the host installation (writing and
//! removing the shim, rewriting `style.css`) and template rendering.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no configured PHP file was found in {}", .0.display())]
    NoPhpFiles(PathBuf),

    #[error("asset scan failed: {0}")]
    Scan(String),

    #[error("failed to render shim template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
