//! Error handling for the themebridge CLI.
//!
//! [`CliError`] wraps the configuration and core errors and adds the
//! failures only the CLI can hit (server, watcher, arguments). Commands
//! return [`Result`]; `main` turns errors into miette reports.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use themebridge_cli::error::{Result, ResultExt};
//!
//! fn read_style(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Is THEME_PATH pointing at the theme?")
//! }
//! ```

mod diagnostic;

use std::path::PathBuf;

use thiserror::Error;

pub use diagnostic::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or validating `.env` settings failed
    #[error("Configuration error: {0}")]
    Config(#[from] themebridge_config::ConfigError),

    /// Shim rendering, installation or theme file updates failed
    #[error("{0}")]
    Core(#[from] themebridge_core::CoreError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Control server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Adds context to fallible results.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint line to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{err}\n\nHint: {hint}"))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use themebridge_config::ConfigError;

    #[test]
    fn config_errors_convert() {
        let err: CliError = ConfigError::ThemeNotFound(PathBuf::from("/srv/themes/x")).into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("/srv/themes/x"));
    }

    #[test]
    fn core_errors_keep_their_message() {
        let err: CliError = themebridge_core::CoreError::Scan("broken".to_string()).into();
        assert_eq!(err.to_string(), "asset scan failed: broken");
    }

    #[test]
    fn with_path_maps_not_found() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result.with_path("/srv/themes/x/style.css").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn with_hint_appends() {
        let result: Result<()> = Err(CliError::InvalidArgument("--out".to_string()));
        let msg = result.with_hint("Pass a file path").unwrap_err().to_string();
        assert!(msg.contains("Invalid argument: --out"));
        assert!(msg.contains("Hint: Pass a file path"));
    }

    #[test]
    fn context_prefixes() {
        let result: Result<()> = Err(CliError::Server("bind failed".to_string()));
        let msg = result.context("Starting control server").unwrap_err().to_string();
        assert_eq!(msg, "Starting control server: Server error: bind failed");
    }
}
