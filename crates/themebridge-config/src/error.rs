//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("theme directory not found: {}", .0.display())]
    ThemeNotFound(PathBuf),

    #[error("could not locate the WordPress root from {}", .0.display())]
    WpRootNotFound(PathBuf),

    #[error("missing required setting {key}")]
    MissingField {
        key: &'static str,
        hint: Option<String>,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        key: String,
        value: String,
        hint: Option<String>,
    },

    #[error("malformed line {line} in {}: {content}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("failed to merge configuration layers: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Actionable hint to print under the error, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { hint, .. } | ConfigError::InvalidValue { hint, .. } => {
                hint.as_deref()
            }
            ConfigError::ThemeNotFound(_) => Some("Check THEME_NAME or THEME_PATH in .env"),
            ConfigError::WpRootNotFound(_) => Some("Set WP_ROOT in .env"),
            _ => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Extract(Box::new(err))
    }
}
