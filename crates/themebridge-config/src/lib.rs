//! Configuration for themebridge.
//!
//! Settings live in a `.env`-style file next to the bundler. They are layered
//! with `THEMEBRIDGE_`-prefixed environment variables and CLI overrides, then
//! resolved against the host installation to produce [`ProjectConfig`].

pub mod config;
pub mod de;
pub mod discovery;
pub mod env_file;
pub mod error;
pub mod validation;

pub use config::{BridgeConfig, ConfigOverrides, ProjectConfig, ProjectPaths};
pub use discovery::{ConfigLoader, ENV_FILE_NAME, ENV_PREFIX};
pub use error::{ConfigError, Result};
pub use validation::validate;
