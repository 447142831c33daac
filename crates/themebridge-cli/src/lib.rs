//! themebridge CLI - runs a WordPress theme against a bundler dev server.
//!
//! The CLI glues the configuration and core crates to the outside world:
//!
//! - [`error`] - error types and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and catalog output
//! - `commands` - `dev`, `build`, `scan` and `clean`
//! - `dev` - control server, watcher and live-reload state
//!
//! # Example
//!
//! ```rust,no_run
//! use themebridge_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt, cli_error_to_miette};
