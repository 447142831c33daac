//! Logging setup for the themebridge CLI.
//!
//! - `--verbose` turns on debug output for the themebridge crates
//! - `--quiet` keeps errors only
//! - otherwise `RUST_LOG` applies, falling back to info
//!
//! # Example
//!
//! ```rust,no_run
//! use themebridge_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("scanning theme");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str =
    "themebridge=debug,themebridge_cli=debug,themebridge_core=debug,themebridge_config=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str =
    "themebridge=info,themebridge_cli=info,themebridge_core=info,themebridge_config=info";

/// Install the global tracing subscriber. Call once, before any logging.
///
/// `verbose` wins over `quiet`.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Install the global subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Whether colored output should be used.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
