//! Terminal output: status lines and catalog listings.
//!
//! Everything goes to stderr so command output on stdout (entry graphs,
//! catalog JSON) stays machine readable.
//!
//! ```no_run
//! use themebridge_cli::ui;
//!
//! ui::init_colors();
//! ui::success("Shim installed");
//! ui::warning("style.css has no Version header");
//! ```

mod format;
mod messages;

pub use format::{catalog_groups, format_duration, print_catalog, print_entry_graph};
pub use messages::{debug, error, info, success, warning};

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise stderr must be a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Apply the color decision to terminal styling.
pub fn init_colors() {
    console::set_colors_enabled_stderr(should_use_color());
}
