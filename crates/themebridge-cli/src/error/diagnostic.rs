//! Miette report conversion for CLI errors.

use miette::Report;

use crate::error::CliError;

/// Convert a [`CliError`] into a report, carrying configuration hints as help.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => match e.hint() {
            Some(hint) => miette::miette!(help = hint.to_string(), "Configuration error: {}", e),
            None => miette::miette!("Configuration error: {}", e),
        },
        CliError::FileNotFound(path) => miette::miette!(
            help = "Run the command from the bundler directory or pass --cwd",
            "File not found: {}",
            path.display()
        ),
        _ => miette::miette!("{}", err),
    }
}
