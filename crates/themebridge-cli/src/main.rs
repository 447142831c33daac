//! themebridge CLI entry point.
//!
//! Parses arguments, initializes logging and colors, and dispatches to the
//! command implementations.

use clap::Parser;
use miette::Result;
use themebridge_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors();

    let result = match args.command {
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args).await,
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::Scan(scan_args) => commands::scan_execute(scan_args).await,
        cli::Command::Clean(clean_args) => commands::clean_execute(clean_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
