//! Command-line interface definition.
//!
//! - `themebridge dev` - install the dev-mode shim, serve and watch
//! - `themebridge build` - emit the bundler entry graph
//! - `themebridge scan` - print the asset catalog
//! - `themebridge clean` - remove an installed shim

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, CleanArgs, Command, ConfigArgs, DevArgs, ScanArgs};

/// themebridge - run a WordPress theme against a bundler dev server
#[derive(Parser, Debug)]
#[command(
    name = "themebridge",
    version,
    about = "Bridge a WordPress theme to a bundler dev server",
    long_about = "themebridge scans a theme's PHP for script and style registrations,\n\
                  feeds the sources to the bundler as entries, and installs a dev-mode\n\
                  mu-plugin that swaps the production tags for dev server URLs."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
