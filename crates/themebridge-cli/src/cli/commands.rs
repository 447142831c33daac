use std::path::PathBuf;

use clap::{Args, Subcommand};
use themebridge_config::ConfigOverrides;

/// Available themebridge subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install the dev-mode shim and serve until interrupted
    ///
    /// Scans the theme, writes the mu-plugin, starts the control server and
    /// watches PHP files and the .env file. The shim is removed on exit.
    Dev(DevArgs),

    /// Write the bundler entry graph as JSON
    ///
    /// Entries map a flat name to the absolute path of each authored source.
    Build(BuildArgs),

    /// Print the asset catalog
    Scan(ScanArgs),

    /// Remove an installed dev-mode shim
    Clean(CleanArgs),
}

/// Settings shared by every command. Each flag overrides `.env` and the
/// environment.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Directory holding the .env file (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Theme directory name (THEME_NAME)
    #[arg(long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Theme directory (THEME_PATH)
    #[arg(long, value_name = "DIR")]
    pub theme_path: Option<PathBuf>,

    /// Bundler dev server port (DEV_PORT)
    #[arg(long, value_name = "PORT")]
    pub dev_port: Option<u16>,

    /// Control server port (CONTROL_PORT)
    #[arg(long, value_name = "PORT")]
    pub control_port: Option<u16>,

    /// Build output folder (BUILD_FOLDER)
    #[arg(long, value_name = "DIR")]
    pub build_folder: Option<String>,
}

impl ConfigArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            theme_name: self.theme.clone(),
            theme_path: self.theme_path.clone(),
            dev_port: self.dev_port,
            control_port: self.control_port,
            build_folder: self.build_folder.clone(),
        }
    }
}

/// Arguments for the dev command
#[derive(Args, Debug, Clone, Default)]
pub struct DevArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Do not watch files; serve the shim for the initial catalog only
    #[arg(long)]
    pub no_watch: bool,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Write the entry graph to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Arguments for the scan command
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the catalog as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the clean command
#[derive(Args, Debug, Clone, Default)]
pub struct CleanArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}
