//! Shared helpers for command implementations.

use std::path::{Path, PathBuf};

use themebridge_config::{ConfigLoader, ProjectConfig};
use themebridge_core::{CatalogBuilder, ShimOptions};

use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};

/// Directory holding the `.env` file: `--cwd` or the process directory.
pub fn resolve_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    Ok(match cwd {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => current.join(dir),
        None => current,
    })
}

pub fn loader(args: &ConfigArgs) -> Result<ConfigLoader> {
    let root = resolve_root(args.cwd.as_deref())?;
    if !root.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Working directory does not exist: {}",
            root.display()
        )));
    }
    Ok(ConfigLoader::new(root).with_overrides(args.overrides()))
}

/// Load and validate the project configuration for a command.
pub fn load_config(args: &ConfigArgs) -> Result<ProjectConfig> {
    let config = loader(args)?.load()?;
    tracing::debug!(
        theme = %config.paths.theme_dir.display(),
        wp_root = %config.paths.wp_root.display(),
        "configuration loaded"
    );
    Ok(config)
}

pub fn catalog_builder(config: &ProjectConfig) -> CatalogBuilder {
    CatalogBuilder::new(&config.paths.theme_dir, &config.settings.php_files)
        .with_build_folder(config.settings.build_folder.clone())
}

/// Theme URL path below the site root, e.g. `wp-content/themes/flavor`.
pub fn theme_prefix(config: &ProjectConfig) -> String {
    let relative = config
        .paths
        .theme_dir
        .strip_prefix(&config.paths.wp_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| {
            PathBuf::from("wp-content/themes").join(&config.paths.theme_name)
        });
    relative.to_string_lossy().replace('\\', "/")
}

pub fn shim_options(config: &ProjectConfig, control_url: String) -> ShimOptions {
    let settings = &config.settings;
    ShimOptions {
        dev_server_url: settings.dev_server_url(),
        dev_client_path: settings.dev_client_path.clone(),
        dev_fs_prefix: settings.dev_fs_prefix.clone(),
        control_url,
        reload_client: settings.watch_php,
        body_reset: settings.hmr_body_reset,
        ..ShimOptions::new(&config.paths.theme_name, &config.paths.theme_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use themebridge_config::{BridgeConfig, ProjectPaths};

    fn project(theme_dir: &str) -> ProjectConfig {
        ProjectConfig {
            settings: BridgeConfig {
                watch_php: true,
                ..BridgeConfig::default()
            },
            paths: ProjectPaths {
                bundler_root: PathBuf::from("/srv/app"),
                env_file: None,
                wp_root: PathBuf::from("/srv/wp"),
                theme_dir: PathBuf::from(theme_dir),
                theme_name: "flavor".to_string(),
                mu_plugins_dir: PathBuf::from("/srv/wp/wp-content/mu-plugins"),
            },
        }
    }

    #[test]
    fn theme_prefix_is_relative_to_wp_root() {
        let config = project("/srv/wp/wp-content/themes/flavor");
        assert_eq!(theme_prefix(&config), "wp-content/themes/flavor");
    }

    #[test]
    fn theme_prefix_falls_back_for_themes_outside_wp_root() {
        let config = project("/home/dev/flavor");
        assert_eq!(theme_prefix(&config), "wp-content/themes/flavor");
    }

    #[test]
    fn shim_options_follow_settings() {
        let mut config = project("/srv/wp/wp-content/themes/flavor");
        let control = "http://localhost:5174/__themebridge__".to_string();

        let options = shim_options(&config, control.clone());
        assert_eq!(options.theme_name, "flavor");
        assert_eq!(options.control_url, control);
        assert!(options.reload_client);
        assert!(options.body_reset);
        assert_eq!(options.dev_server_url, config.settings.dev_server_url());

        config.settings.watch_php = false;
        config.settings.hmr_body_reset = false;
        let options = shim_options(&config, control);
        assert!(!options.reload_client);
        assert!(!options.body_reset);
    }

    #[test]
    fn resolve_root_joins_relative_dirs() {
        let current = std::env::current_dir().unwrap();
        assert_eq!(resolve_root(None).unwrap(), current);
        assert_eq!(resolve_root(Some(Path::new("app"))).unwrap(), current.join("app"));
    }
}
