//! Config discovery and layered loading.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use path_clean::PathClean;

use crate::config::{BridgeConfig, ConfigOverrides, ProjectConfig, ProjectPaths};
use crate::env_file::read_env_file;
use crate::error::{ConfigError, Result};
use crate::validation::validate;

/// Name of the settings file looked up in the bundler root.
pub const ENV_FILE_NAME: &str = ".env";

/// Prefix for process environment overrides (`THEMEBRIDGE_DEV_PORT=...`).
pub const ENV_PREFIX: &str = "THEMEBRIDGE_";

/// Loads configuration for a bundler root directory.
///
/// Layers, lowest priority first: field defaults, the `.env` file,
/// `THEMEBRIDGE_*` environment variables, then [`ConfigOverrides`].
///
/// # Example
///
/// ```no_run
/// use themebridge_config::ConfigLoader;
///
/// let config = ConfigLoader::new(".").load().unwrap();
/// println!("theme: {}", config.paths.theme_dir.display());
/// ```
pub struct ConfigLoader {
    root: PathBuf,
    overrides: ConfigOverrides,
    read_process_env: bool,
}

impl ConfigLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            overrides: ConfigOverrides::default(),
            read_process_env: true,
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Ignore `THEMEBRIDGE_*` variables. Used by tests that must not see the
    /// developer's shell environment.
    pub fn without_process_env(mut self) -> Self {
        self.read_process_env = false;
        self
    }

    /// Location of the env file for this root (whether or not it exists).
    pub fn env_file_path(&self) -> PathBuf {
        self.root.join(ENV_FILE_NAME)
    }

    /// Merge all layers into [`BridgeConfig`] without resolving paths.
    pub fn settings(&self) -> Result<BridgeConfig> {
        let mut figment = Figment::new();

        let env_file = self.env_file_path();
        if env_file.is_file() {
            let values = read_env_file(&env_file)?;
            tracing::debug!(path = %env_file.display(), keys = values.len(), "loaded env file");
            figment = figment.merge(Serialized::defaults(values));
        } else {
            tracing::debug!(path = %env_file.display(), "no env file, using defaults");
        }

        if self.read_process_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX));
        }

        figment = figment.merge(Serialized::defaults(&self.overrides));

        Ok(figment.extract()?)
    }

    /// Load, resolve and validate the configuration.
    pub fn load(&self) -> Result<ProjectConfig> {
        let settings = self.settings()?;
        let paths = self.resolve_paths(&settings)?;
        let config = ProjectConfig { settings, paths };
        validate(&config)?;
        Ok(config)
    }

    fn resolve_paths(&self, settings: &BridgeConfig) -> Result<ProjectPaths> {
        let bundler_root = absolutize(&self.root, &std::env::current_dir()?);

        let explicit_theme = settings
            .theme_path
            .as_ref()
            .map(|p| absolutize(p, &bundler_root));

        let wp_root = match &settings.wp_root {
            Some(root) => absolutize(root, &bundler_root),
            None => find_wp_root(&bundler_root)
                .or_else(|| explicit_theme.as_deref().and_then(find_wp_root))
                .ok_or_else(|| ConfigError::WpRootNotFound(bundler_root.clone()))?,
        };

        let theme_dir = match (&explicit_theme, &settings.theme_name) {
            (Some(path), _) => path.clone(),
            (None, Some(name)) => wp_root.join("wp-content").join("themes").join(name),
            (None, None) => {
                return Err(ConfigError::MissingField {
                    key: "THEME_NAME",
                    hint: Some("Add THEME_NAME=<theme folder> to .env".to_string()),
                });
            }
        };

        let theme_name = match &settings.theme_name {
            Some(name) => name.clone(),
            None => theme_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let env_file = self.env_file_path();
        let mu_plugins_dir = wp_root.join("wp-content").join("mu-plugins");

        Ok(ProjectPaths {
            env_file: env_file.is_file().then(|| absolutize(&env_file, &bundler_root)),
            bundler_root,
            wp_root,
            theme_dir,
            theme_name,
            mu_plugins_dir,
        })
    }
}

/// Walk up from `start` to the first directory containing `wp-content`.
pub fn find_wp_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("wp-content").is_dir())
        .map(Path::to_path_buf)
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf().clean()
    } else {
        base.join(path).clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn wp_fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("wp-content/themes/flavor")).unwrap();
        fs::create_dir_all(dir.path().join("bundler")).unwrap();
        dir
    }

    #[test]
    fn find_wp_root_walks_ancestors() {
        let dir = wp_fixture();
        let found = find_wp_root(&dir.path().join("bundler")).unwrap();
        assert_eq!(found, dir.path());
    }

    #[test]
    fn find_wp_root_returns_none_outside_install() {
        let dir = TempDir::new().unwrap();
        assert!(find_wp_root(dir.path()).is_none());
    }

    #[test]
    fn load_resolves_theme_from_name() {
        let dir = wp_fixture();
        let bundler = dir.path().join("bundler");
        fs::write(bundler.join(".env"), "THEME_NAME=flavor\n").unwrap();

        let config = ConfigLoader::new(&bundler)
            .without_process_env()
            .load()
            .unwrap();
        assert_eq!(config.paths.theme_name, "flavor");
        assert_eq!(
            config.paths.theme_dir,
            dir.path().join("wp-content/themes/flavor")
        );
        assert_eq!(
            config.paths.mu_plugins_dir,
            dir.path().join("wp-content/mu-plugins")
        );
        assert!(config.paths.env_file.is_some());
    }

    #[test]
    fn theme_name_falls_back_to_theme_path_folder() {
        let dir = wp_fixture();
        let bundler = dir.path().join("bundler");
        fs::write(
            bundler.join(".env"),
            "THEME_PATH=../wp-content/themes/flavor\n",
        )
        .unwrap();

        let config = ConfigLoader::new(&bundler)
            .without_process_env()
            .load()
            .unwrap();
        assert_eq!(config.paths.theme_name, "flavor");
    }

    #[test]
    fn missing_theme_name_is_reported() {
        let dir = wp_fixture();
        let err = ConfigLoader::new(dir.path().join("bundler"))
            .without_process_env()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { key: "THEME_NAME", .. }));
    }

    #[test]
    fn overrides_win_over_env_file() {
        let dir = wp_fixture();
        let bundler = dir.path().join("bundler");
        fs::write(bundler.join(".env"), "THEME_NAME=flavor\nDEV_PORT=3000\n").unwrap();

        let config = ConfigLoader::new(&bundler)
            .without_process_env()
            .with_overrides(ConfigOverrides {
                dev_port: Some(4000),
                ..ConfigOverrides::default()
            })
            .load()
            .unwrap();
        assert_eq!(config.settings.dev_port, 4000);
    }
}
