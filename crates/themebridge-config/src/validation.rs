//! Post-load validation.

use crate::config::ProjectConfig;
use crate::error::{ConfigError, Result};

/// Check that a resolved configuration is usable.
pub fn validate(config: &ProjectConfig) -> Result<()> {
    let settings = &config.settings;

    if !config.paths.theme_dir.is_dir() {
        return Err(ConfigError::ThemeNotFound(config.paths.theme_dir.clone()));
    }

    if settings.php_files.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "PHP_FILES".to_string(),
            value: String::new(),
            hint: Some("List at least one PHP file, e.g. PHP_FILES=functions.php".to_string()),
        });
    }

    for (key, port) in [
        ("DEV_PORT", settings.dev_port),
        ("CONTROL_PORT", settings.control_port),
    ] {
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: port.to_string(),
                hint: Some("Use a port between 1 and 65535".to_string()),
            });
        }
    }

    if settings.dev_port == settings.control_port {
        return Err(ConfigError::InvalidValue {
            key: "CONTROL_PORT".to_string(),
            value: settings.control_port.to_string(),
            hint: Some("CONTROL_PORT must differ from DEV_PORT".to_string()),
        });
    }

    if let Some(folder) = &settings.build_folder
        && (folder.contains("..") || folder.starts_with('/'))
    {
        return Err(ConfigError::InvalidValue {
            key: "BUILD_FOLDER".to_string(),
            value: folder.clone(),
            hint: Some("BUILD_FOLDER is a folder name inside the theme".to_string()),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BridgeConfig, ProjectPaths};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config_for(theme_dir: PathBuf, settings: BridgeConfig) -> ProjectConfig {
        ProjectConfig {
            settings,
            paths: ProjectPaths {
                bundler_root: PathBuf::from("/tmp"),
                env_file: None,
                wp_root: PathBuf::from("/tmp"),
                theme_dir,
                theme_name: "flavor".to_string(),
                mu_plugins_dir: PathBuf::from("/tmp/wp-content/mu-plugins"),
            },
        }
    }

    #[test]
    fn accepts_defaults_with_existing_theme() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path().to_path_buf(), BridgeConfig::default());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn rejects_missing_theme_dir() {
        let config = config_for(PathBuf::from("/definitely/not/here"), BridgeConfig::default());
        assert!(matches!(validate(&config), Err(ConfigError::ThemeNotFound(_))));
    }

    #[test]
    fn rejects_same_dev_and_control_port() {
        let dir = TempDir::new().unwrap();
        let settings = BridgeConfig {
            dev_port: 5173,
            control_port: 5173,
            ..BridgeConfig::default()
        };
        let err = validate(&config_for(dir.path().to_path_buf(), settings)).unwrap_err();
        assert!(err.to_string().contains("CONTROL_PORT"));
    }

    #[test]
    fn rejects_build_folder_escaping_theme() {
        let dir = TempDir::new().unwrap();
        let settings = BridgeConfig {
            build_folder: Some("../dist".to_string()),
            ..BridgeConfig::default()
        };
        assert!(validate(&config_for(dir.path().to_path_buf(), settings)).is_err());
    }
}
