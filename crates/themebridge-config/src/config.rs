//! Configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::de;

/// Settings read from the `.env` file and environment.
///
/// Field names are the lowercased `.env` keys (`DEV_PORT` → `dev_port`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// WordPress installation root (`WP_ROOT`).
    #[serde(default)]
    pub wp_root: Option<PathBuf>,

    /// Target theme identifier (`THEME_NAME`).
    #[serde(default, deserialize_with = "de::flexible_opt_string")]
    pub theme_name: Option<String>,

    /// Explicit theme directory (`THEME_PATH`).
    #[serde(default)]
    pub theme_path: Option<PathBuf>,

    #[serde(default = "default_dev_protocol", deserialize_with = "de::flexible_string")]
    pub dev_protocol: String,

    #[serde(default = "default_dev_host", deserialize_with = "de::flexible_string")]
    pub dev_host: String,

    #[serde(default = "default_dev_port", deserialize_with = "de::flexible_port")]
    pub dev_port: u16,

    /// Path of the bundler's HMR client script.
    #[serde(default = "default_dev_client_path", deserialize_with = "de::flexible_string")]
    pub dev_client_path: String,

    /// URL prefix the bundler uses to serve absolute file paths.
    #[serde(default = "default_dev_fs_prefix", deserialize_with = "de::flexible_string")]
    pub dev_fs_prefix: String,

    /// Port of the themebridge control server.
    #[serde(default = "default_control_port", deserialize_with = "de::flexible_port")]
    pub control_port: u16,

    /// PHP files to scan, relative to the theme directory.
    #[serde(default = "default_php_files", deserialize_with = "de::comma_list")]
    pub php_files: Vec<String>,

    #[serde(default, deserialize_with = "de::flexible_opt_string")]
    pub build_folder: Option<String>,

    #[serde(default = "default_true", deserialize_with = "de::flexible_bool")]
    pub hmr_body_reset: bool,

    #[serde(default = "default_true", deserialize_with = "de::flexible_bool")]
    pub watch_php: bool,

    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub auto_increment_version: bool,

    #[serde(default = "default_site_url", deserialize_with = "de::flexible_string")]
    pub site_url: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            wp_root: None,
            theme_name: None,
            theme_path: None,
            dev_protocol: default_dev_protocol(),
            dev_host: default_dev_host(),
            dev_port: default_dev_port(),
            dev_client_path: default_dev_client_path(),
            dev_fs_prefix: default_dev_fs_prefix(),
            control_port: default_control_port(),
            php_files: default_php_files(),
            build_folder: None,
            hmr_body_reset: true,
            watch_php: true,
            auto_increment_version: false,
            site_url: default_site_url(),
        }
    }
}

impl BridgeConfig {
    /// Base URL of the external bundler dev server.
    pub fn dev_server_url(&self) -> String {
        format!("{}://{}:{}", self.dev_protocol, self.dev_host, self.dev_port)
    }

    /// Base URL of the control server on the given port.
    pub fn control_url(&self, port: u16) -> String {
        format!("http://{}:{}", self.dev_host, port)
    }
}

fn default_dev_protocol() -> String {
    "http".to_string()
}

fn default_dev_host() -> String {
    "localhost".to_string()
}

fn default_dev_port() -> u16 {
    5173
}

fn default_dev_client_path() -> String {
    "/@vite/client".to_string()
}

fn default_dev_fs_prefix() -> String {
    "/@fs/".to_string()
}

fn default_control_port() -> u16 {
    5174
}

fn default_php_files() -> Vec<String> {
    vec!["functions.php".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}

/// Values supplied on the command line. `None` leaves lower layers untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_folder: Option<String>,
}

/// Filesystem locations derived from the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// Directory holding the `.env` file.
    pub bundler_root: PathBuf,
    /// The `.env` file, when one was found.
    pub env_file: Option<PathBuf>,
    pub wp_root: PathBuf,
    pub theme_dir: PathBuf,
    /// Resolved theme identifier.
    pub theme_name: String,
    /// `wp-content/mu-plugins` of the installation.
    pub mu_plugins_dir: PathBuf,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub settings: BridgeConfig,
    pub paths: ProjectPaths,
}

impl ProjectConfig {
    /// Absolute paths of the PHP files to scan.
    pub fn php_file_paths(&self) -> Vec<PathBuf> {
        self.settings
            .php_files
            .iter()
            .map(|f| self.paths.theme_dir.join(f))
            .collect()
    }
}
