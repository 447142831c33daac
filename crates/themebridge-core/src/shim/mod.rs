//! Dev-mode mu-plugin generation and installation.
//!
//! The shim is a self-contained PHP file dropped into `wp-content/mu-plugins`.
//! While the dev server answers its ping it strips the production tags of
//! every cataloged source and injects the dev server's module URLs instead.
//! When the ping fails it deletes itself.

mod installer;
pub mod php;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use minijinja::{Environment, context};
use serde::Serialize;

use crate::catalog::{AssetCatalog, AssetPath};
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::normalize::PathNormalizer;

pub use installer::{SHIM_FILE_NAME, ShimInstaller};

/// Path prefix under which the control server exposes its endpoints.
pub const CONTROL_PREFIX: &str = "/__themebridge__";

const TEMPLATE_NAME: &str = "dev-mode.php";
const TEMPLATE: &str = include_str!("dev-mode.php.jinja");

/// Everything the shim needs beyond the catalog.
#[derive(Debug, Clone)]
pub struct ShimOptions {
    /// Theme directory name, compared against `get_stylesheet()`/`get_template()`.
    pub theme_name: String,
    pub theme_dir: PathBuf,
    /// Bundler dev server origin, e.g. `http://localhost:5173`.
    pub dev_server_url: String,
    /// Path of the bundler's HMR client below the dev server origin.
    pub dev_client_path: String,
    /// Prefix the bundler uses to serve absolute filesystem paths.
    pub dev_fs_prefix: String,
    /// Control server base, including [`CONTROL_PREFIX`].
    pub control_url: String,
    pub reload_client: bool,
    pub body_reset: bool,
    /// Distinguishes this install's cached ping result from any earlier
    /// shim's, so a stale negative result cannot delete a fresh install.
    pub session_token: String,
}

impl ShimOptions {
    pub fn new(theme_name: impl Into<String>, theme_dir: impl Into<PathBuf>) -> Self {
        Self {
            theme_name: theme_name.into(),
            theme_dir: theme_dir.into(),
            dev_server_url: "http://localhost:5173".to_string(),
            dev_client_path: "/@vite/client".to_string(),
            dev_fs_prefix: "/@fs/".to_string(),
            control_url: format!("http://localhost:5174{CONTROL_PREFIX}"),
            reload_client: true,
            body_reset: false,
            session_token: session_token(),
        }
    }

    /// Transient name the shim caches its ping result under.
    pub fn alive_key(&self) -> String {
        format!("themebridge_alive_{}", self.session_token)
    }

    /// Dev server URL of a theme source file.
    pub fn dev_url_for(&self, source: &AssetPath) -> String {
        let absolute = fs_url_path(&self.theme_dir.join(source.as_str()));
        format!(
            "{}/{}{}",
            self.dev_server_url.trim_end_matches('/'),
            self.dev_fs_prefix.trim_start_matches('/'),
            absolute.trim_start_matches('/')
        )
    }
}

/// Token unique per call within a process and across processes.
fn session_token() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}{:x}{seq:x}", nanos, std::process::id())
}

fn fs_url_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[derive(Debug, Serialize)]
struct ShimAsset<'a> {
    source: &'a str,
    build: String,
    #[serde(rename = "type")]
    kind: &'static str,
    url: String,
}

#[derive(Debug, Serialize)]
struct ShimGroup<'a> {
    name: &'static str,
    assets: Vec<ShimAsset<'a>>,
}

/// Render the mu-plugin source for `catalog`. Libraries are left to their
/// production tags. Sources listed under Both are not repeated in the
/// Front and Admin groups, since both of those also load the Both group.
pub fn generate_shim(catalog: &AssetCatalog, options: &ShimOptions) -> Result<String> {
    let normalizer =
        PathNormalizer::new(&options.theme_dir).with_build_folder(catalog.build_folder.as_str());

    let contexts: Vec<ShimGroup<'_>> = ExecutionContext::ALL
        .iter()
        .map(|context| ShimGroup {
            name: context.as_str(),
            assets: catalog
                .entry(*context)
                .sources
                .iter()
                .filter(|source| {
                    *context == ExecutionContext::Both || !catalog.both.sources.contains(*source)
                })
                .map(|source| ShimAsset {
                    source: source.as_str(),
                    build: normalizer.to_build_path(source),
                    kind: source.kind().as_str(),
                    url: options.dev_url_for(source),
                })
                .collect(),
        })
        .collect();

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("php", php::php_filter);
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;

    let rendered = env.get_template(TEMPLATE_NAME)?.render(context! {
        version => env!("CARGO_PKG_VERSION"),
        theme_name => options.theme_name,
        dev_url => options.dev_server_url.trim_end_matches('/'),
        client_path => options.dev_client_path,
        control_url => options.control_url.trim_end_matches('/'),
        alive_key => options.alive_key(),
        build_folder => normalizer.build_folder(),
        reload_client => options.reload_client,
        body_reset => options.body_reset,
        contexts => contexts,
    })?;

    tracing::debug!(bytes = rendered.len(), "rendered dev-mode shim");
    Ok(rendered)
}
