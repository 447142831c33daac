//! Dev command implementation.
//!
//! Session lifecycle:
//! - remove a shim left by a killed session
//! - scan the theme and bind the control server
//! - install the shim (only once the server answers the probe)
//! - watch theme PHP files and the `.env` file
//! - remove the shim on Ctrl+C, SIGTERM or server exit

use std::path::Path;
use std::sync::Arc;

use themebridge_config::{ConfigLoader, ProjectConfig};
use themebridge_core::{AssetCatalog, CatalogCache, ShimInstaller, generate_shim};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::mpsc;

use crate::cli::DevArgs;
use crate::commands::utils;
use crate::dev::{
    DevConfig, DevEvent, DevServer, DevServerState, FileChange, FileWatcher, SharedState, debounce,
};
use crate::error::{CliError, Result};
use crate::ui;

/// Mutable state of a running session, owned by the event loop.
struct Session {
    loader: ConfigLoader,
    project: ProjectConfig,
    control_url: String,
    cache: CatalogCache,
    installer: ShimInstaller,
    state: SharedState,
}

impl Session {
    /// Render the shim for the current catalog and write it.
    fn install_shim(&self, catalog: &AssetCatalog) -> Result<()> {
        let options = utils::shim_options(&self.project, self.control_url.clone());
        let shim = generate_shim(catalog, &options)?;
        let path = self.installer.install(&shim)?;
        tracing::debug!(path = %path.display(), "shim installed");
        Ok(())
    }

    /// Rescan and reinstall. Returns whether the catalog changed.
    fn refresh(&mut self) -> Result<bool> {
        let previous = self.state.catalog();
        self.cache.invalidate();
        let catalog = self.cache.get();
        self.install_shim(&catalog)?;
        let changed = *previous != *catalog;
        self.state.update_catalog(catalog);
        Ok(changed)
    }

    fn reload_config(&mut self) -> Result<()> {
        let project = self.loader.load()?;

        if project.paths.theme_dir != self.project.paths.theme_dir {
            ui::warning(&format!(
                "Theme changed to {}; restart the dev command to watch it",
                project.paths.theme_dir.display()
            ));
        }
        if project.paths.mu_plugins_dir != self.project.paths.mu_plugins_dir {
            self.installer.remove()?;
            self.installer = ShimInstaller::new(&project.paths.mu_plugins_dir);
        }

        self.cache.replace_builder(utils::catalog_builder(&project));
        self.project = project;
        Ok(())
    }

    fn is_env_file(&self, path: &Path) -> bool {
        self.project.paths.env_file.as_deref() == Some(path)
    }

    fn is_scanned(&self, path: &Path) -> bool {
        self.cache.builder().php_files().iter().any(|f| f == path)
    }

    async fn handle_changes(&mut self, changes: Vec<FileChange>) {
        let env_changed = changes.iter().any(|c| self.is_env_file(c.path()));
        let php_changed: Vec<&Path> = changes
            .iter()
            .map(FileChange::path)
            .filter(|p| !self.is_env_file(p))
            .collect();

        if env_changed {
            ui::info("Configuration changed, reloading");
            if let Err(e) = self.reload_config() {
                ui::error(&format!("Keeping previous configuration: {e}"));
                return;
            }
        }

        let rescan = env_changed || php_changed.iter().any(|p| self.is_scanned(p));
        if rescan {
            match self.refresh() {
                Ok(true) => {
                    let catalog = self.state.catalog();
                    ui::print_catalog(&catalog);
                    let sources = catalog.all_sources().len();
                    self.state
                        .broadcast(&DevEvent::CatalogUpdated { sources })
                        .await;
                    return;
                }
                Ok(false) => tracing::debug!("catalog unchanged"),
                Err(e) => ui::error(&format!("Failed to regenerate the shim: {e}")),
            }
        }

        if self.project.settings.watch_php
            && let Some(&path) = php_changed.first()
        {
            let shown = path
                .strip_prefix(&self.project.paths.theme_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            ui::info(&format!("Changed: {shown}"));
            self.state
                .broadcast(&DevEvent::FullReload { path: Some(shown) })
                .await;
        }
    }
}

/// Execute the dev command.
///
/// The shim is removed on every exit path, including errors after it was
/// installed; [`ShimInstaller`]'s `Drop` covers panics.
pub async fn execute(args: DevArgs) -> Result<()> {
    let loader = utils::loader(&args.config)?;
    let project = loader.load()?;

    let installer = ShimInstaller::new(&project.paths.mu_plugins_dir);
    installer.remove_orphan()?;

    let dev = DevConfig::new(project.clone())?;
    let mut cache = CatalogCache::new(utils::catalog_builder(&project));
    let catalog = cache.get();

    ui::info(&format!("Theme: {}", project.paths.theme_dir.display()));
    ui::print_catalog(&catalog);

    let state = Arc::new(DevServerState::new(
        project.paths.theme_dir.clone(),
        &dev.server_url(),
        &utils::theme_prefix(&project),
        Arc::clone(&catalog),
    ));

    let listener = TcpListener::bind(dev.addr)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind to {}: {e}", dev.addr)))?;
    let server = DevServer::new(Arc::clone(&state));
    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve_on(listener).await {
            ui::error(&format!("Server error: {e}"));
        }
    });

    let mut session = Session {
        loader,
        project,
        control_url: dev.control_url(),
        cache,
        installer,
        state,
    };
    session.install_shim(&catalog)?;

    let (_watcher, mut changes) = if args.no_watch {
        (None, None)
    } else {
        let (watcher, rx) = FileWatcher::new(
            session.project.paths.theme_dir.clone(),
            session.project.paths.env_file.clone(),
            dev.watch_ignore.clone(),
        )?;
        (Some(watcher), Some(rx))
    };

    ui::success(&format!("Dev mode active for {}", session.project.settings.site_url));
    ui::info(&format!("Control server: {}", dev.server_url()));
    ui::info(&format!("Bundler dev server: {}", session.project.settings.dev_server_url()));
    ui::info("Press Ctrl+C to stop");

    loop {
        tokio::select! {
            Some(first) = next_change(&mut changes) => {
                let batch = match changes.as_mut() {
                    Some(rx) => debounce(first, rx, dev.debounce).await,
                    None => vec![first],
                };
                session.handle_changes(batch).await;
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down...");
                break;
            }

            _ = terminate() => {
                ui::info("Terminated, shutting down...");
                break;
            }

            _ = &mut server_handle => {
                ui::warning("Control server stopped unexpectedly");
                break;
            }
        }
    }

    server_handle.abort();
    if session.installer.remove()? {
        ui::success("Dev-mode shim removed");
    }
    Ok(())
}

async fn next_change(rx: &mut Option<mpsc::Receiver<FileChange>>) -> Option<FileChange> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!("cannot listen for SIGTERM: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
