//! File watching for the dev loop.
//!
//! Watches the theme recursively for PHP edits and the bundler's `.env`
//! file non-recursively. Everything else is dropped before it reaches the
//! channel.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::Result;

/// A relevant change on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            Self::Modified(p) | Self::Created(p) | Self::Removed(p) => p,
        }
    }
}

pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

struct WatchFilter {
    theme_dir: PathBuf,
    env_file: Option<PathBuf>,
    ignore: Vec<String>,
}

impl WatchFilter {
    /// Hidden directories and configured names anywhere below the theme.
    fn should_ignore(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.theme_dir).unwrap_or(path);
        relative.components().any(|component| match component {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                (name.starts_with('.') && name.len() > 1)
                    || self.ignore.iter().any(|ignored| *ignored == name)
            }
            _ => false,
        })
    }

    fn is_relevant(&self, path: &Path) -> bool {
        if self.env_file.as_deref() == Some(path) {
            return true;
        }
        path.starts_with(&self.theme_dir)
            && path.extension().is_some_and(|ext| ext == "php")
            && !self.should_ignore(path)
    }

    fn changes(&self, event: Event) -> Vec<FileChange> {
        let wrap: fn(PathBuf) -> FileChange = match event.kind {
            EventKind::Create(_) => FileChange::Created,
            EventKind::Modify(_) => FileChange::Modified,
            EventKind::Remove(_) => FileChange::Removed,
            _ => return Vec::new(),
        };
        event
            .paths
            .into_iter()
            .filter(|path| self.is_relevant(path))
            .map(wrap)
            .collect()
    }
}

impl FileWatcher {
    /// Start watching. The watcher stops when the returned value is dropped.
    pub fn new(
        theme_dir: PathBuf,
        env_file: Option<PathBuf>,
        ignore: Vec<String>,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let (tx, rx) = mpsc::channel(100);
        let filter = WatchFilter {
            theme_dir: theme_dir.clone(),
            env_file: env_file.clone(),
            ignore,
        };

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for change in filter.changes(event) {
                        if tx.blocking_send(change).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => tracing::warn!("watch error: {e}"),
            })?;

        watcher.watch(&theme_dir, RecursiveMode::Recursive)?;
        if let Some(parent) = env_file.as_deref().and_then(Path::parent) {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        tracing::debug!(theme = %theme_dir.display(), "watching for changes");
        Ok((Self { _watcher: watcher }, rx))
    }
}

/// Collect `first` plus everything that arrives until `window` passes with
/// no new change. Duplicate paths are folded, keeping the latest kind.
pub async fn debounce(
    first: FileChange,
    rx: &mut mpsc::Receiver<FileChange>,
    window: Duration,
) -> Vec<FileChange> {
    let mut changes = vec![first];
    while let Ok(Some(change)) = tokio::time::timeout(window, rx.recv()).await {
        changes.retain(|existing| existing.path() != change.path());
        changes.push(change);
    }
    changes
}
