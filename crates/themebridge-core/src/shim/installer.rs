use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{CoreError, Result};

/// File name of the installed mu-plugin.
pub const SHIM_FILE_NAME: &str = "themebridge-dev-mode.php";

const GITIGNORE: &str = ".gitignore";

/// Owns the shim file inside a mu-plugins directory.
///
/// Removal is idempotent and also runs on drop, so every exit path of the dev
/// session leaves the installation clean.
#[derive(Debug)]
pub struct ShimInstaller {
    dir: PathBuf,
    removed: AtomicBool,
}

impl ShimInstaller {
    pub fn new(mu_plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: mu_plugins_dir.into(),
            removed: AtomicBool::new(true),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn shim_path(&self) -> PathBuf {
        self.dir.join(SHIM_FILE_NAME)
    }

    pub fn is_installed(&self) -> bool {
        self.shim_path().is_file()
    }

    /// Delete a shim left behind by a session that did not shut down, along
    /// with its ignore file and directory when nothing else uses them.
    pub fn remove_orphan(&self) -> Result<bool> {
        let removed = self.cleanup()?;
        if removed {
            tracing::warn!(path = %self.shim_path().display(), "removed stale dev-mode shim");
        }
        Ok(removed)
    }

    /// Write the shim atomically and keep it out of version control.
    pub fn install(&self, contents: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| CoreError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.shim_path();
        let staging = self.dir.join(format!(".{SHIM_FILE_NAME}.tmp"));
        fs::write(&staging, contents).map_err(|source| CoreError::Write {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| CoreError::Write {
            path: path.clone(),
            source,
        })?;

        self.ensure_ignored()?;
        self.removed.store(false, Ordering::SeqCst);
        tracing::debug!(path = %path.display(), "installed dev-mode shim");
        Ok(path)
    }

    /// Remove the shim and whatever [`install`](Self::install) created around
    /// it. Only the first call after an install does any work.
    pub fn remove(&self) -> Result<bool> {
        if self.removed.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        let removed = self.cleanup()?;
        tracing::debug!(removed, "removed dev-mode shim");
        Ok(removed)
    }

    fn cleanup(&self) -> Result<bool> {
        let removed = remove_file_if_exists(&self.shim_path())?;

        let gitignore = self.dir.join(GITIGNORE);
        if let Ok(content) = fs::read_to_string(&gitignore) {
            let only_ours = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .all(|line| line == SHIM_FILE_NAME);
            if only_ours {
                remove_file_if_exists(&gitignore)?;
            }
        }

        // Leave the directory if anything else lives there.
        if fs::read_dir(&self.dir).is_ok_and(|mut entries| entries.next().is_none()) {
            let _ = fs::remove_dir(&self.dir);
        }

        Ok(removed)
    }

    fn ensure_ignored(&self) -> Result<()> {
        let path = self.dir.join(GITIGNORE);
        let existing = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        if existing.lines().any(|line| line.trim() == SHIM_FILE_NAME) {
            return Ok(());
        }

        let mut updated = existing;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(SHIM_FILE_NAME);
        updated.push('\n');
        fs::write(&path, updated).map_err(|source| CoreError::Write { path, source })
    }
}

impl Drop for ShimInstaller {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            tracing::warn!("failed to remove dev-mode shim: {e}");
        }
    }
}

fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CoreError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn install_then_remove_leaves_nothing() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mu-plugins");
        let installer = ShimInstaller::new(&dir);

        let path = installer.install("<?php\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<?php\n");
        assert_eq!(
            fs::read_to_string(dir.join(GITIGNORE)).unwrap(),
            format!("{SHIM_FILE_NAME}\n")
        );

        assert!(installer.remove().unwrap());
        assert!(!dir.exists());
        assert!(!installer.remove().unwrap());
    }

    #[test]
    fn foreign_files_survive_removal() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mu-plugins");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("other.php"), "<?php\n").unwrap();
        fs::write(dir.join(GITIGNORE), "other-cache/").unwrap();

        let installer = ShimInstaller::new(&dir);
        installer.install("<?php\n").unwrap();
        assert_eq!(
            fs::read_to_string(dir.join(GITIGNORE)).unwrap(),
            format!("other-cache/\n{SHIM_FILE_NAME}\n")
        );

        installer.remove().unwrap();
        assert!(dir.join("other.php").is_file());
        assert!(dir.join(GITIGNORE).is_file());
        assert!(!installer.shim_path().exists());
    }

    #[test]
    fn drop_removes_the_shim() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mu-plugins");
        {
            let installer = ShimInstaller::new(&dir);
            installer.install("<?php\n").unwrap();
            assert!(installer.is_installed());
        }
        assert!(!dir.join(SHIM_FILE_NAME).exists());
    }

    #[test]
    fn orphans_are_cleaned_before_install() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mu-plugins");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SHIM_FILE_NAME), "<?php // stale\n").unwrap();
        fs::write(dir.join(GITIGNORE), format!("{SHIM_FILE_NAME}\n")).unwrap();

        let installer = ShimInstaller::new(&dir);
        assert!(installer.remove_orphan().unwrap());
        assert!(!dir.exists());
        assert!(!installer.remove_orphan().unwrap());
    }
}
