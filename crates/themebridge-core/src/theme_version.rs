//! Theme `style.css` version bump.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CoreError, Result};

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version:\s*(\d+)\.(\d+)").expect("version pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBump {
    pub from: String,
    pub to: String,
}

/// Increment the minor part of the first `Version: X.Y` header.
pub fn bump_minor(content: &str) -> Option<(String, VersionBump)> {
    let caps = VERSION.captures(content)?;
    let whole = caps.get(0)?;
    let major: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minor: u64 = caps.get(2)?.as_str().parse().ok()?;

    let bump = VersionBump {
        from: format!("{major}.{minor}"),
        to: format!("{major}.{}", minor + 1),
    };
    let mut updated = String::with_capacity(content.len() + 1);
    updated.push_str(&content[..whole.start()]);
    updated.push_str("Version: ");
    updated.push_str(&bump.to);
    updated.push_str(&content[whole.end()..]);
    Some((updated, bump))
}

/// Bump the version in `<theme_dir>/style.css`. `Ok(None)` when the file or
/// the header is missing.
pub fn bump_theme_version(theme_dir: &Path) -> Result<Option<VersionBump>> {
    let path = theme_dir.join("style.css");
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let Some((updated, bump)) = bump_minor(&content) else {
        return Ok(None);
    };
    fs::write(&path, updated).map_err(|source| CoreError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(from = %bump.from, to = %bump.to, "theme version bumped");
    Ok(Some(bump))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn bumps_minor() {
        let (updated, bump) = bump_minor("/*\nTheme Name: Flavor\nVersion: 1.9\n*/").unwrap();
        assert_eq!(updated, "/*\nTheme Name: Flavor\nVersion: 1.10\n*/");
        assert_eq!(bump.from, "1.9");
        assert_eq!(bump.to, "1.10");
    }

    #[test]
    fn missing_header_is_none() {
        assert!(bump_minor("/* Theme Name: Flavor */").is_none());
    }

    #[test]
    fn bumps_file_once_per_call() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), "/*\nVersion:  2.3\n*/\n").unwrap();

        let bump = bump_theme_version(dir.path()).unwrap().unwrap();
        assert_eq!(bump.to, "2.4");
        let content = fs::read_to_string(dir.path().join("style.css")).unwrap();
        assert!(content.contains("Version: 2.4"));

        assert!(bump_theme_version(&dir.path().join("missing")).unwrap().is_none());
    }
}
