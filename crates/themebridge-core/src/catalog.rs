//! The asset catalog: every discovered asset, per execution context, split
//! into authored sources and vendored libraries.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::context::{AssetKind, ExecutionContext, classify_for};
use crate::error::{CoreError, Result};
use crate::library::LibraryClassifier;
use crate::normalize::{DEFAULT_BUILD_FOLDER, PathNormalizer, detect_build_folder};
use crate::scanner::{AssetScanner, RegexScanner};

/// Theme-relative asset path, pointing at the authored source when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetPath(String);

impl AssetPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> AssetKind {
        if self.0.ends_with(".css") || self.0.ends_with(".scss") {
            AssetKind::Style
        } else {
            AssetKind::Script
        }
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Sources and libraries of one context. A path is in at most one of the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub sources: IndexSet<AssetPath>,
    pub libraries: IndexSet<AssetPath>,
}

impl CatalogEntry {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.libraries.is_empty()
    }

    pub fn contains(&self, path: &AssetPath) -> bool {
        self.sources.contains(path) || self.libraries.contains(path)
    }
}

/// Classified assets of a theme.
///
/// All three contexts are always present. An asset registered under hooks of
/// different contexts is listed in each of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCatalog {
    pub front: CatalogEntry,
    pub admin: CatalogEntry,
    pub both: CatalogEntry,
    pub build_folder: String,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl AssetCatalog {
    /// Catalog with every context empty and the default build folder.
    pub fn empty() -> Self {
        Self {
            front: CatalogEntry::default(),
            admin: CatalogEntry::default(),
            both: CatalogEntry::default(),
            build_folder: DEFAULT_BUILD_FOLDER.to_string(),
        }
    }

    pub fn entry(&self, context: ExecutionContext) -> &CatalogEntry {
        match context {
            ExecutionContext::Front => &self.front,
            ExecutionContext::Admin => &self.admin,
            ExecutionContext::Both => &self.both,
        }
    }

    fn entry_mut(&mut self, context: ExecutionContext) -> &mut CatalogEntry {
        match context {
            ExecutionContext::Front => &mut self.front,
            ExecutionContext::Admin => &mut self.admin,
            ExecutionContext::Both => &mut self.both,
        }
    }

    pub fn is_empty(&self) -> bool {
        ExecutionContext::ALL.iter().all(|c| self.entry(*c).is_empty())
    }

    /// Unique source paths across contexts, front then admin then both.
    pub fn all_sources(&self) -> IndexSet<&AssetPath> {
        ExecutionContext::ALL
            .iter()
            .flat_map(|c| self.entry(*c).sources.iter())
            .collect()
    }

    /// Unique-asset counts, each asset counted once in the first context of
    /// [`ExecutionContext::DISPLAY_PRECEDENCE`] that lists it.
    pub fn summary(&self) -> CatalogSummary {
        let mut summary = CatalogSummary::default();
        let mut seen: IndexSet<&AssetPath> = IndexSet::new();

        for context in ExecutionContext::DISPLAY_PRECEDENCE {
            let entry = self.entry(context);
            let counts = summary.counts.entry(context).or_default();
            for path in &entry.sources {
                if seen.insert(path) {
                    counts.sources += 1;
                }
            }
            for path in &entry.libraries {
                if seen.insert(path) {
                    counts.libraries += 1;
                }
            }
        }

        summary
    }
}

/// Display counts for one context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContextCounts {
    pub sources: usize,
    pub libraries: usize,
}

/// Per-context counts where every asset is counted once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub counts: IndexMap<ExecutionContext, ContextCounts>,
}

impl CatalogSummary {
    pub fn get(&self, context: ExecutionContext) -> ContextCounts {
        self.counts.get(&context).copied().unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.counts.values().map(|c| c.sources + c.libraries).sum()
    }
}

/// Builds an [`AssetCatalog`] from a theme's PHP files.
#[derive(Debug, Clone)]
pub struct CatalogBuilder<S = RegexScanner> {
    theme_root: PathBuf,
    php_files: Vec<PathBuf>,
    build_folder: Option<String>,
    scanner: S,
}

impl CatalogBuilder<RegexScanner> {
    /// `php_files` are relative to `theme_root`.
    pub fn new<I, P>(theme_root: impl Into<PathBuf>, php_files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let theme_root = theme_root.into();
        let php_files = php_files
            .into_iter()
            .map(|f| theme_root.join(f))
            .collect();
        Self {
            theme_root,
            php_files,
            build_folder: None,
            scanner: RegexScanner,
        }
    }
}

impl<S: AssetScanner> CatalogBuilder<S> {
    /// Replace the scanner.
    pub fn with_scanner<T: AssetScanner>(self, scanner: T) -> CatalogBuilder<T> {
        CatalogBuilder {
            theme_root: self.theme_root,
            php_files: self.php_files,
            build_folder: self.build_folder,
            scanner,
        }
    }

    /// Use `folder` instead of detecting one in the theme. A build-path
    /// constant in the PHP sources still takes precedence.
    pub fn with_build_folder(mut self, folder: Option<String>) -> Self {
        self.build_folder = folder.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn theme_root(&self) -> &Path {
        &self.theme_root
    }

    pub fn php_files(&self) -> &[PathBuf] {
        &self.php_files
    }

    /// Build the catalog. Never fails: any error is logged and yields
    /// [`AssetCatalog::empty`].
    pub fn build(&self) -> AssetCatalog {
        match self.try_build() {
            Ok(catalog) => {
                log_summary(&catalog);
                catalog
            }
            Err(err) => {
                tracing::warn!(error = %err, "asset scan failed, using an empty catalog");
                AssetCatalog::empty()
            }
        }
    }

    fn try_build(&self) -> Result<AssetCatalog> {
        let report = self.scanner.scan(&self.php_files)?;
        if report.files_found == 0 {
            return Err(CoreError::NoPhpFiles(self.theme_root.clone()));
        }

        let build_folder = report
            .build_folder_constant
            .clone()
            .or_else(|| self.build_folder.clone())
            .or_else(|| detect_build_folder(&self.theme_root))
            .unwrap_or_else(|| DEFAULT_BUILD_FOLDER.to_string());

        let normalizer = PathNormalizer::new(&self.theme_root).with_build_folder(&build_folder);

        // Registered paths per context and kind, deduplicated in scan order.
        let mut accumulated: IndexMap<(ExecutionContext, AssetKind), IndexSet<AssetPath>> =
            IndexMap::new();
        for registration in &report.registrations {
            let path = normalizer.to_source_path(&registration.raw_path);
            let context = classify_for(&registration.hook, registration.kind);
            tracing::debug!(
                hook = %registration.hook,
                raw = %registration.raw_path,
                path = %path,
                context = %context,
                "registration"
            );
            accumulated
                .entry((context, registration.kind))
                .or_default()
                .insert(path);
        }

        let classifier = LibraryClassifier::new(&self.theme_root);
        let mut catalog = AssetCatalog {
            build_folder,
            ..AssetCatalog::empty()
        };

        for context in ExecutionContext::ALL {
            for kind in [AssetKind::Script, AssetKind::Style] {
                let Some(paths) = accumulated.get(&(context, kind)) else {
                    continue;
                };
                let entry = catalog.entry_mut(context);
                for path in paths {
                    if classifier.is_library(path) {
                        entry.libraries.insert(path.clone());
                    } else {
                        entry.sources.insert(path.clone());
                    }
                }
            }
        }

        Ok(catalog)
    }
}

fn log_summary(catalog: &AssetCatalog) {
    let summary = catalog.summary();
    let front = summary.get(ExecutionContext::Front);
    let admin = summary.get(ExecutionContext::Admin);
    let both = summary.get(ExecutionContext::Both);
    tracing::info!(
        front_sources = front.sources,
        front_libraries = front.libraries,
        admin_sources = admin.sources,
        admin_libraries = admin.libraries,
        both_sources = both.sources,
        both_libraries = both.libraries,
        build_folder = %catalog.build_folder,
        "asset catalog built"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(sources: &[&str], libraries: &[&str]) -> CatalogEntry {
        CatalogEntry {
            sources: sources.iter().map(|p| AssetPath::from(*p)).collect(),
            libraries: libraries.iter().map(|p| AssetPath::from(*p)).collect(),
        }
    }

    #[test]
    fn empty_catalog_shape() {
        let catalog = AssetCatalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.build_folder, "dist");
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["front"]["sources"], serde_json::json!([]));
        assert_eq!(json["buildFolder"], "dist");
    }

    #[test]
    fn summary_counts_each_asset_once() {
        let catalog = AssetCatalog {
            front: entry(&["js/main.js", "js/shared.js"], &["js/swiper.min.js"]),
            admin: entry(&["js/shared.js", "js/admin.js"], &[]),
            both: entry(&["js/main.js"], &[]),
            build_folder: "dist".into(),
        };

        let summary = catalog.summary();
        assert_eq!(summary.get(ExecutionContext::Both).sources, 1);
        assert_eq!(summary.get(ExecutionContext::Admin).sources, 2);
        assert_eq!(summary.get(ExecutionContext::Front).sources, 0);
        assert_eq!(summary.get(ExecutionContext::Front).libraries, 1);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn all_sources_is_deduplicated_in_context_order() {
        let catalog = AssetCatalog {
            front: entry(&["js/a.js"], &[]),
            admin: entry(&["js/b.js", "js/a.js"], &[]),
            both: entry(&["scss/c.scss"], &["js/lib.min.js"]),
            build_folder: "dist".into(),
        };
        let sources: Vec<&str> = catalog.all_sources().iter().map(|p| p.as_str()).collect();
        assert_eq!(sources, vec!["js/a.js", "js/b.js", "scss/c.scss"]);
    }

    #[test]
    fn asset_kind_from_extension() {
        assert_eq!(AssetPath::from("scss/a.scss").kind(), AssetKind::Style);
        assert_eq!(AssetPath::from("css/a.min.css").kind(), AssetKind::Style);
        assert_eq!(AssetPath::from("js/a.js").kind(), AssetKind::Script);
    }
}
