//! Bundler entry graph.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::catalog::{AssetCatalog, AssetPath};

static SOURCE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(?:js|ts|scss|css)$").expect("extension pattern is valid"));

/// Entry name to absolute source path, plus the sources that were not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryGraph {
    pub entries: IndexMap<String, PathBuf>,
    pub missing: Vec<AssetPath>,
}

impl EntryGraph {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// `js/blocks/hero.js` -> `js-blocks-hero`.
pub fn entry_name(path: &AssetPath) -> String {
    SOURCE_EXTENSION.replace(path.as_str(), "").replace('/', "-")
}

/// Entry graph over every source path of `catalog`. Paths that do not exist
/// under `theme_root` are left out and listed in [`EntryGraph::missing`].
pub fn generate_entries(catalog: &AssetCatalog, theme_root: &Path) -> EntryGraph {
    let mut graph = EntryGraph::default();

    for path in catalog.all_sources() {
        let absolute = theme_root.join(path.as_str());
        if !absolute.is_file() {
            tracing::warn!(path = %path, "registered asset not found, left out of the build");
            graph.missing.push(path.clone());
            continue;
        }
        let name = unique_name(&graph.entries, entry_name(path));
        graph.entries.insert(name, absolute);
    }

    graph
}

/// `name`, or `name-2`, `name-3`, ... when another source already flattened
/// to it (`js/a-b.js` and `js/a/b.js`).
fn unique_name(entries: &IndexMap<String, PathBuf>, name: String) -> String {
    if !entries.contains_key(&name) {
        return name;
    }
    let unique = (2..)
        .map(|n| format!("{name}-{n}"))
        .find(|candidate| !entries.contains_key(candidate))
        .unwrap_or_default();
    tracing::warn!(entry = %name, renamed = %unique, "entry name collision");
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_flatten_paths() {
        assert_eq!(entry_name(&AssetPath::from("js/main.js")), "js-main");
        assert_eq!(entry_name(&AssetPath::from("scss/style.scss")), "scss-style");
        assert_eq!(entry_name(&AssetPath::from("js/blocks/hero.ts")), "js-blocks-hero");
        assert_eq!(entry_name(&AssetPath::from("js/lib.min.js")), "js-lib.min");
    }

    #[test]
    fn colliding_entry_names_are_suffixed() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("js/a")).unwrap();
        std::fs::write(temp.path().join("js/a-b.js"), "").unwrap();
        std::fs::write(temp.path().join("js/a/b.js"), "").unwrap();

        let mut catalog = AssetCatalog::empty();
        catalog.front.sources.insert(AssetPath::from("js/a-b.js"));
        catalog.front.sources.insert(AssetPath::from("js/a/b.js"));

        let graph = generate_entries(&catalog, temp.path());
        assert!(graph.missing.is_empty());
        assert_eq!(graph.entries.len(), 2);
        assert_eq!(graph.entries["js-a-b"], temp.path().join("js/a-b.js"));
        assert_eq!(graph.entries["js-a-b-2"], temp.path().join("js/a/b.js"));
    }
}
