//! Build-path to source-path normalization.
//!
//! Themes usually enqueue compiled files (`optimised/js/main.min.js`). The dev
//! server wants the authored source (`js/main.js`, `scss/style.scss`). A path
//! is only promoted to a source candidate when that candidate exists on disk.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::AssetPath;

/// Conventional build-output folder names, checked in order.
pub const BUILD_FOLDER_CANDIDATES: [&str; 9] = [
    "dist",
    "build",
    "optimised",
    "optimized",
    "compiled",
    "bundle",
    "public",
    "assets",
    "output",
];

/// Build folder assumed when nothing else is known.
pub const DEFAULT_BUILD_FOLDER: &str = "dist";

static MINIFIED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.min\.(js|css)$").expect("minified pattern is valid"));
static CSS_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/)css/").expect("css dir pattern is valid"));
static SCSS_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/)scss/").expect("scss dir pattern is valid"));

/// First conventional build folder present in the theme.
pub fn detect_build_folder(theme_root: &Path) -> Option<String> {
    BUILD_FOLDER_CANDIDATES
        .iter()
        .find(|name| theme_root.join(name).is_dir())
        .map(|name| (*name).to_string())
}

/// Converts registered paths to authored-source paths and back.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    theme_root: PathBuf,
    build_folder: Option<String>,
}

impl PathNormalizer {
    pub fn new(theme_root: impl Into<PathBuf>) -> Self {
        Self {
            theme_root: theme_root.into(),
            build_folder: None,
        }
    }

    /// Also strip `folder` when it is not one of the conventional names.
    pub fn with_build_folder(mut self, folder: impl Into<String>) -> Self {
        let folder = folder.into();
        let folder = folder.trim_matches('/');
        self.build_folder = (!folder.is_empty()).then(|| folder.to_string());
        self
    }

    pub fn theme_root(&self) -> &Path {
        &self.theme_root
    }

    /// Build folder used by [`to_build_path`](Self::to_build_path).
    pub fn build_folder(&self) -> &str {
        self.build_folder.as_deref().unwrap_or(DEFAULT_BUILD_FOLDER)
    }

    /// Resolve a registered path to the best existing source candidate.
    pub fn to_source_path(&self, registered: &str) -> AssetPath {
        let path = self.strip_build_prefix(registered.trim_start_matches('/'));

        if let Some(caps) = MINIFIED.captures(path) {
            let ext = caps.get(1).map_or("js", |m| m.as_str());
            let plain = MINIFIED.replace(path, format!(".{ext}")).into_owned();
            if self.exists(&plain) {
                return AssetPath::new(plain);
            }
            if ext == "css" {
                let scss = scss_candidate(&plain);
                if self.exists(&scss) {
                    return AssetPath::new(scss);
                }
            }
            // No source: the minified file is used as is.
            return AssetPath::new(path);
        }

        if path.ends_with(".css") {
            let scss = scss_candidate(path);
            if self.exists(&scss) {
                return AssetPath::new(scss);
            }
        }

        AssetPath::new(path)
    }

    /// Path of the compiled file a source is expected to produce, prefixed
    /// with the build folder. This is what production tags reference.
    pub fn to_build_path(&self, source: &AssetPath) -> String {
        let path = source.as_str();
        let compiled = if MINIFIED.is_match(path) {
            path.to_string()
        } else if let Some(stem) = path.strip_suffix(".scss") {
            format!("{}.min.css", SCSS_DIR.replace(stem, "${1}css/"))
        } else if let Some(stem) = path.strip_suffix(".css") {
            format!("{stem}.min.css")
        } else if let Some(stem) = path.strip_suffix(".js") {
            format!("{stem}.min.js")
        } else {
            path.to_string()
        };
        format!("{}/{}", self.build_folder(), compiled)
    }

    fn strip_build_prefix<'a>(&self, path: &'a str) -> &'a str {
        let custom = self
            .build_folder
            .as_deref()
            .filter(|f| !BUILD_FOLDER_CANDIDATES.contains(f));

        custom
            .into_iter()
            .chain(BUILD_FOLDER_CANDIDATES)
            .find_map(|folder| {
                path.strip_prefix(folder)
                    .and_then(|rest| rest.strip_prefix('/'))
            })
            .unwrap_or(path)
    }

    fn exists(&self, relative: &str) -> bool {
        self.theme_root.join(relative).is_file()
    }
}

/// `css/x.css` -> `scss/x.scss`, first `css/` directory only.
fn scss_candidate(css_path: &str) -> String {
    let swapped = CSS_DIR.replace(css_path, "${1}scss/");
    match swapped.strip_suffix(".css") {
        Some(stem) => format!("{stem}.scss"),
        None => swapped.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn theme(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        dir
    }

    #[test]
    fn minified_script_resolves_to_existing_source() {
        let dir = theme(&["js/main.js"]);
        let normalizer = PathNormalizer::new(dir.path());
        assert_eq!(
            normalizer.to_source_path("optimised/js/main.min.js").as_str(),
            "js/main.js"
        );
    }

    #[test]
    fn minified_without_source_is_kept() {
        let dir = theme(&[]);
        let normalizer = PathNormalizer::new(dir.path());
        assert_eq!(
            normalizer.to_source_path("dist/js/unpoly.min.js").as_str(),
            "js/unpoly.min.js"
        );
    }

    #[test]
    fn minified_style_prefers_plain_css_then_scss() {
        let dir = theme(&["scss/style.scss"]);
        let normalizer = PathNormalizer::new(dir.path());
        assert_eq!(
            normalizer.to_source_path("optimised/css/style.min.css").as_str(),
            "scss/style.scss"
        );

        let dir = theme(&["css/style.css", "scss/style.scss"]);
        let normalizer = PathNormalizer::new(dir.path());
        assert_eq!(
            normalizer.to_source_path("optimised/css/style.min.css").as_str(),
            "css/style.css"
        );
    }

    #[test]
    fn plain_css_switches_to_scss_sibling() {
        let dir = theme(&["assets/scss/blocks.scss"]);
        let normalizer = PathNormalizer::new(dir.path());
        // `assets/` is a build prefix, so it is stripped first.
        assert_eq!(
            normalizer.to_source_path("assets/css/blocks.css").as_str(),
            "css/blocks.css"
        );

        let dir = theme(&["scss/blocks.scss"]);
        let normalizer = PathNormalizer::new(dir.path());
        assert_eq!(
            normalizer.to_source_path("css/blocks.css").as_str(),
            "scss/blocks.scss"
        );
    }

    #[test]
    fn plain_script_is_unchanged() {
        let dir = theme(&[]);
        let normalizer = PathNormalizer::new(dir.path());
        assert_eq!(normalizer.to_source_path("/js/app.js").as_str(), "js/app.js");
    }

    #[test]
    fn custom_build_folder_is_stripped() {
        let dir = theme(&["js/main.js"]);
        let normalizer = PathNormalizer::new(dir.path()).with_build_folder("static/");
        assert_eq!(
            normalizer.to_source_path("static/js/main.min.js").as_str(),
            "js/main.js"
        );
        assert_eq!(normalizer.build_folder(), "static");
    }

    #[test]
    fn build_paths() {
        let normalizer = PathNormalizer::new("/theme").with_build_folder("optimised");
        let build = |p: &str| normalizer.to_build_path(&AssetPath::new(p));
        assert_eq!(build("js/main.js"), "optimised/js/main.min.js");
        assert_eq!(build("scss/style.scss"), "optimised/css/style.min.css");
        assert_eq!(build("css/print.css"), "optimised/css/print.min.css");
        assert_eq!(build("js/lib.min.js"), "optimised/js/lib.min.js");
    }

    #[test]
    fn detects_first_conventional_folder() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        assert_eq!(detect_build_folder(dir.path()).as_deref(), Some("build"));
        assert_eq!(detect_build_folder(&dir.path().join("nope")), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn never_returns_minified_when_source_exists(name in "[a-z]{1,10}", dir in "(js|scripts|js/blocks)") {
            let source = format!("{dir}/{name}.js");
            let tmp = theme(&[source.as_str()]);
            let normalizer = PathNormalizer::new(tmp.path());
            let resolved = normalizer.to_source_path(&format!("dist/{dir}/{name}.min.js"));
            prop_assert_eq!(resolved.as_str(), source.as_str());
        }

        #[test]
        fn build_path_round_trips(name in "[a-z]{1,10}", kind in 0usize..3) {
            let source = match kind {
                0 => format!("js/{name}.js"),
                1 => format!("scss/{name}.scss"),
                _ => format!("css/{name}.css"),
            };
            let tmp = theme(&[source.as_str()]);
            let normalizer = PathNormalizer::new(tmp.path()).with_build_folder("optimised");
            let build = normalizer.to_build_path(&AssetPath::new(source.clone()));
            let resolved = normalizer.to_source_path(&build);
            prop_assert_eq!(resolved.as_str(), source.as_str());
        }
    }
}
