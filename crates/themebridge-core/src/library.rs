//! Vendored-library detection.
//!
//! Deciding "library or authored source" runs once per cataloged path, so it
//! only looks at the first [`PREFIX_BYTES`] bytes of a file plus its name. The
//! checks are an ordered list of named rules; the first one that matches wins.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::AssetPath;

/// Bytes read from the start of a file.
pub const PREFIX_BYTES: u64 = 2000;

/// Window, in characters, inspected by the line-length and indentation rules.
const WINDOW_CHARS: usize = 500;

/// Minified basenames that are still authored entry points.
const AUTHORED_BASENAMES: &[&str] = &["main", "style", "admin", "editor"];

static BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^/\*[!*]?\s*(?:@preserve|@license|@version|@name|\w+\s+v\d+\.\d+)")
        .expect("banner pattern is valid")
});
static SHORT_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]\.[a-z]{1,3}\(").expect("short call pattern is valid"));
static INDENTED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s{2,}").expect("indent pattern is valid"));
static MIN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.min\.(?:js|css)$").expect("min suffix pattern is valid"));

/// What a rule gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a> {
    /// Theme-relative path.
    pub path: &'a str,
    /// Decoded file prefix, `None` when the file could not be read.
    pub prefix: Option<&'a str>,
}

/// A single named heuristic.
pub struct LibraryRule {
    pub name: &'static str,
    pub matches: fn(&Probe<'_>) -> bool,
}

/// Rules in evaluation order.
pub const RULES: &[LibraryRule] = &[
    LibraryRule {
        name: "banner-comment",
        matches: banner_comment,
    },
    LibraryRule {
        name: "long-first-line",
        matches: long_first_line,
    },
    LibraryRule {
        name: "minified-calls",
        matches: minified_calls,
    },
    LibraryRule {
        name: "minified-filename",
        matches: minified_filename,
    },
];

fn banner_comment(probe: &Probe<'_>) -> bool {
    probe.prefix.is_some_and(|text| BANNER.is_match(text))
}

fn long_first_line(probe: &Probe<'_>) -> bool {
    probe.prefix.is_some_and(|text| {
        let first = text.split('\n').next().unwrap_or_default();
        first.chars().count() > WINDOW_CHARS
    })
}

fn minified_calls(probe: &Probe<'_>) -> bool {
    probe.prefix.is_some_and(|text| {
        SHORT_CALL.is_match(text) && !INDENTED_LINE.is_match(char_window(text, WINDOW_CHARS))
    })
}

fn minified_filename(probe: &Probe<'_>) -> bool {
    if !probe.path.contains(".min.") {
        return false;
    }
    let file_name = probe.path.rsplit('/').next().unwrap_or(probe.path);
    let base = MIN_SUFFIX.replace(file_name, "");
    !AUTHORED_BASENAMES.contains(&base.as_ref())
}

/// First `n` characters of `text`.
fn char_window(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Classifies theme-relative paths as vendored libraries or authored sources.
#[derive(Debug, Clone)]
pub struct LibraryClassifier {
    theme_root: PathBuf,
}

impl LibraryClassifier {
    pub fn new(theme_root: impl Into<PathBuf>) -> Self {
        Self {
            theme_root: theme_root.into(),
        }
    }

    pub fn is_library(&self, path: &AssetPath) -> bool {
        self.matching_rule(path).is_some()
    }

    /// Name of the first rule that flags `path`, if any.
    ///
    /// Missing files are never libraries. A read failure only disables the
    /// content rules; the filename rule still applies.
    pub fn matching_rule(&self, path: &AssetPath) -> Option<&'static str> {
        let absolute = self.theme_root.join(path.as_str());
        if !absolute.is_file() {
            return None;
        }

        let prefix = match read_prefix(&absolute) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "library detection fell back to filename");
                None
            }
        };

        let probe = Probe {
            path: path.as_str(),
            prefix: prefix.as_deref(),
        };
        RULES
            .iter()
            .find(|rule| (rule.matches)(&probe))
            .map(|rule| rule.name)
    }
}

fn read_prefix(path: &Path) -> std::io::Result<String> {
    let mut buf = Vec::with_capacity(PREFIX_BYTES as usize);
    File::open(path)?.take(PREFIX_BYTES).read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
