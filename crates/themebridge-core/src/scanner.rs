//! PHP asset-registration scanner.
//!
//! Extraction is pattern based. It finds `add_action('hook', function () {...})`
//! blocks and the `wp_register_*` / `wp_enqueue_*` / `add_editor_style` calls
//! inside them, plus bare `add_editor_style()` calls. Registrations built from
//! variables or helper functions are not visible to it.

use std::fs;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::context::{AssetKind, EDITOR_STYLE_HOOK};
use crate::error::Result;

/// A constant or call the path is concatenated onto: `OPTI_PATH_URI . ` or
/// `get_template_directory_uri() . `.
const PREFIX: &str = r"(?:[A-Za-z_]\w*(?:\(\s*\))?\s*\.\s*)?";

static HOOK_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"add_action\s*\(\s*['"]([^'"]+)['"]\s*,\s*(?:static\s+)?function\s*\([^)]*\)\s*(?:use\s*\([^)]*\)\s*)?\{"#,
    )
    .expect("hook pattern is valid")
});

static SCRIPT_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"wp_(?:register|enqueue)_script\s*\(\s*[^,;]+,\s*{PREFIX}['"]([^'"]+\.js)['"]"#
    ))
    .expect("script pattern is valid")
});

static STYLE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?:wp_(?:register|enqueue)_style|add_editor_style)\s*\(\s*(?:[^,;]*,\s*)?{PREFIX}['"]([^'"]+\.(?:css|scss))['"]"#
    ))
    .expect("style pattern is valid")
});

static EDITOR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"add_editor_style\s*\(\s*{PREFIX}['"]([^'"]+\.(?:css|scss))['"]"#
    ))
    .expect("editor style pattern is valid")
});

static BUILD_PATH_CONSTANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"define\s*\(\s*['"]OPTI_PATH(?:_URI)?\s*['"]\s*,\s*[^'"]*['"]([^'"]+)/"#)
        .expect("build constant pattern is valid")
});

/// One discovered asset declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Hook the registration runs under.
    pub hook: String,
    pub kind: AssetKind,
    /// Path as written in the PHP source, prefix removed.
    pub raw_path: String,
}

/// Result of scanning a set of PHP files.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub registrations: Vec<Registration>,
    /// Number of configured files that existed.
    pub files_found: usize,
    /// Configured files that were not found.
    pub missing: Vec<PathBuf>,
    /// Files that existed but could not be read.
    pub errors: Vec<(PathBuf, String)>,
    /// Build folder named by an `OPTI_PATH` constant, first match wins.
    pub build_folder_constant: Option<String>,
}

/// Finds asset registrations in PHP sources.
///
/// Implementations must tolerate missing and unreadable files and record them
/// in the report. An `Err` means the scan as a whole could not run.
pub trait AssetScanner {
    fn scan(&self, php_files: &[PathBuf]) -> Result<ScanReport>;
}

/// Regex-based [`AssetScanner`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexScanner;

impl AssetScanner for RegexScanner {
    fn scan(&self, php_files: &[PathBuf]) -> Result<ScanReport> {
        let mut report = ScanReport::default();

        for file in php_files {
            if !file.is_file() {
                tracing::warn!(path = %file.display(), "PHP file not found, skipped");
                report.missing.push(file.clone());
                continue;
            }

            let source = match fs::read_to_string(file) {
                Ok(source) => source,
                Err(err) => {
                    tracing::warn!(path = %file.display(), error = %err, "failed to read PHP file");
                    report.errors.push((file.clone(), err.to_string()));
                    continue;
                }
            };
            report.files_found += 1;

            let found = extract_registrations(&source);
            tracing::debug!(path = %file.display(), registrations = found.len(), "scanned PHP file");
            report.registrations.extend(found);

            if report.build_folder_constant.is_none() {
                report.build_folder_constant = find_build_folder_constant(&source);
            }
        }

        Ok(report)
    }
}

/// A hook closure: the hook name, the whole `add_action(...{...}` span and
/// the body offsets.
struct HookBlock<'a> {
    hook: &'a str,
    span: Range<usize>,
    body: Range<usize>,
}

/// Extract every registration from one PHP source, in source order.
///
/// A call inside nested hook closures belongs to the innermost one only.
pub fn extract_registrations(source: &str) -> Vec<Registration> {
    let mut found: Vec<(usize, Registration)> = Vec::new();

    let blocks: Vec<HookBlock<'_>> = HOOK_HEAD
        .captures_iter(source)
        .filter_map(|head| {
            let (whole, hook) = (head.get(0)?, head.get(1)?);
            let body_end = block_end(source, whole.end());
            Some(HookBlock {
                hook: hook.as_str(),
                span: whole.start()..body_end,
                body: whole.end()..body_end,
            })
        })
        .collect();

    let innermost = |offset: usize| {
        blocks
            .iter()
            .filter(|block| block.span.contains(&offset))
            .max_by_key(|block| block.span.start)
            .map(|block| block.span.start)
    };

    for block in &blocks {
        let body = &source[block.body.clone()];
        for (kind, pattern) in [(AssetKind::Script, &*SCRIPT_CALL), (AssetKind::Style, &*STYLE_CALL)] {
            for call in pattern.captures_iter(body) {
                let (Some(at), Some(path)) = (call.get(0), call.get(1)) else {
                    continue;
                };
                let offset = block.body.start + at.start();
                if innermost(offset) != Some(block.span.start) {
                    continue;
                }
                if let Some(raw_path) = local_path(path.as_str()) {
                    found.push((
                        offset,
                        Registration {
                            hook: block.hook.to_string(),
                            kind,
                            raw_path,
                        },
                    ));
                }
            }
        }
    }

    for call in EDITOR_STYLE.captures_iter(source) {
        let (Some(at), Some(path)) = (call.get(0), call.get(1)) else {
            continue;
        };
        if innermost(at.start()).is_some() {
            continue;
        }
        if let Some(raw_path) = local_path(path.as_str()) {
            found.push((
                at.start(),
                Registration {
                    hook: EDITOR_STYLE_HOOK.to_string(),
                    kind: AssetKind::Style,
                    raw_path,
                },
            ));
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, registration)| registration).collect()
}

/// Build folder named by `define('OPTI_PATH', ... 'folder/')`.
pub fn find_build_folder_constant(source: &str) -> Option<String> {
    let caps = BUILD_PATH_CONSTANT.captures(source)?;
    let folder = caps.get(1)?.as_str().trim_matches('/');
    (!folder.is_empty()).then(|| folder.to_string())
}

/// Theme-relative path, or `None` for URLs on another host.
fn local_path(raw: &str) -> Option<String> {
    if raw.starts_with("http") || raw.starts_with("//") {
        return None;
    }
    let path = raw.trim_start_matches('/');
    (!path.is_empty()).then(|| path.to_string())
}

/// Offset of the `}` closing a block whose body starts at `start`, or the end
/// of the source if the block never closes. Quoted strings and comments are
/// skipped so braces inside them do not count.
fn block_end(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut depth = 1usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    bytes.len()
}
