//! Static theme files served by the control server.
//!
//! Only the file types a stylesheet or script may reference are served; PHP
//! and anything else in the theme stays private.

use std::path::{Component, Path, PathBuf};

/// Content type for an extension the server is willing to serve.
pub fn content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "bmp" => "image/bmp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}

/// Map a request path to a file under `theme_dir`.
///
/// Accepts both `/<theme_prefix>/img/x.png` and `/img/x.png`. Returns `None`
/// for paths that would leave the theme directory.
pub fn resolve(theme_dir: &Path, theme_prefix: &str, request_path: &str) -> Option<PathBuf> {
    let path = request_path.trim_start_matches('/');
    let relative = if theme_prefix.is_empty() {
        path
    } else {
        path.strip_prefix(theme_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path)
    };
    if relative.is_empty() {
        return None;
    }

    let relative = Path::new(relative);
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(theme_dir.join(relative))
}
