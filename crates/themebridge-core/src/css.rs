//! `url()` rewriting for stylesheets served by the control server.
//!
//! Relative references are resolved against the theme as served over HTTP, so
//! fonts and images keep working when the stylesheet comes from another origin.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(['"]?)([^'")\s]+)(['"]?)\s*\)"#).expect("url pattern is valid")
});

/// Rewrites `url(...)` references to absolute URLs.
#[derive(Debug, Clone)]
pub struct CssUrlRewriter {
    server_root: String,
    theme_prefix: String,
}

impl CssUrlRewriter {
    /// `server_root` is the origin (`http://localhost:5174`), `theme_prefix`
    /// the theme's path below it (`wp-content/themes/flavor`).
    pub fn new(server_root: impl Into<String>, theme_prefix: impl Into<String>) -> Self {
        Self {
            server_root: server_root.into().trim_end_matches('/').to_string(),
            theme_prefix: theme_prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Base URL of the theme directory.
    pub fn theme_base(&self) -> String {
        if self.theme_prefix.is_empty() {
            self.server_root.clone()
        } else {
            format!("{}/{}", self.server_root, self.theme_prefix)
        }
    }

    pub fn rewrite<'a>(&self, css: &'a str) -> Cow<'a, str> {
        if !css.contains("url(") {
            return Cow::Borrowed(css);
        }
        let base = self.theme_base();
        CSS_URL.replace_all(css, |caps: &Captures<'_>| {
            let original = caps.get(0).map_or("", |m| m.as_str());
            let target = caps.get(2).map_or("", |m| m.as_str());
            match self.resolve(target, &base) {
                Some(url) => format!("url(\"{url}\")"),
                None => original.to_string(),
            }
        })
    }

    fn resolve(&self, target: &str, base: &str) -> Option<String> {
        if target.starts_with("http:")
            || target.starts_with("https:")
            || target.starts_with("//")
            || target.starts_with("data:")
            || target.starts_with('#')
        {
            return None;
        }

        if let Some(absolute) = target.strip_prefix('/') {
            if !self.theme_prefix.is_empty() && absolute.starts_with(&self.theme_prefix) {
                return Some(format!("{}/{}", self.server_root, absolute));
            }
            return Some(format!("{base}/{absolute}"));
        }

        let mut relative = target;
        while let Some(rest) = relative
            .strip_prefix("../")
            .or_else(|| relative.strip_prefix("./"))
        {
            relative = rest;
        }
        Some(format!("{base}/{relative}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> CssUrlRewriter {
        CssUrlRewriter::new("http://localhost:5174/", "/wp-content/themes/flavor")
    }

    #[test]
    fn parent_relative_urls() {
        let css = r#"@font-face { src: url("../../fonts/inter.woff2") format("woff2"); }"#;
        assert_eq!(
            rewriter().rewrite(css),
            r#"@font-face { src: url("http://localhost:5174/wp-content/themes/flavor/fonts/inter.woff2") format("woff2"); }"#
        );
    }

    #[test]
    fn bare_relative_urls() {
        assert_eq!(
            rewriter().rewrite("a{background:url(images/bg.png)}"),
            r#"a{background:url("http://localhost:5174/wp-content/themes/flavor/images/bg.png")}"#
        );
    }

    #[test]
    fn root_relative_urls() {
        let r = rewriter();
        assert_eq!(
            r.rewrite("a{background:url('/images/bg.png')}"),
            r#"a{background:url("http://localhost:5174/wp-content/themes/flavor/images/bg.png")}"#
        );
        assert_eq!(
            r.rewrite("a{background:url(/wp-content/themes/flavor/images/bg.png)}"),
            r#"a{background:url("http://localhost:5174/wp-content/themes/flavor/images/bg.png")}"#
        );
    }

    #[test]
    fn foreign_and_inline_urls_are_untouched() {
        let css = r#"a{b:url(https://cdn.example.com/x.png);c:url(//cdn.example.com/y.png);d:url("data:image/png;base64,AAA");e:url(#grad)}"#;
        assert_eq!(rewriter().rewrite(css), css);
    }

    #[test]
    fn no_urls_borrows() {
        assert!(matches!(rewriter().rewrite("a{color:red}"), Cow::Borrowed(_)));
    }
}
