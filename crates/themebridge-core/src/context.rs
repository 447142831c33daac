//! Execution context classification.
//!
//! A registration's hook name decides which rendering surface receives the
//! asset. Matching is a case-insensitive substring test, first rule wins.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hook WordPress fires to enqueue public-facing assets.
pub const FRONT_HOOK: &str = "wp_enqueue_scripts";

/// Hook assumed for `add_editor_style` calls that sit outside any hook.
pub const EDITOR_STYLE_HOOK: &str = "after_setup_theme";

const ADMIN_MARKERS: &[&str] = &["admin", "login", "customize_register"];
const STYLE_ADMIN_MARKERS: &[&str] = &["editor", "after_setup_theme"];

/// Rendering surface that loads an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    Front,
    Admin,
    Both,
}

impl ExecutionContext {
    /// Every context, in catalog order.
    pub const ALL: [ExecutionContext; 3] = [Self::Front, Self::Admin, Self::Both];

    /// Order used when an asset shows up in several contexts and must be
    /// counted once.
    pub const DISPLAY_PRECEDENCE: [ExecutionContext; 3] = [Self::Both, Self::Admin, Self::Front];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Admin => "admin",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of asset a registration declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Style,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "style",
        }
    }
}

/// Map a hook name to its execution context.
///
/// Unknown hooks fall back to [`ExecutionContext::Both`] so an asset is never
/// dropped from either surface.
pub fn classify(hook: &str) -> ExecutionContext {
    classify_with(&hook.to_ascii_lowercase(), ADMIN_MARKERS)
}

/// Like [`classify`], with the wider admin rule used for styles: editor
/// styles and theme-setup hooks only ever reach the admin surface.
pub fn classify_for(hook: &str, kind: AssetKind) -> ExecutionContext {
    let hook = hook.to_ascii_lowercase();
    match kind {
        AssetKind::Script => classify_with(&hook, ADMIN_MARKERS),
        AssetKind::Style => {
            if STYLE_ADMIN_MARKERS.iter().any(|m| hook.contains(m)) {
                ExecutionContext::Admin
            } else {
                classify_with(&hook, ADMIN_MARKERS)
            }
        }
    }
}

fn classify_with(hook: &str, admin_markers: &[&str]) -> ExecutionContext {
    if admin_markers.iter().any(|m| hook.contains(m)) {
        ExecutionContext::Admin
    } else if hook.contains(FRONT_HOOK) {
        ExecutionContext::Front
    } else {
        // Block asset hooks render in the editor and on the front end.
        ExecutionContext::Both
    }
}
