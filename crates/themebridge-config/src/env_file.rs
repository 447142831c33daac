//! `.env` file reader.
//!
//! Supports `KEY=value` lines, `#` comments, an optional `export ` prefix and
//! single or double quoted values. Keys are lowercased so they line up with
//! the field names figment sees from the `Env` provider.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Read and parse an env file.
pub fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path)?;
    parse_env(&content).map_err(|(line, content)| ConfigError::MalformedLine {
        path: path.to_path_buf(),
        line,
        content,
    })
}

/// Parse env file content. On failure returns the 1-based line number and text.
pub fn parse_env(content: &str) -> std::result::Result<BTreeMap<String, String>, (usize, String)> {
    let mut values = BTreeMap::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            return Err((idx + 1, raw_line.to_string()));
        };

        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err((idx + 1, raw_line.to_string()));
        }

        values.insert(key.to_ascii_lowercase(), unquote(value.trim()));
    }

    Ok(values)
}

fn unquote(value: &str) -> String {
    // A quoted value ends at its closing quote; anything after it is a comment.
    for quote in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(quote)
            && let Some(end) = rest.find(quote)
        {
            return rest[..end].to_string();
        }
    }

    // Unquoted values may carry a trailing comment.
    match value.find(" #") {
        Some(pos) => value[..pos].trim_end().to_string(),
        None => value.to_string(),
    }
}
