//! PHP literal encoding for values embedded in the shim.

use minijinja::Value;
use minijinja::value::ValueKind;

/// Single-quoted PHP string literal.
pub fn php_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if matches!(ch, '\\' | '\'') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Template filter: renders strings as PHP literals, booleans as `true`/`false`.
pub fn php_filter(value: Value) -> String {
    match value.kind() {
        ValueKind::Bool if value.is_true() => "true".to_string(),
        ValueKind::Bool => "false".to_string(),
        ValueKind::None | ValueKind::Undefined => "null".to_string(),
        _ => match value.as_str() {
            Some(s) => php_string(s),
            None => php_string(&value.to_string()),
        },
    }
}
