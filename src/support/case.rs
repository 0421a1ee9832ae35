//! Column-name convention codec
//!
//! Storage columns use `snake_case`, in-memory records use `camelCase`.
//! The query executor is the only caller of [`row_to_internal`]; statements
//! name their columns in `snake_case` directly.

use serde_json::{Map, Value};

/// `provider_user_id` -> `providerUserId`. Only an underscore followed by a
/// lowercase ASCII letter is folded; any other underscore is kept, so
/// `page_2_size` becomes `page_2Size`.
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();

    while let Some(ch) = chars.next() {
        match chars.peek() {
            Some(next) if ch == '_' && next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(ch),
        }
    }

    out
}

/// `providerUserId` -> `provider_user_id`.
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);

    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// Rewrites every key of a result row into the in-memory convention.
pub fn row_to_internal(row: Map<String, Value>) -> Map<String, Value> {
    row.into_iter()
        .map(|(key, value)| (snake_to_camel(&key), value))
        .collect()
}
