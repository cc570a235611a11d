//! Text normalization shared by the index writers and every search mode.
//!
//! Keys must be produced the same way on both sides or lookups silently miss, so nothing
//! else in the crate lowercases or splits text on its own.

/// Unicode-aware lowercasing; works for Cyrillic as well as Latin input.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// Splits on single spaces and normalizes every token.
///
/// - Empty input yields one empty token, so suggest treats it as an empty prefix.
/// - A trailing space does not produce a trailing empty token.
/// - Consecutive spaces produce empty tokens between them.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let body = text.strip_suffix(' ').unwrap_or(text);
    body.split(' ').map(normalize).collect()
}

/// Normalized, de-duplicated keys for a batch of field values, in first-seen order.
pub fn keys_for(values: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let key = normalize(value);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
