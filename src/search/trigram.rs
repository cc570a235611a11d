//! Trigram similarity with the semantics of PostgreSQL's `pg_trgm`.
//!
//! Text is split into words of alphanumeric characters, each word is lowercased and padded
//! with two leading spaces and one trailing space, and the distinct three-character windows
//! form the trigram set. Similarity is `|A ∩ B| / |A ∪ B|`.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Alphabetic}\p{Nd}]+").expect("word pattern is valid"));

pub fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in WORD.find_iter(text) {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.as_str().chars().flat_map(char::to_lowercase))
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

/// Value in `[0, 1]`; `0` when either side has no trigrams.
pub fn similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let common = left.intersection(&right).count();
    let union = left.len() + right.len() - common;
    common as f64 / union as f64
}
