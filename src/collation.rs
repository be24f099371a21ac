//! Ordering for user-facing pt-BR names: accents and case are ignored first,
//! so "maçã" sorts before "manga" and "Óleo" before "Ovos".

use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lowercased, decomposed, with combining marks dropped.
pub fn sort_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Accent- and case-insensitive order; ties fall back to the raw strings.
pub fn compare(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b))
}
