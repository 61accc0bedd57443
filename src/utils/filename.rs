//! Turning calendar and item names into file names

use std::collections::HashSet;

use sanitize_filename::{sanitize_with_options, Options};

/// Longest stem we produce, in bytes. Item files are named after both their calendar and themselves.
const MAX_STEM_LEN: usize = 100;

/// A file name (without extension) that is safe on every common filesystem.
///
/// Characters that are forbidden on Windows or Unix are replaced, runs of whitespace and underscores are collapsed into a single `_`.
/// `fallback` is returned when nothing usable is left.
pub fn file_stem(name: &str, fallback: &str) -> String {
    let options = Options {
        windows: true,
        truncate: true,
        replacement: "_",
    };
    let sanitized = sanitize_with_options(name, options);

    let collapsed = sanitized
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| part.is_empty() == false)
        .collect::<Vec<_>>()
        .join("_");
    let stem = truncate(collapsed.trim_start_matches('.'), MAX_STEM_LEN)
        .trim_end_matches(|c| c == '.' || c == '_');

    if stem.is_empty() {
        fallback.to_string()
    } else {
        stem.to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut cut = max_len;
    while s.is_char_boundary(cut) == false {
        cut -= 1;
    }
    &s[..cut]
}


/// Hands out file stems that have not been used yet.
///
/// Stems are compared case-insensitively, so that files do not overwrite each other on case-insensitive filesystems.
/// A stem that is already taken gets a `-2`, `-3`... suffix.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, stem: &str) -> String {
        let mut candidate = stem.to_string();
        let mut counter = 1;
        while self.taken.insert(candidate.to_lowercase()) == false {
            counter += 1;
            candidate = format!("{}-{}", stem, counter);
        }
        candidate
    }
}
