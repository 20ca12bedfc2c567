//! Keyword ranking for free text
//!
//! Words are runs of ASCII letters and digits that start with a letter and
//! are at least three characters long. Counting is case-insensitive and
//! common function words are ignored.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Default number of keywords returned by [`extract_keywords`]
pub const DEFAULT_KEYWORD_LIMIT: usize = 24;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9]{2,}").expect("valid word pattern"));

/// Check if a word is a common stop word
fn is_stop_word(word: &str) -> bool {
    const STOP_WORDS: &[&str] = &[
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from",
        "has", "have", "in", "into", "is", "it", "its", "of", "on", "or",
        "that", "the", "their", "they", "this", "to", "was", "were", "will",
        "with", "you", "your",
    ];
    STOP_WORDS.contains(&word)
}

/// Returns the most frequent words in `text`, lowercased
///
/// Ordered by descending count, ties broken alphabetically.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut word_counts: HashMap<String, usize> = HashMap::new();

    for word in WORD_RE.find_iter(text) {
        let lowered = word.as_str().to_ascii_lowercase();
        if is_stop_word(&lowered) {
            continue;
        }
        *word_counts.entry(lowered).or_insert(0) += 1;
    }

    let mut ranked: Vec<_> = word_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _)| word)
        .collect()
}

/// Sequential reader over a ranked keyword list
///
/// One cursor is shared by every category of a model, so a keyword handed to
/// one category is never offered to the next.
#[derive(Debug, Clone)]
pub struct KeywordCursor {
    keywords: Vec<String>,
    position: usize,
}

impl KeywordCursor {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            position: 0,
        }
    }

    /// Returns the next keyword, advancing the cursor
    pub fn next_keyword(&mut self) -> Option<&str> {
        let keyword = self.keywords.get(self.position)?;
        self.position += 1;
        Some(keyword.as_str())
    }
}

/// Title-cases a word the way display names expect (`api2go` -> `Api2Go`)
///
/// A letter is uppercased when it follows a non-letter and lowercased
/// otherwise.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }

    out
}
