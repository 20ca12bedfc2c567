//! Heading outline detection
//!
//! Reduces a Markdown heading tree to a flat list of categories, each with
//! the titles of the items found beneath it. The heading level that acts as
//! the category level is picked by an ordered rule table, see
//! [`CategoryLevel::detect`].

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(#{1,6})\s+(.+?)\s*$").expect("valid heading pattern"));

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*+]\s+(.+)").expect("valid bullet pattern"));

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n?").expect("valid line break pattern"));

/// Minimum number of headings at a level for it to count as structure
const MIN_CATEGORY_HEADINGS: usize = 3;

/// Minimum number of sub-headings before bullets are used instead
const MIN_SUB_HEADINGS: usize = 2;

/// A Markdown heading found on a given line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub line: usize,
    pub level: usize,
    pub title: String,
}

/// A category detected in the outline, with its raw item titles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineCategory {
    pub title: String,
    pub items: Vec<String>,
}

/// Heading level used for top-level grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryLevel {
    Level1,
    Level2,
    Level3,
    NoStructure,
}

/// Number of headings found at each level (index 1..=6)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LevelCounts([usize; 7]);

impl LevelCounts {
    pub fn from_headings(headings: &[Heading]) -> Self {
        let mut counts = [0usize; 7];
        for heading in headings {
            counts[heading.level] += 1;
        }
        Self(counts)
    }

    /// Headings seen at `level`
    pub fn at(&self, level: usize) -> usize {
        self.0.get(level).copied().unwrap_or(0)
    }
}

type LevelRule = (fn(&LevelCounts) -> bool, CategoryLevel);

fn many_h1(c: &LevelCounts) -> bool {
    c.at(1) >= MIN_CATEGORY_HEADINGS
}

fn single_h1_many_h2(c: &LevelCounts) -> bool {
    c.at(1) == 1 && c.at(2) >= MIN_CATEGORY_HEADINGS
}

fn many_h2(c: &LevelCounts) -> bool {
    c.at(2) >= MIN_CATEGORY_HEADINGS
}

fn many_h3(c: &LevelCounts) -> bool {
    c.at(3) >= MIN_CATEGORY_HEADINGS
}

/// Evaluated in order, first match wins
const LEVEL_RULES: &[LevelRule] = &[
    (many_h1, CategoryLevel::Level1),
    (single_h1_many_h2, CategoryLevel::Level2),
    (many_h2, CategoryLevel::Level2),
    (many_h3, CategoryLevel::Level3),
];

impl CategoryLevel {
    /// Picks the category level for the given heading counts
    pub fn detect(counts: &LevelCounts) -> Self {
        LEVEL_RULES
            .iter()
            .find(|(matches, _)| matches(counts))
            .map(|(_, level)| *level)
            .unwrap_or(CategoryLevel::NoStructure)
    }

    /// Markdown heading depth, or None when no structure was detected
    pub fn depth(self) -> Option<usize> {
        match self {
            CategoryLevel::Level1 => Some(1),
            CategoryLevel::Level2 => Some(2),
            CategoryLevel::Level3 => Some(3),
            CategoryLevel::NoStructure => None,
        }
    }
}

/// Rewrites `\r\n` and lone `\r` line breaks as `\n`
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    LINE_BREAK_RE.replace_all(text, "\n")
}

/// Parses a single line as a Markdown heading
pub fn parse_heading(line: &str) -> Option<(usize, String)> {
    let caps = HEADING_RE.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let title = caps.get(2)?.as_str().trim().to_string();
    Some((level, title))
}

/// Collects every heading in document order
pub fn find_headings(lines: &[&str]) -> Vec<Heading> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(line, text)| {
            parse_heading(text).map(|(level, title)| Heading { line, level, title })
        })
        .collect()
}

/// Extracts the category outline from `text`
///
/// Returns an empty list when no usable structure exists.
pub fn extract_outline(text: &str) -> Vec<OutlineCategory> {
    let text = normalize_line_endings(text);
    let lines: Vec<&str> = text.lines().collect();
    let headings = find_headings(&lines);
    if headings.is_empty() {
        return Vec::new();
    }

    let level = match CategoryLevel::detect(&LevelCounts::from_headings(&headings)).depth() {
        Some(level) => level,
        None => return Vec::new(),
    };

    headings
        .iter()
        .filter(|h| h.level == level)
        .map(|heading| {
            let end = headings
                .iter()
                .find(|other| other.line > heading.line && other.level <= level)
                .map(|other| other.line)
                .unwrap_or(lines.len());

            let mut items: Vec<String> = headings
                .iter()
                .filter(|h| h.line > heading.line && h.line < end && h.level == level + 1)
                .map(|h| h.title.clone())
                .collect();

            if items.len() < MIN_SUB_HEADINGS {
                items = bullet_items(&lines[heading.line + 1..end]);
            }

            OutlineCategory {
                title: heading.title.clone(),
                items,
            }
        })
        .collect()
}

fn bullet_items(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| BULLET_RE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}
