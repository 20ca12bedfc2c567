//! Request planning
//!
//! Reads a free-form request and decides which file it refers to and which
//! output mode it asks for.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static PATH_HINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:file|path)\s*:\s*(.+)").expect("valid path hint pattern"));

static PAREN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+)\)").expect("valid parenthesis pattern"));

static SERIES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bseries\b").expect("valid series pattern"));

static STAGE_MODEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bwardley\b").expect("valid wardley pattern"));

/// Characters stripped from both ends of a candidate path
const TOKEN_TRIM: &[char] = &['"', '\'', '(', ')', '[', ']', '<', '>', '.', ',', ';', ':'];

/// What a request asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillPlan {
    /// The request, trimmed
    pub user_text: String,
    /// Existing file referenced by the request
    pub file_path: Option<PathBuf>,
    /// Emit a Current/Target pair
    pub want_series: bool,
    /// Annotate items with evolution stages
    pub want_stage_model: bool,
}

fn clean_token(token: &str) -> &str {
    token.trim().trim_matches(TOKEN_TRIM)
}

fn existing_file(candidate: &str) -> Option<PathBuf> {
    let candidate = clean_token(candidate);
    if candidate.is_empty() {
        return None;
    }
    let path = Path::new(candidate);
    if path.is_file() {
        Some(path.to_path_buf())
    } else {
        None
    }
}

/// Finds the first existing file referenced by the request
///
/// Checked in order: the whole request as a single token, `file:`/`path:`
/// hints, parenthesized groups, then every whitespace-separated token.
pub fn find_existing_path(text: &str) -> Option<PathBuf> {
    let trimmed = text.trim();
    if !trimmed.contains(char::is_whitespace) {
        if let Some(path) = existing_file(trimmed) {
            return Some(path);
        }
    }

    let from_hint = text
        .lines()
        .filter_map(|line| PATH_HINT_RE.captures(line))
        .filter_map(|caps| caps.get(1))
        .find_map(|m| existing_file(m.as_str()));
    if from_hint.is_some() {
        return from_hint;
    }

    let from_parens = PAREN_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| existing_file(m.as_str()));
    if from_parens.is_some() {
        return from_parens;
    }

    text.split_whitespace()
        .find_map(|token| existing_file(token.trim_start_matches('@')))
}

/// Plans a request
pub fn plan(request: &str) -> SkillPlan {
    let user_text = request.trim().to_string();
    SkillPlan {
        file_path: find_existing_path(&user_text),
        want_series: SERIES_RE.is_match(&user_text),
        want_stage_model: STAGE_MODEL_RE.is_match(&user_text),
        user_text,
    }
}
