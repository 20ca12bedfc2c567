//! Title and abstract derivation

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::keywords::title_case;
use super::outline::normalize_line_endings;

/// Title used when neither the content nor a file name provide one
pub const DEFAULT_TITLE: &str = "Blockscape Map";

/// Shortest first paragraph accepted as an abstract, in characters
pub const MIN_ABSTRACT_CHARS: usize = 40;

static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#\s+(.+)").expect("valid h1 pattern"));

static HEADING_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*#+\s+").expect("valid heading marker pattern"));

static BLANK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph pattern"));

/// Returns the first level-1 heading anywhere in the text
pub fn title_from_content(text: &str) -> Option<String> {
    normalize_line_endings(text)
        .lines()
        .filter_map(|line| H1_RE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .find(|title| !title.is_empty())
}

/// Builds a display title from a file name (`road_map-v2.md` -> `Road Map V2`)
pub fn title_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let spaced = stem.replace(['_', '-'], " ");
    let title = title_case(&spaced);
    if title.trim().is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Picks the title hint: content heading, then file name, then the default
pub fn derive_title(text: &str, file_path: Option<&Path>) -> String {
    title_from_content(text)
        .or_else(|| file_path.and_then(title_from_path))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Returns the first blank-line-delimited paragraph that is not only headings
///
/// Heading markers inside a mixed paragraph are dropped and whitespace is
/// collapsed to single spaces.
pub fn first_paragraph(text: &str) -> Option<String> {
    let normalized = normalize_line_endings(text);

    BLANK_LINE_RE.split(&normalized).find_map(|chunk| {
        let lines: Vec<&str> = chunk.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.iter().all(|l| HEADING_MARKER_RE.is_match(l)) {
            return None;
        }

        let joined = lines
            .iter()
            .map(|l| HEADING_MARKER_RE.replace(l, "").trim().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let cleaned = joined.split_whitespace().collect::<Vec<_>>().join(" ");

        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    })
}

/// Synthesized abstract for documents without a usable first paragraph
pub fn fallback_abstract(title_hint: &str) -> String {
    format!(
        "Users want reliable {} outcomes delivered through clear experiences, \
         supported by core capabilities, data services, and dependable infrastructure.",
        title_hint.to_lowercase()
    )
}

/// Derives the abstract for a model
pub fn derive_abstract(text: &str, title_hint: &str) -> String {
    match first_paragraph(text) {
        Some(paragraph) if paragraph.chars().count() >= MIN_ABSTRACT_CHARS => paragraph,
        _ => fallback_abstract(title_hint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_prefers_h1() {
        let text = "intro\n## Not this\n# Platform Plan\n";
        assert_eq!(derive_title(text, Some(Path::new("notes.md"))), "Platform Plan");
    }

    #[test]
    fn title_from_file_name() {
        let text = "no headings here";
        assert_eq!(
            derive_title(text, Some(Path::new("/tmp/road_map-v2.md"))),
            "Road Map V2"
        );
    }

    #[test]
    fn title_default() {
        assert_eq!(derive_title("", None), DEFAULT_TITLE);
        assert_eq!(derive_title("## only h2", None), DEFAULT_TITLE);
    }

    #[test]
    fn first_paragraph_skips_heading_blocks() {
        let text = "# Title\n\nFirst   real\nparagraph here.\n\nSecond.";
        assert_eq!(first_paragraph(text).as_deref(), Some("First real paragraph here."));
    }

    #[test]
    fn first_paragraph_strips_markers_in_mixed_block() {
        let text = "## Heading\nBody line";
        assert_eq!(first_paragraph(text).as_deref(), Some("Heading Body line"));
    }

    #[test]
    fn lone_carriage_returns_split_lines() {
        let text = "intro\r# Mac Notes\r\rBody text\rcontinues.";
        assert_eq!(title_from_content(text).as_deref(), Some("Mac Notes"));
        assert_eq!(first_paragraph(text).as_deref(), Some("intro Mac Notes"));
        assert_eq!(
            first_paragraph("# Mac Notes\r\rBody text\rcontinues.").as_deref(),
            Some("Body text continues.")
        );
    }

    #[test]
    fn first_paragraph_none_for_empty() {
        assert_eq!(first_paragraph(""), None);
        assert_eq!(first_paragraph("\n\n   \n"), None);
        assert_eq!(first_paragraph("# Only\n\n## Headings"), None);
    }

    #[test]
    fn short_paragraph_uses_fallback() {
        let abstract_text = derive_abstract("Too short.", "Payments");
        assert_eq!(abstract_text, fallback_abstract("Payments"));
        assert!(abstract_text.contains("reliable payments outcomes"));
    }

    #[test]
    fn long_paragraph_kept() {
        let text = "This paragraph is comfortably longer than forty characters in total.";
        assert_eq!(derive_abstract(text, "X"), text);
    }

    #[test]
    fn fallback_mentions_lowercase_title() {
        assert!(fallback_abstract(DEFAULT_TITLE).contains("blockscape map"));
    }
}
