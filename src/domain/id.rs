//! Slug-based identifiers for maps, categories and items
//!
//! ID Format:
//! - Lowercase ASCII letters and digits separated by single hyphens
//!   (e.g., `api-access`, `core-processing-2`)
//! - Accents are folded away before normalizing (`Café` becomes `cafe`)
//! - A name with no usable characters becomes `item`
//!
//! Uniqueness is scoped to an [`IdAllocator`]. The builder keeps one allocator
//! for category ids and another for item ids, both living only for the
//! duration of a single model build.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

/// Slug used when a name has nothing left after normalizing
pub const FALLBACK_SLUG: &str = "item";

/// Normalizes a display name without substituting the fallback
///
/// Returns an empty string when nothing alphanumeric survives.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.nfkd().filter(char::is_ascii) {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Converts a display name into a URL-safe slug
pub fn slugify(text: &str) -> String {
    let slug = normalize(text);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Returns true if `id` is a well-formed slug
pub fn is_valid_slug(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('-')
        && !id.ends_with('-')
        && !id.contains("--")
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Hands out slugs that are unique within its scope
///
/// Collisions get a numeric suffix starting at 2: `trust`, `trust-2`,
/// `trust-3`. Every allocated id is registered before it is returned.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    /// Creates an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a unique id for the given display name
    pub fn allocate(&mut self, name: &str) -> String {
        let slug = slugify(name);
        if self.used.insert(slug.clone()) {
            return slug;
        }

        let mut suffix = 2u32;
        loop {
            let candidate = format!("{}-{}", slug, suffix);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Registers an id chosen elsewhere so later allocations avoid it
    pub fn reserve(&mut self, id: impl Into<String>) {
        self.used.insert(id.into());
    }
}
