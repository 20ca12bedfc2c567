//! Domain models for Blockscape
//!
//! Contains the map generator without any I/O concerns. Everything here is a
//! pure function of the document text and request flags.

mod builder;
mod id;
mod keywords;
mod model;
mod outline;
mod summary;

pub use builder::{
    generate, generate_model, generate_series, stage_for, DefaultCategory, MapRequest,
    SeriesLabel, DEFAULT_CATEGORIES, TARGET_ABSTRACT_CLAUSE,
};
pub use id::{is_valid_slug, normalize, slugify, IdAllocator, FALLBACK_SLUG};
pub use keywords::{extract_keywords, title_case, KeywordCursor, DEFAULT_KEYWORD_LIMIT};
pub use model::{
    to_canonical_json, Category, Item, MapOutput, Model, MAX_ITEMS, MAX_STAGE, MIN_ITEMS,
    MIN_STAGE,
};
pub use outline::{extract_outline, CategoryLevel, Heading, LevelCounts, OutlineCategory};
pub use summary::{
    derive_abstract, derive_title, fallback_abstract, first_paragraph, title_from_content,
    title_from_path, DEFAULT_TITLE, MIN_ABSTRACT_CHARS,
};
