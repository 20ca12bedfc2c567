//! Blockscape - structured maps from Markdown documents
//!
//! Blockscape reads a Markdown document and produces a "map": a JSON tree of
//! categories and items summarizing it. Generation is deterministic and
//! local, driven by the document's heading outline, keyword frequencies and
//! a fixed default vocabulary.

pub mod domain;
pub mod skill;
pub mod storage;
pub mod cli;

pub use domain::{generate, Category, Item, MapOutput, MapRequest, Model};
