//! Source discovery
//!
//! Walks a directory tree for Markdown documents that still need a
//! companion file. Hidden entries, `__pycache__`, `node_modules` and
//! generated `*-bs.md` files are never candidates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use walkdir::{DirEntry, WalkDir};

use super::companion::{output_exists_for, MD_COMPANION_SUFFIX};
use super::config::CompanionFormat;

/// Directory names never descended into
const SKIPPED_DIRS: &[&str] = &["__pycache__", "node_modules"];

/// Modification time and size, used to detect changed files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSignature {
    pub modified: DateTime<Utc>,
    pub size: u64,
}

impl FileSignature {
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            modified: metadata.modified()?.into(),
            size: metadata.len(),
        })
    }
}

/// Filters applied when scanning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    pub min_bytes: u64,
    pub max_age_days: Option<f64>,
    pub format: CompanionFormat,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Returns false for directories that should not be walked
fn keep_entry(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !is_hidden(entry) && !SKIPPED_DIRS.contains(&name.as_ref())
}

fn walk_files(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(keep_entry)
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && !is_hidden(e))
}

/// Returns true for `.md`/`.markdown` files that are not generated outputs
pub fn is_markdown_source(path: &Path) -> bool {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return false,
    };
    if name.ends_with(MD_COMPANION_SUFFIX) {
        return false;
    }
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            ext == "md" || ext == "markdown"
        })
        .unwrap_or(false)
}

/// Yields Markdown source files under `root`, sorted by name per directory
pub fn iter_md_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    walk_files(root)
        .map(DirEntry::into_path)
        .filter(|p| is_markdown_source(p))
}

/// Yields `.bs` files under `root`
pub fn iter_bs_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    walk_files(root).map(DirEntry::into_path).filter(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase().ends_with(".bs"))
            .unwrap_or(false)
    })
}

/// Finds every Markdown file that still needs a companion
///
/// Files that vanish mid-scan are skipped.
pub fn scan_files(root: &Path, options: &ScanOptions) -> BTreeMap<PathBuf, FileSignature> {
    // An age too large to represent disables the cutoff
    let cutoff = options.max_age_days.and_then(|days| {
        Duration::try_milliseconds((days * 86_400_000.0) as i64)
            .and_then(|age| Utc::now().checked_sub_signed(age))
    });

    iter_md_files(root)
        .filter(|path| !output_exists_for(path, options.format))
        .filter_map(|path| FileSignature::of(&path).ok().map(|sig| (path, sig)))
        .filter(|(_, sig)| sig.size >= options.min_bytes)
        .filter(|(_, sig)| cutoff.map(|c| sig.modified >= c).unwrap_or(true))
        .collect()
}

/// Paths in `current` that are new or changed relative to `seen`
pub fn changed_files(
    seen: &BTreeMap<PathBuf, FileSignature>,
    current: &BTreeMap<PathBuf, FileSignature>,
) -> Vec<PathBuf> {
    current
        .iter()
        .filter(|(path, sig)| seen.get(*path) != Some(*sig))
        .map(|(path, _)| path.clone())
        .collect()
}
