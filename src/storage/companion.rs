//! Companion files written next to source documents
//!
//! A source `notes/plan.md` gets `notes/plan.bs` (raw JSON) or
//! `notes/plan-bs.md` (JSON embedded in a Markdown template). Writes go
//! through a locked temp file and an atomic rename.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use thiserror::Error;

use super::config::CompanionFormat;

/// Template used when no custom Markdown template is configured
pub const DEFAULT_MD_TEMPLATE: &str = "# Blockscape Map of {mdfilename}\n\n```blockscape\n{json}\n```";

/// Suffix of generated Markdown companions
pub const MD_COMPANION_SUFFIX: &str = "-bs.md";

const JSON_PLACEHOLDER: &str = "{json}";
const FILENAME_PLACEHOLDER: &str = "{mdfilename}";

#[derive(Debug, Error, PartialEq)]
pub enum CompanionError {
    #[error("Markdown template must include '{{json}}' placeholder")]
    MissingJsonPlaceholder,
}

/// Returns the companion path for a source file
pub fn build_output_path(source: &Path, format: CompanionFormat) -> PathBuf {
    let mut name = source.with_extension("").into_os_string();
    match format {
        CompanionFormat::Bs => name.push(".bs"),
        CompanionFormat::Md => name.push(MD_COMPANION_SUFFIX),
    }
    PathBuf::from(name)
}

/// Returns true if the companion for `source` already exists
pub fn output_exists_for(source: &Path, format: CompanionFormat) -> bool {
    build_output_path(source, format).exists()
}

/// Loads a Markdown template, or the default when none is given
pub fn load_md_template(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read Markdown template: {}", path.display())),
        None => Ok(DEFAULT_MD_TEMPLATE.to_string()),
    }
}

/// Substitutes the JSON and file name into a template
pub fn render_template(template: &str, json: &str, md_filename: &str) -> Result<String, CompanionError> {
    if !template.contains(JSON_PLACEHOLDER) {
        return Err(CompanionError::MissingJsonPlaceholder);
    }
    Ok(template
        .replace(JSON_PLACEHOLDER, json)
        .replace(FILENAME_PLACEHOLDER, md_filename))
}

/// Formats generated JSON for the given companion format
///
/// The result always ends with exactly one newline.
pub fn format_output(
    output: &str,
    format: CompanionFormat,
    md_template: Option<&Path>,
    md_filename: &str,
) -> Result<String> {
    let cleaned = output.trim_end_matches('\n');
    let mut formatted = match format {
        CompanionFormat::Bs => cleaned.to_string(),
        CompanionFormat::Md => {
            let template = load_md_template(md_template)?;
            render_template(&template, cleaned, md_filename)?
        }
    };
    if !formatted.ends_with('\n') {
        formatted.push('\n');
    }
    Ok(formatted)
}

/// Writes content to `path` atomically (locked temp file + rename)
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.lock_exclusive()
            .context("Failed to acquire write lock on companion file")?;

        let mut writer = BufWriter::new(&file);
        writer
            .write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
        writer.flush().context("Failed to flush companion file")?;
    }

    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

/// Writes the companion for `source` and returns its path
pub fn write_output(
    source: &Path,
    output: &str,
    format: CompanionFormat,
    md_template: Option<&Path>,
) -> Result<PathBuf> {
    let out_path = build_output_path(source, format);
    let md_filename = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let formatted = format_output(output, format, md_template, &md_filename)?;
    write_atomic(&out_path, &formatted)?;
    Ok(out_path)
}

/// Converts one `.bs` file to its `-bs.md` companion
///
/// Returns `None` when the output exists and `overwrite` is false.
pub fn convert_file(path: &Path, md_template: Option<&Path>, overwrite: bool) -> Result<Option<PathBuf>> {
    let out_path = build_output_path(path, CompanionFormat::Md);
    if !overwrite && out_path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let md_filename = format!("{}.md", stem);

    let formatted = format_output(&json, CompanionFormat::Md, md_template, &md_filename)?;
    write_atomic(&out_path, &formatted)?;
    Ok(Some(out_path))
}
