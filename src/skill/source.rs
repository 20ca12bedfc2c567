//! Source loading for planned requests

use std::fs;

use anyhow::{Context, Result};

use super::planner::SkillPlan;
use crate::domain::MapRequest;

/// Reads a file as text, dropping invalid UTF-8 sequences
pub fn read_lossy(path: &std::path::Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read source: {}", path.display()))?;
    Ok(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect())
}

/// Builds the generator request for a plan
///
/// With a referenced file its contents are the document; otherwise the
/// request text itself is.
pub fn load_source(plan: &SkillPlan) -> Result<MapRequest> {
    let request = match &plan.file_path {
        Some(path) => MapRequest::new(read_lossy(path)?).with_file_path(path),
        None => MapRequest::new(plan.user_text.clone()),
    };

    Ok(request
        .series(plan.want_series)
        .stage_model(plan.want_stage_model))
}
