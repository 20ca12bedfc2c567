//! Convert command - `.bs` files to Markdown companions

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use super::output::Output;
use crate::storage::{convert_file, iter_bs_files};

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Directory to scan recursively
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Markdown template containing '{json}' and optionally '{mdfilename}'
    #[arg(long)]
    pub md_template: Option<PathBuf>,

    /// Rewrite outputs even when the target -bs.md file already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// Converts every `.bs` file under `root`, returning the written paths
///
/// Failures are reported and skipped.
pub fn convert_tree(
    root: &Path,
    md_template: Option<&Path>,
    overwrite: bool,
    output: &Output,
) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for path in iter_bs_files(root) {
        match convert_file(&path, md_template, overwrite) {
            Ok(Some(out)) => {
                output.verbose_ctx("convert", &format!("Wrote {}", out.display()));
                written.push(out);
            }
            Ok(None) => {
                output.verbose_ctx("convert", &format!("Skipped {} (output exists)", path.display()));
            }
            Err(e) => output.error(&format!("failed to convert {}: {:#}", path.display(), e)),
        }
    }
    written
}

/// Run the convert command
pub fn run(args: ConvertArgs, output: &Output) -> Result<()> {
    let written = convert_tree(&args.root, args.md_template.as_deref(), args.overwrite, output);

    if written.is_empty() {
        anyhow::bail!("No .bs files converted under {}", args.root.display());
    }

    if output.is_json() {
        let paths: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
        output.data(&serde_json::json!({ "written": paths }));
    } else {
        for path in &written {
            println!("Wrote {}", path.display());
        }
        output.success(&format!("Converted {} file(s)", written.len()));
    }

    Ok(())
}
