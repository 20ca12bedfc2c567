//! Generate and ask commands

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use super::output::Output;
use crate::domain::{generate, MapRequest};
use crate::skill::{execute, plan, read_lossy};
use crate::storage::{write_output, CompanionFormat, Config};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Markdown file to map (reads stdin when neither a file nor --text is given)
    pub file: Option<PathBuf>,

    /// Map this text instead of a file
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Emit a Current/Target pair
    #[arg(long)]
    pub series: bool,

    /// Annotate items with evolution stages (1-4)
    #[arg(long)]
    pub stage_model: bool,

    /// Write the companion file next to the source instead of printing
    #[arg(long, requires = "file")]
    pub write: bool,

    /// Companion format used with --write
    #[arg(long, value_enum)]
    pub output_format: Option<CompanionFormat>,

    /// Markdown template containing a '{json}' placeholder (md format only)
    #[arg(long)]
    pub md_template: Option<PathBuf>,
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text)
}

/// Builds the generator request from a file, inline text or stdin
fn build_request(file: Option<&Path>, text: Option<String>) -> Result<MapRequest> {
    match (file, text) {
        (Some(path), _) => Ok(MapRequest::new(read_lossy(path)?).with_file_path(path)),
        (None, Some(text)) => Ok(MapRequest::new(text)),
        (None, None) => Ok(MapRequest::new(read_stdin()?)),
    }
}

/// Run the generate command
pub fn run(args: GenerateArgs, output: &Output) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let config = Config::load(&cwd)?;

    let request = build_request(args.file.as_deref(), args.text)?
        .series(args.series || config.generate.series)
        .stage_model(args.stage_model || config.generate.stage_model);

    output.verbose_ctx(
        "generate",
        &format!(
            "title={:?}, series={}, stage_model={}, {} bytes",
            request.title_hint(),
            request.want_series,
            request.want_stage_model,
            request.text.len()
        ),
    );

    let json = generate(&request).to_canonical_json();

    if !args.write {
        output.map(&json);
        return Ok(());
    }

    let source = args
        .file
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--write requires a source file"))?;
    let format = args.output_format.unwrap_or(config.watch.output_format);
    let template = args.md_template.or(config.watch.md_template);
    let out_path = write_output(source, &json, format, template.as_deref())?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "source": source.display().to_string(),
            "written": out_path.display().to_string(),
            "format": format.as_str(),
        }));
    } else {
        output.success(&format!("Wrote {}", out_path.display()));
    }

    Ok(())
}

/// Run the ask command: plan a free-form request, then execute it
pub fn ask(output: &Output, request: Option<String>, plan_only: bool) -> Result<()> {
    let request = match request {
        Some(request) => request,
        None => read_stdin()?,
    };

    let skill_plan = plan(&request);
    output.verbose_ctx("ask", &format!("plan={:?}", skill_plan));

    if plan_only {
        output.data(&skill_plan);
        return Ok(());
    }

    let json = execute(&skill_plan)?;
    output.map(&json);
    Ok(())
}
