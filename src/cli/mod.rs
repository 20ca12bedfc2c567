//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose | Example |
//! |---------|---------|---------|
//! | `generate` | Map one document | `blockscape generate docs/plan.md --stage-model` |
//! | `ask` | Plan and run a free-form request | `blockscape ask "series for file: plan.md"` |
//! | `watch` | Write maps for new documents | `blockscape watch --root notes --initial` |
//! | `convert` | Wrap `.bs` files in Markdown | `blockscape convert notes --overwrite` |
//!
//! ## Output Formats
//!
//! Maps are always printed as canonical JSON. Status messages honour the
//! `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! blockscape --verbose watch --root notes
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod convert;
mod generate;
mod output;
mod watch;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
