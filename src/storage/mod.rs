//! # Storage Layer
//!
//! Filesystem concerns around the generator.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Sources | Markdown | any `*.md` / `*.markdown` under the root |
//! | Raw map | JSON | `{name}.bs` next to the source |
//! | Markdown map | JSON in a template | `{name}-bs.md` next to the source |
//! | Config | TOML | `blockscape.toml` in the root, or the global config dir |
//!
//! ## Concurrency Safety
//!
//! - Companion writes are atomic (locked temp file + rename)
//! - Scans tolerate files disappearing mid-walk
//!
//! ## Key Types
//!
//! - [`Config`] - Watch and generation settings
//! - [`FileSignature`] - Change detection for watched sources
//! - [`CompanionFormat`] - Which companion file is written

mod companion;
mod config;
mod scan;

pub use companion::{
    build_output_path, convert_file, format_output, load_md_template, output_exists_for,
    render_template, write_atomic, write_output, CompanionError, DEFAULT_MD_TEMPLATE,
    MD_COMPANION_SUFFIX,
};
pub use config::{CompanionFormat, Config, ConfigError, GenerateConfig, WatchConfig, PROJECT_CONFIG_FILE};
pub use scan::{
    changed_files, is_markdown_source, iter_bs_files, iter_md_files, scan_files, FileSignature,
    ScanOptions,
};
