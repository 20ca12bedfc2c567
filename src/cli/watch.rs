//! Directory watcher
//!
//! Watches a directory tree for Markdown documents and writes a companion map
//! for every document that lacks one. Existing documents are only processed
//! with `--initial`; after that, each debounced batch of filesystem events
//! triggers a rescan and every new or changed candidate is processed.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;

use super::output::Output;
use crate::domain::{generate, MapRequest};
use crate::skill::read_lossy;
use crate::storage::{
    changed_files, scan_files, write_output, CompanionFormat, Config,
    FileSignature, ScanOptions, WatchConfig,
};

/// Maximum log file size before rotation (1MB)
const MAX_LOG_SIZE: u64 = 1024 * 1024;

/// Number of log files to keep
const LOG_ROTATION_COUNT: usize = 7;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Root directory to watch
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Ignore markdown files smaller than this many bytes
    #[arg(long)]
    pub min_bytes: Option<u64>,

    /// Ignore markdown files last modified more than this many days ago
    #[arg(long)]
    pub max_age_days: Option<f64>,

    /// Debounce delay for filesystem events in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Process existing files on startup
    #[arg(long)]
    pub initial: bool,

    /// Skip the confirmation prompt for --initial
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Process pending files once and exit instead of watching
    #[arg(long)]
    pub once: bool,

    /// File format to write alongside source markdown
    #[arg(long, value_enum)]
    pub output_format: Option<CompanionFormat>,

    /// Markdown template containing a '{json}' placeholder (md format only)
    #[arg(long)]
    pub md_template: Option<PathBuf>,

    /// Append watcher activity to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Emit Current/Target pairs
    #[arg(long)]
    pub series: bool,

    /// Annotate items with evolution stages (1-4)
    #[arg(long)]
    pub stage_model: bool,
}

/// Effective watcher settings after merging config and flags
#[derive(Debug, Clone)]
struct WatchSettings {
    root: PathBuf,
    watch: WatchConfig,
    series: bool,
    stage_model: bool,
}

impl WatchSettings {
    fn resolve(args: WatchArgs) -> Result<Self> {
        let root = fs::canonicalize(&args.root)
            .with_context(|| format!("Root directory not found: {}", args.root.display()))?;
        let config = Config::load(&root)?;

        let mut watch = config.watch;
        if let Some(min_bytes) = args.min_bytes {
            watch.min_bytes = min_bytes;
        }
        if args.max_age_days.is_some() {
            watch.max_age_days = args.max_age_days;
        }
        if let Some(debounce_ms) = args.debounce_ms {
            watch.debounce_ms = debounce_ms;
        }
        if let Some(format) = args.output_format {
            watch.output_format = format;
        }
        if args.md_template.is_some() {
            watch.md_template = args.md_template;
        }
        if args.log_file.is_some() {
            watch.log_file = args.log_file;
        }
        watch.validate()?;

        Ok(Self {
            root,
            watch,
            series: args.series || config.generate.series,
            stage_model: args.stage_model || config.generate.stage_model,
        })
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            min_bytes: self.watch.min_bytes,
            max_age_days: self.watch.max_age_days,
            format: self.watch.output_format,
        }
    }

    fn scan(&self) -> BTreeMap<PathBuf, FileSignature> {
        scan_files(&self.root, &self.scan_options())
    }
}

/// Reports watcher activity to stderr and the optional log file
struct WatchLog<'a> {
    output: &'a Output,
    log_file: Option<PathBuf>,
}

impl<'a> WatchLog<'a> {
    fn new(output: &'a Output, log_file: Option<PathBuf>) -> Self {
        Self { output, log_file }
    }

    /// Diagnostics that never reach the log file
    fn debug(&self, message: &str) {
        self.output.verbose_ctx("watch", message);
    }

    fn info(&self, message: &str) {
        self.output.verbose_ctx("watch", message);
        self.append(message);
    }

    fn error(&self, message: &str) {
        self.output.error(message);
        self.append(&format!("ERROR: {}", message));
    }

    fn append(&self, message: &str) {
        if let Some(path) = &self.log_file {
            if let Err(e) = log_message(path, message) {
                self.output.verbose_ctx("watch", &format!("Log write failed: {:#}", e));
            }
        }
    }
}

/// Appends a timestamped line to the log file
fn log_message(log_path: &Path, message: &str) -> Result<()> {
    rotate_logs_if_needed(log_path)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "[{}] {}", timestamp, message)?;

    Ok(())
}

/// Path of the `index`-th rotated log (`watch.log.1`, `watch.log.2`, ...)
fn rotated_path(log_path: &Path, index: usize) -> PathBuf {
    let mut name = log_path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Rotates log files if the current log exceeds MAX_LOG_SIZE
fn rotate_logs_if_needed(log_path: &Path) -> Result<()> {
    let metadata = match fs::metadata(log_path) {
        Ok(metadata) => metadata,
        Err(_) => return Ok(()),
    };
    if metadata.len() < MAX_LOG_SIZE {
        return Ok(());
    }

    for i in (1..LOG_ROTATION_COUNT).rev() {
        let old_path = rotated_path(log_path, i);
        if old_path.exists() {
            if i + 1 >= LOG_ROTATION_COUNT {
                fs::remove_file(&old_path)?;
            } else {
                fs::rename(&old_path, rotated_path(log_path, i + 1))?;
            }
        }
    }

    fs::rename(log_path, rotated_path(log_path, 1))?;

    Ok(())
}

/// Generates and writes the companion for one source file
fn process_file(path: &Path, settings: &WatchSettings) -> Result<PathBuf> {
    let request = MapRequest::new(read_lossy(path)?)
        .with_file_path(path)
        .series(settings.series)
        .stage_model(settings.stage_model);

    let json = generate(&request).to_canonical_json();
    write_output(
        path,
        &json,
        settings.watch.output_format,
        settings.watch.md_template.as_deref(),
    )
}

/// Processes each path, logging failures without stopping
fn process_all(paths: &[PathBuf], settings: &WatchSettings, log: &WatchLog) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for path in paths {
        match process_file(path, settings) {
            Ok(out_path) => {
                log.info(&format!("Wrote {}", out_path.display()));
                written.push(out_path);
            }
            Err(e) => log.error(&format!("failed to process {}: {:#}", path.display(), e)),
        }
    }
    written
}

/// Builds the confirmation prompt shown before `--initial` processing
fn confirmation_prompt(file_count: usize, min_bytes: u64, max_age_days: Option<f64>) -> String {
    let suffix = if file_count == 1 { "" } else { "s" };
    let age_clause = match max_age_days {
        Some(days) => {
            let unit = if days == 1.0 { "day" } else { "days" };
            format!(", modified within {} {}", days, unit)
        }
        None => String::new(),
    };
    format!(
        "--initial will process {} markdown file{} (>= {} bytes{}). Continue? [y/N]: ",
        file_count, suffix, min_bytes, age_clause
    )
}

/// Returns true if the answer confirms
fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn confirm_initial_processing(prompt: &str) -> bool {
    eprint!("{}", prompt);
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_confirmation(&answer),
    }
}

/// Run the watch command
pub fn run(args: WatchArgs, output: &Output) -> Result<()> {
    let initial = args.initial;
    let yes = args.yes;
    let once = args.once;
    let settings = WatchSettings::resolve(args)?;
    let log = WatchLog::new(output, settings.watch.log_file.clone());

    let mut seen = settings.scan();
    log.info(&format!(
        "Found {} pending file(s) under {}",
        seen.len(),
        settings.root.display()
    ));

    let mut written = Vec::new();
    if initial {
        let pending: Vec<PathBuf> = seen.keys().cloned().collect();
        let prompt =
            confirmation_prompt(pending.len(), settings.watch.min_bytes, settings.watch.max_age_days);
        if !yes && !confirm_initial_processing(&prompt) {
            anyhow::bail!("Cancelled");
        }
        written = process_all(&pending, &settings, &log);
    }

    if once {
        if output.is_json() {
            let paths: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
            output.data(&serde_json::json!({ "written": paths }));
        } else {
            output.success(&format!("Processed {} file(s)", written.len()));
        }
        return Ok(());
    }

    // Files written during --initial no longer show up as pending
    seen = settings.scan();
    run_watch_loop(&settings, &log, seen)
}

/// Rescans the root and processes every candidate new or changed since `seen`
///
/// Returns the scan the next batch is compared against. Processed files own
/// a companion afterwards and drop out of it, so removing that companion
/// makes the source a new candidate again.
fn rescan_and_process(
    settings: &WatchSettings,
    log: &WatchLog,
    seen: &BTreeMap<PathBuf, FileSignature>,
) -> BTreeMap<PathBuf, FileSignature> {
    let current = settings.scan();
    let changed = changed_files(seen, &current);
    if changed.is_empty() {
        return current;
    }

    log.info(&format!("{} file(s) to process", changed.len()));
    process_all(&changed, settings, log);
    settings.scan()
}

/// The main loop that watches for changes and writes companions
fn run_watch_loop(
    settings: &WatchSettings,
    log: &WatchLog,
    mut seen: BTreeMap<PathBuf, FileSignature>,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let debounce_duration = Duration::from_millis(settings.watch.debounce_ms);

    let mut debouncer = new_debouncer(debounce_duration, tx)?;
    debouncer
        .watcher()
        .watch(&settings.root, RecursiveMode::Recursive)?;

    log.info(&format!(
        "Watching {} (debounce: {}ms, format: {})",
        settings.root.display(),
        settings.watch.debounce_ms,
        settings.watch.output_format.as_str()
    ));

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if events.is_empty() {
                    continue;
                }
                log.debug(&format!("Received {} event(s), rescanning", events.len()));
                seen = rescan_and_process(settings, log, &seen);
            }
            Ok(Err(error)) => {
                log.error(&format!("Watch error: {:?}", error));
            }
            Err(e) => {
                log.error(&format!("Channel error: {}", e));
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prompt_wording() {
        assert_eq!(
            confirmation_prompt(1, 5000, None),
            "--initial will process 1 markdown file (>= 5000 bytes). Continue? [y/N]: "
        );
        assert_eq!(
            confirmation_prompt(3, 10, Some(1.0)),
            "--initial will process 3 markdown files (>= 10 bytes, modified within 1 day). Continue? [y/N]: "
        );
        assert!(confirmation_prompt(2, 0, Some(2.5)).contains("within 2.5 days"));
    }

    #[test]
    fn confirmation_answers() {
        assert!(is_confirmation("y\n"));
        assert!(is_confirmation(" YES "));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("no"));
    }

    #[test]
    fn rotated_paths() {
        let log = Path::new("/tmp/watch.log");
        assert_eq!(rotated_path(log, 1), PathBuf::from("/tmp/watch.log.1"));
        assert_eq!(rotated_path(log, 7), PathBuf::from("/tmp/watch.log.7"));
    }

    #[test]
    fn log_rotation_moves_large_log() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("watch.log");
        fs::write(&log, vec![b'x'; MAX_LOG_SIZE as usize]).unwrap();

        log_message(&log, "after rotation").unwrap();

        assert!(rotated_path(&log, 1).exists());
        let current = fs::read_to_string(&log).unwrap();
        assert!(current.ends_with("] after rotation\n"));
    }

    #[test]
    fn process_file_writes_companion() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("ops_guide.md");
        fs::write(&src, "Operations guide without headings.").unwrap();

        let settings = WatchSettings {
            root: dir.path().to_path_buf(),
            watch: WatchConfig {
                output_format: CompanionFormat::Md,
                ..WatchConfig::default()
            },
            series: false,
            stage_model: true,
        };

        let out = process_file(&src, &settings).unwrap();
        assert_eq!(out, dir.path().join("ops_guide-bs.md"));
        let content = fs::read_to_string(out).unwrap();
        assert!(content.starts_with("# Blockscape Map of ops_guide.md\n\n```blockscape\n{"));
        assert!(content.contains("\"title\": \"Ops Guide Blockscape\""));
        assert!(content.contains("\"stage\": 1"));
        assert!(content.ends_with("}\n```\n"));
    }

    #[test]
    fn rescan_regenerates_deleted_companion() {
        let dir = TempDir::new().unwrap();
        let settings = WatchSettings {
            root: dir.path().to_path_buf(),
            watch: WatchConfig {
                min_bytes: 1,
                ..WatchConfig::default()
            },
            series: false,
            stage_model: false,
        };
        let output = Output::new(crate::cli::OutputFormat::Text, false);
        let log = WatchLog::new(&output, None);

        let src = dir.path().join("notes.md");
        let companion = dir.path().join("notes.bs");
        fs::write(&src, "# Notes\n\nFirst draft.").unwrap();

        let seen = rescan_and_process(&settings, &log, &BTreeMap::new());
        assert!(companion.is_file());
        assert!(!seen.contains_key(&src));

        fs::write(&companion, "{}").unwrap();
        let seen = rescan_and_process(&settings, &log, &seen);
        assert_eq!(fs::read_to_string(&companion).unwrap(), "{}");

        fs::remove_file(&companion).unwrap();
        let seen = rescan_and_process(&settings, &log, &seen);
        assert!(fs::read_to_string(&companion).unwrap().contains("\"id\": \"notes\""));
        assert!(seen.is_empty());
    }

    #[test]
    fn rescan_keeps_failed_files_until_they_change() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("broken.tpl");
        fs::write(&template, "no placeholder").unwrap();
        let settings = WatchSettings {
            root: dir.path().to_path_buf(),
            watch: WatchConfig {
                min_bytes: 1,
                output_format: CompanionFormat::Md,
                md_template: Some(template),
                ..WatchConfig::default()
            },
            series: false,
            stage_model: false,
        };
        let output = Output::new(crate::cli::OutputFormat::Text, false);
        let log = WatchLog::new(&output, None);

        let src = dir.path().join("notes.md");
        fs::write(&src, "# Notes").unwrap();

        let seen = rescan_and_process(&settings, &log, &BTreeMap::new());
        assert!(seen.contains_key(&src));
        assert!(changed_files(&seen, &settings.scan()).is_empty());
    }
}
