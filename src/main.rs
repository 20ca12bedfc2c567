//! Blockscape CLI - structured maps from Markdown documents

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = blockscape::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
