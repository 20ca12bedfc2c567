//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{convert, generate, watch};

#[derive(Parser)]
#[command(name = "blockscape")]
#[command(author, version, about = "Turns Markdown documents into Blockscape maps")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format for status messages
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a map from a Markdown file, inline text or stdin
    Generate(generate::GenerateArgs),

    /// Plan and run a free-form request ("series", "wardley", "file: <path>")
    Ask {
        /// The request (reads stdin when omitted)
        request: Option<String>,

        /// Print the plan instead of running it
        #[arg(long)]
        plan: bool,
    },

    /// Watch a directory and write maps for new Markdown documents
    Watch(watch::WatchArgs),

    /// Convert .bs files to Markdown companions
    Convert(convert::ConvertArgs),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("Blockscape CLI starting");

    match cli.command {
        Commands::Generate(args) => {
            output.verbose_ctx("generate", &format!("Generating map: {:?}", args));
            generate::run(args, &output)?
        }

        Commands::Ask { request, plan } => generate::ask(&output, request, plan)?,

        Commands::Watch(args) => {
            output.verbose_ctx("watch", &format!("Starting watcher: {:?}", args));
            watch::run(args, &output)?
        }

        Commands::Convert(args) => {
            output.verbose_ctx("convert", &format!("Converting under: {}", args.root.display()));
            convert::run(args, &output)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
