//! contract-lint CLI tool.
//!
//! Usage:
//! ```bash
//! contract-lint scan [OPTIONS] [PATH]
//! contract-lint fix [--apply] [--kinds a,b] [PATH]
//! contract-lint imports [PATH]
//! contract-lint list-rules
//! contract-lint init
//! ```
//!
//! Exit codes: 0 when the run passes, 1 when it fails its verdict, 2 on
//! configuration or internal errors.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Structural linter and rewriter for Python Protocol interface files
#[derive(Parser)]
#[command(name = "contract-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check interface files for violations
    Scan {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated names or codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Propose or apply type-annotation rewrites
    Fix {
        /// Path to rewrite (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write the rewrites, keeping a backup of each changed file
        #[arg(long)]
        apply: bool,

        /// Only these transformation kinds (comma-separated)
        #[arg(long)]
        kinds: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Build the import graph and report cycles
    Imports {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for run reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output of the whole report.
    Json,
    /// One line per item.
    Compact,
    /// Source-annotated diagnostics.
    Pretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match dispatch(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Runs the selected command and returns its verdict.
fn dispatch(cli: Cli) -> Result<bool> {
    let explicit = cli.config.as_deref();
    match cli.command {
        Commands::Scan {
            path,
            format,
            rules,
            exclude,
        } => {
            let source = config_resolver::resolve(project_dir(&path), explicit);
            commands::scan::run(&path, format, rules.as_deref(), exclude, &source)
        }
        Commands::Fix {
            path,
            apply,
            kinds,
            format,
        } => {
            let source = config_resolver::resolve(project_dir(&path), explicit);
            commands::fix::run(&path, apply, kinds.as_deref(), format, &source)
        }
        Commands::Imports { path, format } => {
            let source = config_resolver::resolve(project_dir(&path), explicit);
            commands::imports::run(&path, format, &source)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(true)
        }
        Commands::Init { force } => commands::init::run(force).map(|()| true),
    }
}

/// Directory searched for a project config.
fn project_dir(path: &Path) -> &Path {
    if path.is_file() {
        path.parent().unwrap_or(path)
    } else {
        path
    }
}
