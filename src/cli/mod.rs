//! Reference reporting front end for the harness.
//!
//! The library never prints; this module is the `blackbox` binary's view of a run.
//!
//! ```text
//! blackbox --bin-dir target/programs tests clients.first
//! ```
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod reporter;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::harness::{CommandResolver, Discoverer, HarnessConfig, NullReporter, OutcomeNode, Summary, run_tree};
use crate::version::BLACKBOX_VERSION;
use reporter::ConsoleReporter;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    pub const USAGE: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a setup error (exit code 2).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::USAGE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// pytest-style lines and a summary
    #[default]
    Console,
    /// The outcome tree as a JSON document
    Json,
}

/// Run black-box tests discovered from a fixtures directory
#[derive(Parser, Debug)]
#[command(name = "blackbox")]
#[command(version = BLACKBOX_VERSION)]
#[command(about = "Run black-box stdin/stdout tests from a fixtures directory", long_about = None)]
pub struct Cli {
    /// Root of the fixtures tree
    #[arg(value_name = "TESTS_DIR")]
    pub tests_dir: PathBuf,

    /// Dotted scope to run (default: everything)
    #[arg(value_name = "SCOPE", default_value = "")]
    pub scope: String,

    /// Directory holding one executable per target (`a.b.C` -> `<DIR>/a/b/C`)
    #[arg(long, value_name = "DIR")]
    pub bin_dir: PathBuf,

    /// Per-case timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Write `actual-<n>.txt` next to each case (also enabled by GENERATE_ACTUAL_FILES)
    #[arg(long)]
    pub emit_actual: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Console)]
    pub format: Format,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Harness settings implied by the flags and the environment.
    pub fn config(&self) -> HarnessConfig {
        let env = HarnessConfig::from_env();
        env.with_timeout(Duration::from_secs(self.timeout))
            .with_emit_actual(env.emit_actual || self.emit_actual)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Discover, run and report; returns the exit code for the run.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.config();
    let resolver = Arc::new(CommandResolver::new(&cli.bin_dir).with_timeout(config.timeout));
    let discoverer = Discoverer::new(&cli.tests_dir, resolver)
        .map_err(|e| CliError::usage(e.to_string()))?
        .with_config(config);
    let forest = discoverer
        .generate(&cli.scope)
        .map_err(|e| CliError::usage(e.to_string()))?;

    let outcomes = match cli.format {
        Format::Console => run_tree(&forest, &mut ConsoleReporter::new(cli.verbose)),
        Format::Json => {
            let outcomes = run_tree(&forest, &mut NullReporter);
            println!("{}", render_json(&outcomes));
            outcomes
        }
    };

    let mut summary = Summary::default();
    for outcome in &outcomes {
        summary.merge(outcome.summary());
    }
    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Pretty JSON document for a finished run.
pub fn render_json(outcomes: &[OutcomeNode]) -> String {
    let mut summary = Summary::default();
    for outcome in outcomes {
        summary.merge(outcome.summary());
    }
    let document = serde_json::json!({
        "version": BLACKBOX_VERSION,
        "summary": {
            "total": summary.total,
            "passed": summary.passed,
            "failed": summary.failed,
            "skipped": summary.skipped,
        },
        "tests": outcomes.iter().map(OutcomeNode::to_json).collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&document).unwrap_or_else(|_| document.to_string())
}

// ============================================================================
// Tests
// ============================================================================
