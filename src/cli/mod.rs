//! CLI module for cppir
//!
//! ## Commands
//!
//! - `genjson --language cpp --directory <DIR>... --outpath <OUT> [-- <compiler args>]` - extract headers
//!   into `<OUT>/result.json`
//! - `gencode --input <result.json> --server-language <L> [--client-language <L>...] --outpath <OUT>` - run
//!   the registered language generators over a saved graph
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
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

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
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

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// C++ header extractor and code generation driver
#[derive(Parser, Debug)]
#[command(name = "cppir")]
#[command(version = VERSION)]
#[command(about = "Extract C++ headers into a language-neutral IR graph", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Source languages `genjson` can extract.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    Cpp,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract headers into an IR graph (result.json)
    Genjson {
        /// Source language of the headers
        #[arg(short, long, value_enum, default_value_t = SourceLanguage::Cpp)]
        language: SourceLanguage,
        /// Header root directory (repeatable)
        #[arg(short, long = "directory", value_name = "DIR", required = true, num_args = 1..)]
        directories: Vec<PathBuf>,
        /// Output directory for result.json
        #[arg(short, long, value_name = "OUT")]
        outpath: PathBuf,
        /// Arguments forwarded to the C++ parser
        #[arg(last = true, value_name = "COMPILER_ARGS")]
        compiler_args: Vec<String>,
    },

    /// Run language generators over a saved IR graph
    Gencode {
        /// IR graph produced by genjson
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        /// Language of the generated server side
        #[arg(short, long, value_name = "LANGUAGE")]
        server_language: String,
        /// Language of a generated client (repeatable)
        #[arg(short, long = "client-language", value_name = "LANGUAGE")]
        client_languages: Vec<String>,
        /// Output directory for generated code
        #[arg(short, long, value_name = "OUT")]
        outpath: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
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

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Genjson {
            language: SourceLanguage::Cpp,
            directories,
            outpath,
            compiler_args,
        } => commands::genjson(&directories, &outpath, &compiler_args),
        Command::Gencode {
            input,
            server_language,
            client_languages,
            outpath,
        } => commands::gencode(&input, &server_language, &client_languages, &outpath),
    }
}

// ============================================================================
// Tests
// ============================================================================
