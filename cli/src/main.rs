//! # Stowage Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point of the `stowage` CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on the verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - `core`: rule file model, error types
//! - `engine`: pattern matching, section resolution, tree scanning, selection
//! - `common`: archive codecs and filesystem helpers (copying, links, paths)
//! - `commands`: one module per subcommand
//!
//! Every error travels up to `main`, which prints it and exits with status 1.
//!
//! ## Examples
//!
//! ```bash
//! # Package the "release" section of ./stowage.json
//! stowage compress -s release
//!
//! # Same, with scan details on stderr
//! stowage -v compress -s release
//!
//! # Unpack it again
//! stowage decompress tetra.zip /tmp/tetra
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Subcommand arguments and handlers
mod common; // Archive codecs and filesystem helpers
mod core; // Rule file model and errors
mod engine; // Matching, resolution and selection

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "stowage",
    about = "Rule-driven asset packager",
    long_about = "Select files from a project tree with the include/exclude rules of a\n\
                  stowage.json (or .toml) file and write them to an archive or a directory.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands.
#[derive(Parser, Debug)]
enum Commands {
    /// Write the files selected by a rule section to an archive.
    #[command(alias = "c")]
    Compress(commands::compress::CompressArgs),
    /// Extract an archive into a directory.
    #[command(alias = "x")]
    Decompress(commands::decompress::DecompressArgs),
    /// Copy the files selected by a rule section into a directory.
    #[command(alias = "cp")]
    Copy(commands::copy::CopyArgs),
    /// List the rule sections of a rule file.
    Sections(commands::sections::SectionsArgs),
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn main() {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose, cli.quiet)));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);
    let verbose = cli.verbose > 0;

    let command_result = match cli.command {
        Commands::Compress(args) => commands::compress::handle_compress(args),
        Commands::Decompress(args) => commands::decompress::handle_decompress(args),
        Commands::Copy(args) => commands::copy::handle_copy(args),
        Commands::Sections(args) => commands::sections::handle_sections(args),
    };

    if let Err(e) = command_result {
        if let Some(kind) = crate::core::error::stowage_error(&e).map(|se| se.kind()) {
            tracing::debug!("Error kind: {:?}", kind);
        }
        if verbose {
            eprintln!("Error: {:?}", e);
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
