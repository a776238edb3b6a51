//! # anonpost CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use anonpost_cli::artifacts::{run_artifacts, ArtifactsArgs};
use anonpost_cli::signals::{run_signals, SignalsArgs};
use anonpost_cli::verify::{run_verify, VerifyArgs};
use anonpost_cli::vkey::{run_vkey, VkeyArgs};

/// anonpost toolchain.
///
/// Reproduces the submission pipeline's computations offline: signature
/// artifacts, public signals, and proof verification.
#[derive(Parser, Debug)]
#[command(name = "anonpost", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute (T, U) from a public signature claim.
    Artifacts(ArtifactsArgs),

    /// Assemble the public-input vector for a submission.
    Signals(SignalsArgs),

    /// Verification key inspection.
    Vkey(VkeyArgs),

    /// Verify a proof against a signal file.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Artifacts(args) => run_artifacts(&args),
        Commands::Signals(args) => run_signals(&args),
        Commands::Vkey(args) => run_vkey(&args),
        Commands::Verify(args) => run_verify(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
