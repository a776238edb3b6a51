//! # Vkey Subcommand
//!
//! Verification key inspection. `check` loads a snarkjs Groth16 key the
//! same way the service does at startup and compares its public-input
//! count with the signal layout.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use anonpost_zkp::{ConfigurationError, ProofVerifier, PUBLIC_SIGNAL_COUNT};

/// Arguments for `anonpost vkey`.
#[derive(Args, Debug)]
pub struct VkeyArgs {
    #[command(subcommand)]
    pub command: VkeyCommand,
}

/// Vkey subcommands.
#[derive(Subcommand, Debug)]
pub enum VkeyCommand {
    /// Load a key and report its arity.
    Check {
        /// Path to `verification_key.json`.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Public inputs the key must take.
        #[arg(long, default_value_t = PUBLIC_SIGNAL_COUNT)]
        expected: usize,
    },
}

/// Execute the vkey subcommand.
pub fn run_vkey(args: &VkeyArgs) -> Result<u8> {
    match &args.command {
        VkeyCommand::Check { path, expected } => cmd_check(path, *expected),
    }
}

fn cmd_check(path: &std::path::Path, expected: usize) -> Result<u8> {
    match ProofVerifier::groth16_from_file(path, Some(expected)) {
        Ok(_) => {
            println!(
                "OK: {} takes {expected} public inputs",
                path.display()
            );
            Ok(0)
        }
        Err(ConfigurationError::ArityMismatch { expected, actual }) => {
            println!(
                "FAIL: {} takes {actual} public inputs, expected {expected}",
                path.display()
            );
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
