//! # Verify Subcommand
//!
//! Runs the proof verifier offline against a proof file and a signal file
//! (a JSON array of decimal strings, as written by `anonpost signals`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use anonpost_zkp::{ProofVerifier, PublicSignals};

use crate::read_json;

/// Arguments for `anonpost verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to `verification_key.json`.
    #[arg(long, value_name = "FILE", required_unless_present = "mock")]
    pub vkey: Option<PathBuf>,

    /// Use the mock backend instead of a Groth16 key.
    #[arg(long, conflicts_with = "vkey")]
    pub mock: bool,

    /// Path to the proof JSON.
    #[arg(long, value_name = "FILE")]
    pub proof: PathBuf,

    /// Path to the public signals JSON.
    #[arg(long, value_name = "FILE")]
    pub signals: PathBuf,
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let verifier = match &args.vkey {
        Some(path) => ProofVerifier::groth16_from_file(path, None)?,
        None => ProofVerifier::mock(),
    };
    let signals = load_signals(&args.signals)?;
    let proof = read_json(&args.proof)?;

    match verifier.check(&signals, &proof) {
        Ok(true) => {
            println!(
                "OK: proof verifies against {} signals ({})",
                signals.len(),
                verifier.backend_name()
            );
            Ok(0)
        }
        Ok(false) => {
            println!("FAIL: proof does not verify");
            Ok(1)
        }
        Err(e) => {
            println!("FAIL: proof could not be checked: {e}");
            Ok(1)
        }
    }
}

fn load_signals(path: &Path) -> Result<PublicSignals> {
    let values: Vec<String> = serde_json::from_value(read_json(path)?)
        .with_context(|| format!("{} is not an array of strings", path.display()))?;
    PublicSignals::from_decimal_strings(values)
        .map_err(|e| anyhow::anyhow!("invalid signals in {}: {e}", path.display()))
}
