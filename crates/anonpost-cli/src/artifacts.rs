//! # Artifacts Subcommand
//!
//! Recomputes `(T, U)` from a public signature claim, as the client does
//! before proving. Prints a summary by default, or the full artifact JSON
//! with `--full`.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use anonpost_core::{sha256_digest, CanonicalBytes};
use anonpost_crypto::SignatureArtifacts;

use crate::SignatureArgs;

/// Arguments for `anonpost artifacts`.
#[derive(Args, Debug)]
pub struct ArtifactsArgs {
    #[command(flatten)]
    pub signature: SignatureArgs,

    /// Print the whole `{T, U}` object instead of the summary.
    #[arg(long)]
    pub full: bool,
}

/// Execute the artifacts subcommand.
pub fn run_artifacts(args: &ArtifactsArgs) -> Result<u8> {
    let artifacts = args.signature.artifacts()?;
    let output = if args.full {
        serde_json::to_string(&artifacts)?
    } else {
        serde_json::to_string_pretty(&summary(&artifacts)?)?
    };
    println!("{output}");
    Ok(0)
}

/// Digest of the canonical `{T, U}` object plus the `U` registers.
fn summary(artifacts: &SignatureArtifacts) -> Result<serde_json::Value> {
    let canonical = CanonicalBytes::new(artifacts).context("cannot canonicalize artifacts")?;
    Ok(json!({
        "digest": sha256_digest(&canonical).to_hex(),
        "windows": artifacts.table_strings().len(),
        "U": artifacts.u_strings(),
    }))
}
