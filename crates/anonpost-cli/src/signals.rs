//! # Signals Subcommand
//!
//! Assembles the public-input vector for a root, proposal, group type, and
//! signature claim. The output is the `public.json` a prover or the
//! `verify` subcommand consumes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use anonpost_core::{GroupType, MerkleRoot, PropId};
use anonpost_zkp::{assemble_from_artifacts, PublicSignals};

use crate::SignatureArgs;

/// Arguments for `anonpost signals`.
#[derive(Args, Debug)]
pub struct SignalsArgs {
    /// Group membership root, as published.
    #[arg(long)]
    pub root: String,

    /// Proposal identifier.
    #[arg(long)]
    pub prop_id: u64,

    /// Group type identifier.
    #[arg(long)]
    pub group_type: u64,

    #[command(flatten)]
    pub signature: SignatureArgs,

    /// Print only the number of signals.
    #[arg(long)]
    pub count: bool,

    /// Write the JSON array here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Execute the signals subcommand.
pub fn run_signals(args: &SignalsArgs) -> Result<u8> {
    let signals = build_signals(args)?;
    if args.count {
        println!("{}", signals.len());
        return Ok(0);
    }

    let json = serde_json::to_string(&signals)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("OK: wrote {} signals to {}", signals.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(0)
}

fn build_signals(args: &SignalsArgs) -> Result<PublicSignals> {
    let root = MerkleRoot::new(args.root.as_str()).context("invalid --root")?;
    let artifacts = args.signature.artifacts()?;
    assemble_from_artifacts(
        &root,
        PropId::new(args.prop_id),
        GroupType::new(args.group_type),
        &artifacts,
    )
    .map_err(|e| anyhow::anyhow!("signal assembly failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use anonpost_zkp::PUBLIC_SIGNAL_COUNT;

    fn args(root: &str) -> SignalsArgs {
        SignalsArgs {
            root: root.to_string(),
            prop_id: 7,
            group_type: 2,
            signature: fixtures::signature(),
            count: false,
            out: None,
        }
    }

    #[test]
    fn header_is_root_prop_group_type() {
        let signals = build_signals(&args("0xabc")).unwrap();
        assert_eq!(signals.len(), PUBLIC_SIGNAL_COUNT);
        assert_eq!(&signals.as_slice()[..3], ["2748", "7", "2"]);
    }

    #[test]
    fn unencodable_root_fails() {
        let err = build_signals(&args("not-a-number")).unwrap_err();
        assert!(err.to_string().contains("signal assembly failed"));
    }

    #[test]
    fn writes_signal_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public.json");
        let mut a = args("0xabc");
        a.out = Some(out.clone());
        assert_eq!(run_signals(&a).unwrap(), 0);

        let written: Vec<String> =
            serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(written.len(), PUBLIC_SIGNAL_COUNT);
        assert_eq!(written[0], "2748");
    }
}
