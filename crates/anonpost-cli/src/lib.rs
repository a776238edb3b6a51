//! # anonpost-cli: Offline Tooling
//!
//! Provides the `anonpost` command-line interface for reproducing what the
//! submission pipeline computes, without running the service.
//!
//! ## Subcommands
//!
//! - `anonpost artifacts`: `(T, U)` for a public signature claim.
//! - `anonpost signals`: the public-input vector a proof must bind.
//! - `anonpost vkey check`: load a verification key and report its arity.
//! - `anonpost verify`: check a proof against a signal file.
//!
//! ```bash
//! anonpost artifacts --r f973a0b8... --odd true --message 6865...
//! anonpost signals --root 0xabc --prop-id 7 --group-type 2 --r ... --odd true --message ... --count
//! anonpost vkey check verification_key.json
//! anonpost verify --vkey verification_key.json --proof proof.json --signals public.json
//! ```
//!
//! ## Crate Policy
//!
//! - Handlers delegate to the domain crates; no pipeline logic here.
//! - Handlers return an exit code: `0` success, `1` check failed.

pub mod artifacts;
pub mod signals;
pub mod verify;
pub mod vkey;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};

use anonpost_core::encoding::decode_hex;
use anonpost_crypto::{compute_artifacts, SignatureArtifacts};

/// The public half of a signature, as the client submits it.
#[derive(Args, Debug, Clone)]
pub struct SignatureArgs {
    /// Hex x-coordinate of the nonce point `R`.
    #[arg(long)]
    pub r: String,

    /// Whether `R.y` is odd.
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub odd: bool,

    /// Hex encoding of the signed message bytes.
    #[arg(long)]
    pub message: String,
}

impl SignatureArgs {
    /// Compute `(T, U)` for these components.
    pub fn artifacts(&self) -> Result<SignatureArtifacts> {
        let message = decode_hex(&self.message).context("--message is not hex")?;
        compute_artifacts(&self.r, self.odd, &message)
            .map_err(|e| anyhow::anyhow!("artifact computation failed: {e}"))
    }
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::SignatureArgs;

    pub const R_HEX: &str = "f973a0b87062c389d125d8199e803b832b6ac6bf7867a4f6cd87506060fc4c58";
    pub const MESSAGE: &[u8] = b"heyanon: propId=7 groupType=2";

    pub fn signature() -> SignatureArgs {
        SignatureArgs {
            r: R_HEX.to_string(),
            odd: true,
            message: anonpost_core::encoding::encode_hex(MESSAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_args_compute_artifacts() {
        let artifacts = fixtures::signature().artifacts().unwrap();
        assert_eq!(artifacts.table_strings().len(), 32);
    }

    #[test]
    fn non_hex_message_is_an_error() {
        let mut args = fixtures::signature();
        args.message = "not hex".into();
        let err = args.artifacts().unwrap_err();
        assert!(err.to_string().contains("--message"));
    }

    #[test]
    fn invalid_r_is_an_error() {
        let mut args = fixtures::signature();
        args.r = "0x0".into();
        let err = args.artifacts().unwrap_err();
        assert!(err.to_string().contains("artifact computation failed"));
    }

    #[test]
    fn read_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, b"{{{").unwrap();
        let err = read_json(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
        assert!(read_json(&dir.path().join("absent.json")).is_err());
    }
}
