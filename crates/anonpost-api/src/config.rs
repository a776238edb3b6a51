//! # Service Configuration
//!
//! Read once from the environment at startup. `DATABASE_URL` is read
//! separately by [`crate::db::init_pool`].

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors detected before any component starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be used.
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: &'static str,
    },

    /// The Groth16 backend needs a key path.
    #[error("VERIFICATION_KEY_PATH must be set when PROOF_BACKEND=groth16")]
    MissingKeyPath,
}

/// Which proof system checks submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofBackend {
    /// BN254 Groth16 against a snarkjs verification key.
    Groth16 {
        /// Path to `verification_key.json`.
        key_path: PathBuf,
    },
    /// Digest-bound mock proofs. Development only.
    Mock,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Proof backend and its key.
    pub proof_backend: ProofBackend,
    /// Root of the content-addressed artifact store.
    pub cas_dir: PathBuf,
    /// YAML list of groups seeded at startup.
    pub groups_file: Option<PathBuf>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    /// The development profile: mock proofs, local store.
    fn default() -> Self {
        Self {
            port: 8080,
            proof_backend: ProofBackend::Mock,
            cas_dir: PathBuf::from("./data/cas"),
            groups_file: None,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: raw,
                reason: "expected a port number",
            })?,
            None => 8080,
        };

        let proof_backend = match var("PROOF_BACKEND").as_deref().map(str::trim) {
            None | Some("groth16") => ProofBackend::Groth16 {
                key_path: var("VERIFICATION_KEY_PATH")
                    .map(PathBuf::from)
                    .ok_or(ConfigError::MissingKeyPath)?,
            },
            Some("mock") => ProofBackend::Mock,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "PROOF_BACKEND",
                    value: other.to_string(),
                    reason: "expected groth16 or mock",
                })
            }
        };

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected text or json",
                })
            }
        };

        Ok(Self {
            port,
            proof_backend,
            cas_dir: var("CAS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/cas")),
            groups_file: var("GROUPS_FILE").map(PathBuf::from),
            log_format,
        })
    }
}
