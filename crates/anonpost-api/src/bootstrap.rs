//! # Service Bootstrap
//!
//! Builds [`AppState`] from configuration before the listener binds.
//!
//! ## Bootstrap Sequence
//!
//! 1. **Load Verifier**: parse the verification key and check its arity
//!    against the public-signal layout. A mismatch is fatal.
//! 2. **Prepare Content Store**: create `CAS_DIR` if needed.
//! 3. **Seed Groups**: publish the groups listed in `GROUPS_FILE`.
//! 4. **Log Service Identity**: structured startup banner.

use std::collections::HashSet;
use std::path::Path;

use sqlx::PgPool;

use anonpost_core::Group;
use anonpost_zkp::{ConfigurationError, ProofVerifier, PUBLIC_SIGNAL_COUNT};

use crate::config::{AppConfig, ProofBackend};
use crate::orchestration::CollaboratorError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors during service bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The verification key could not be loaded or has the wrong arity.
    #[error("verifier configuration error: {0}")]
    Verifier(#[from] ConfigurationError),

    /// The content store directory could not be created.
    #[error("cannot prepare content store at {path}: {source}")]
    ContentStore {
        path: String,
        source: std::io::Error,
    },

    /// Groups file not found at the given path.
    #[error("groups file not found: {path}")]
    GroupsFileNotFound { path: String },

    /// Groups file failed to parse or validate.
    #[error("invalid groups file {path}: {message}")]
    InvalidGroups { path: String, message: String },

    /// A group could not be published.
    #[error("cannot seed group {group}: {source}")]
    Seed {
        group: String,
        source: CollaboratorError,
    },
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Bootstrap the application state.
pub async fn bootstrap(
    config: AppConfig,
    db_pool: Option<PgPool>,
) -> Result<AppState, BootstrapError> {
    let verifier = load_verifier(&config.proof_backend)?;

    std::fs::create_dir_all(&config.cas_dir).map_err(|source| BootstrapError::ContentStore {
        path: config.cas_dir.display().to_string(),
        source,
    })?;

    let groups = match &config.groups_file {
        Some(path) => load_groups(path)?,
        None => Vec::new(),
    };

    let state = AppState::new(config, verifier, db_pool);

    let mut published = 0usize;
    for group in groups {
        let label = format!("({}, {})", group.prop_id, group.type_id);
        let created = state
            .groups()
            .publish(group)
            .await
            .map_err(|source| BootstrapError::Seed {
                group: label.clone(),
                source,
            })?;
        if created {
            published += 1;
        } else {
            tracing::debug!(group = %label, "group already published, keeping stored root");
        }
    }

    tracing::info!(
        proof_backend = state.coordinator.verifier().backend_name(),
        public_inputs = ?state.coordinator.verifier().public_input_count(),
        cas_dir = %state.config.cas_dir.display(),
        persistence = if state.db_pool.is_some() { "postgres" } else { "in-memory" },
        groups_seeded = published,
        "anonpost bootstrapped"
    );

    Ok(state)
}

fn load_verifier(backend: &ProofBackend) -> Result<ProofVerifier, BootstrapError> {
    match backend {
        ProofBackend::Groth16 { key_path } => {
            let verifier = ProofVerifier::groth16_from_file(key_path, Some(PUBLIC_SIGNAL_COUNT))?;
            tracing::info!(key = %key_path.display(), "verification key loaded");
            Ok(verifier)
        }
        ProofBackend::Mock => {
            tracing::warn!(
                "PROOF_BACKEND=mock: proofs are digest-bound, not zero-knowledge. \
                 Do not use outside development."
            );
            Ok(ProofVerifier::mock())
        }
    }
}

/// Parse a YAML list of groups.
///
/// Each entry is `{id, propId, typeId, root}`. A `(propId, typeId)` pair
/// may appear once.
pub fn load_groups(path: &Path) -> Result<Vec<Group>, BootstrapError> {
    let raw = std::fs::read_to_string(path).map_err(|_| BootstrapError::GroupsFileNotFound {
        path: path.display().to_string(),
    })?;
    let invalid = |message: String| BootstrapError::InvalidGroups {
        path: path.display().to_string(),
        message,
    };

    let groups: Vec<Group> = serde_yaml::from_str(&raw).map_err(|e| invalid(e.to_string()))?;

    let mut seen = HashSet::new();
    for group in &groups {
        if !seen.insert((group.prop_id, group.type_id)) {
            return Err(invalid(format!(
                "duplicate group for propId {}, typeId {}",
                group.prop_id, group.type_id
            )));
        }
    }
    Ok(groups)
}
