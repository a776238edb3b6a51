//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! The coordinator's collaborators come in two flavours:
//! - **Postgres** when `DATABASE_URL` is set: groups and submission records
//!   live in the database (see [`crate::db`]).
//! - **In-memory** otherwise: the same uniqueness rules, enforced under a
//!   single write lock. State does not survive restarts.
//!
//! Committed artifacts always go to the filesystem content-addressed store
//! under `CAS_DIR`.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use sqlx::PgPool;

use anonpost_core::{
    ContentDigest, Group, GroupType, NewSubmissionRecord, PropId, ProofFingerprint, SubmissionId,
    SubmissionRecord,
};
use anonpost_crypto::{ArtifactType, ContentAddressedStore};
use anonpost_zkp::ProofVerifier;

use crate::config::AppConfig;
use crate::db;
use crate::orchestration::{
    ArtifactStore, CollaboratorError, GroupRegistry, SubmissionArtifact, SubmissionCoordinator,
    SubmissionLedger,
};

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot` and is never held across `.await` points.
#[derive(Debug)]
pub struct Store<K, V> {
    data: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Store<K, V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Retrieve a value by key.
    pub fn get(&self, key: &K) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    /// Return the existing value for `key`, or insert the one built by `f`.
    ///
    /// The check and the insert happen under one write lock. The flag is
    /// true when `f` ran.
    pub fn get_or_insert_with(&self, key: K, f: impl FnOnce() -> V) -> (V, bool) {
        let mut guard = self.data.write();
        if let Some(existing) = guard.get(&key) {
            return (existing.clone(), false);
        }
        let value = f();
        guard.insert(key, value.clone());
        (value, true)
    }

    /// Return the number of entries.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V: Clone> Default for Store<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Group Registry -----------------------------------------------------------

/// Published groups, keyed by `(propId, groupType)`.
#[derive(Debug, Clone)]
pub enum GroupDirectory {
    /// Process-local directory, seeded from `GROUPS_FILE`.
    InMemory(Store<(PropId, GroupType), Group>),
    /// The `groups` table.
    Postgres(PgPool),
}

impl GroupDirectory {
    /// An empty in-memory directory.
    pub fn in_memory() -> Self {
        Self::InMemory(Store::new())
    }

    /// Publish a group. An existing group for the same pair is kept and
    /// `false` is returned.
    pub async fn publish(&self, group: Group) -> Result<bool, CollaboratorError> {
        match self {
            Self::InMemory(store) => {
                let (_, created) = store.get_or_insert_with((group.prop_id, group.type_id), || group);
                Ok(created)
            }
            Self::Postgres(pool) => Ok(db::groups::insert(pool, &group).await?),
        }
    }
}

impl GroupRegistry for GroupDirectory {
    fn find_group(
        &self,
        prop_id: PropId,
        group_type: GroupType,
    ) -> impl Future<Output = Result<Option<Group>, CollaboratorError>> + Send {
        async move {
            match self {
                Self::InMemory(store) => Ok(store.get(&(prop_id, group_type))),
                Self::Postgres(pool) => Ok(db::groups::find(pool, prop_id, group_type).await?),
            }
        }
    }
}

// -- Submission Ledger --------------------------------------------------------

/// Committed submission records, unique by fingerprint.
#[derive(Debug, Clone)]
pub enum SubmissionBook {
    /// Process-local ledger keyed by fingerprint hex.
    InMemory(Store<String, SubmissionRecord>),
    /// The `submissions` table.
    Postgres(PgPool),
}

impl SubmissionBook {
    /// An empty in-memory ledger.
    pub fn in_memory() -> Self {
        Self::InMemory(Store::new())
    }
}

impl SubmissionLedger for SubmissionBook {
    fn insert_or_get(
        &self,
        new: NewSubmissionRecord,
    ) -> impl Future<Output = Result<(SubmissionRecord, bool), CollaboratorError>> + Send {
        async move {
            match self {
                Self::InMemory(store) => Ok(store.get_or_insert_with(new.fingerprint.to_hex(), || {
                    SubmissionRecord::from_new(new, SubmissionId::new(), Utc::now())
                })),
                Self::Postgres(pool) => Ok(db::submissions::insert_or_get(pool, new).await?),
            }
        }
    }

    fn find_by_fingerprint(
        &self,
        fingerprint: &ProofFingerprint,
    ) -> impl Future<Output = Result<Option<SubmissionRecord>, CollaboratorError>> + Send {
        let fingerprint = fingerprint.clone();
        async move {
            match self {
                Self::InMemory(store) => Ok(store.get(&fingerprint.to_hex())),
                Self::Postgres(pool) => {
                    Ok(db::submissions::find_by_fingerprint(pool, &fingerprint).await?)
                }
            }
        }
    }
}

// -- Artifact Store -----------------------------------------------------------

/// Filesystem content-addressed store for submission artifacts.
///
/// Artifacts land at `{base}/submission/{sha256}.json`. File I/O runs on
/// the blocking pool.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    cas: ContentAddressedStore,
}

impl FsArtifactStore {
    /// A store rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            cas: ContentAddressedStore::new(base_dir),
        }
    }

    /// The store's root directory.
    pub fn base_dir(&self) -> &Path {
        self.cas.base_dir()
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(
        &self,
        artifact: &SubmissionArtifact,
    ) -> impl Future<Output = Result<String, CollaboratorError>> + Send {
        let cas = self.cas.clone();
        let value = serde_json::to_value(artifact);
        async move {
            let value = value.map_err(|e| CollaboratorError::Malformed(e.to_string()))?;
            let artifact_ref =
                tokio::task::spawn_blocking(move || cas.store(ArtifactType::SUBMISSION, &value))
                    .await
                    .map_err(|e| CollaboratorError::Task(e.to_string()))??;
            Ok(artifact_ref.address())
        }
    }

    fn get(
        &self,
        address: &ContentDigest,
    ) -> impl Future<Output = Result<Option<SubmissionArtifact>, CollaboratorError>> + Send {
        let cas = self.cas.clone();
        let digest = address.clone();
        async move {
            let bytes =
                tokio::task::spawn_blocking(move || cas.resolve(ArtifactType::SUBMISSION, &digest))
                    .await
                    .map_err(|e| CollaboratorError::Task(e.to_string()))??;
            bytes
                .map(|b| {
                    serde_json::from_slice(&b)
                        .map_err(|e| CollaboratorError::Malformed(e.to_string()))
                })
                .transpose()
        }
    }
}

// -- Application State --------------------------------------------------------

/// The coordinator as wired by the service.
pub type Coordinator = SubmissionCoordinator<GroupDirectory, FsArtifactStore, SubmissionBook>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The submission pipeline and its collaborators.
    pub coordinator: Coordinator,

    /// PostgreSQL pool. When `None` the API runs in in-memory mode.
    pub db_pool: Option<PgPool>,

    /// Prometheus exporter handle, rendered at `/metrics`.
    pub metrics: Option<PrometheusHandle>,

    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("coordinator", &self.coordinator)
            .field("db_pool", &self.db_pool.as_ref().map(|_| "[connected]"))
            .field("metrics", &self.metrics.as_ref().map(|_| "[installed]"))
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// Wire the coordinator. Groups and records go to Postgres when a pool
    /// is given and to in-memory stores otherwise.
    pub fn new(config: AppConfig, verifier: ProofVerifier, db_pool: Option<PgPool>) -> Self {
        let (groups, ledger) = match &db_pool {
            Some(pool) => (
                GroupDirectory::Postgres(pool.clone()),
                SubmissionBook::Postgres(pool.clone()),
            ),
            None => (GroupDirectory::in_memory(), SubmissionBook::in_memory()),
        };
        let store = FsArtifactStore::new(config.cas_dir.clone());
        Self {
            coordinator: SubmissionCoordinator::new(groups, store, ledger, verifier),
            db_pool,
            metrics: None,
            config,
        }
    }

    /// Attach the Prometheus exporter handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// The group registry.
    pub fn groups(&self) -> &GroupDirectory {
        self.coordinator.registry()
    }
}
