//! # Content-Addressed Storage (CAS)
//!
//! Committed submission artifacts are stored by the SHA-256 of their
//! canonical JSON at `{base_dir}/{artifact_type}/{digest_hex}.json`.
//!
//! ## Integrity Invariant
//!
//! Every stored artifact's filename encodes its content digest. On
//! retrieval the digest is recomputed and compared against the filename
//! in constant time. Corruption or tampering is detected at read time.
//!
//! ## Idempotence
//!
//! Storing the same content twice yields the same address and leaves the
//! first copy in place. A pre-existing file at the target path that fails
//! its integrity check (for example a write torn by a crash) is replaced.

use anonpost_core::{sha256_digest, CanonicalBytes, ContentDigest};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

// ---------------------------------------------------------------------------
// ArtifactType
// ---------------------------------------------------------------------------

/// A validated artifact namespace.
///
/// Must match `^[a-z0-9][a-z0-9-]{0,63}$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactType(String);

impl ArtifactType {
    /// Namespace for committed comment submissions.
    pub const SUBMISSION: &'static str = "submission";

    /// Create a new validated artifact type.
    pub fn new(s: &str) -> Result<Self, CryptoError> {
        let t = s.trim().to_lowercase();
        if t.is_empty() || t.len() > 64 {
            return Err(CryptoError::Cas(format!(
                "artifact type must be 1-64 chars, got {}",
                t.len()
            )));
        }
        let mut chars = t.chars();
        if !chars
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(CryptoError::Cas(format!(
                "artifact type must start with [a-z0-9], got: {t:?}"
            )));
        }
        if let Some(bad) = chars.find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')) {
            return Err(CryptoError::Cas(format!(
                "artifact type contains invalid character {bad:?}"
            )));
        }
        Ok(Self(t))
    }

    /// Return the artifact type as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ArtifactRef
// ---------------------------------------------------------------------------

/// The address of a stored artifact: namespace plus content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    /// Artifact namespace.
    pub artifact_type: ArtifactType,
    /// Content digest of the canonical bytes.
    pub digest: ContentDigest,
}

impl ArtifactRef {
    /// Construct a reference, validating the namespace.
    pub fn new(artifact_type: &str, digest: ContentDigest) -> Result<Self, CryptoError> {
        Ok(Self {
            artifact_type: ArtifactType::new(artifact_type)?,
            digest,
        })
    }

    /// Hex digest, the externally visible address.
    pub fn address(&self) -> String {
        self.digest.to_hex()
    }

    /// Filesystem path of this artifact under a CAS base directory.
    pub fn path_in(&self, base_dir: &Path) -> PathBuf {
        base_dir
            .join(self.artifact_type.as_str())
            .join(format!("{}.json", self.digest.to_hex()))
    }
}

// ---------------------------------------------------------------------------
// ContentAddressedStore
// ---------------------------------------------------------------------------

/// A content-addressed artifact store backed by the filesystem.
#[derive(Debug, Clone)]
pub struct ContentAddressedStore {
    base_dir: PathBuf,
}

impl ContentAddressedStore {
    /// Create a store rooted at `base_dir`. The directory is created lazily.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Return the base directory path.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Canonicalize `data`, write it under its digest, and return its address.
    pub fn store(
        &self,
        artifact_type: &str,
        data: &impl Serialize,
    ) -> Result<ArtifactRef, CryptoError> {
        let t = ArtifactType::new(artifact_type)?;
        let canonical = CanonicalBytes::new(data)
            .map_err(|e| CryptoError::Cas(format!("canonicalization failed: {e}")))?;
        let artifact_ref = ArtifactRef {
            artifact_type: t,
            digest: sha256_digest(&canonical),
        };

        fs::create_dir_all(self.base_dir.join(artifact_ref.artifact_type.as_str()))?;
        let path = artifact_ref.path_in(&self.base_dir);

        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut f) => {
                f.write_all(canonical.as_bytes())?;
                f.sync_all()?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if self.resolve_ref(&artifact_ref).is_err() {
                    tracing::warn!(
                        path = %path.display(),
                        "replacing corrupt artifact at content address"
                    );
                    fs::write(&path, canonical.as_bytes())?;
                }
            }
            Err(e) => return Err(e.into()),
        }

        Ok(artifact_ref)
    }

    /// Resolve an artifact by type and digest.
    ///
    /// Returns `Ok(None)` if absent, `Ok(Some(bytes))` if present and its
    /// recomputed digest matches, and an error on integrity violation.
    pub fn resolve(
        &self,
        artifact_type: &str,
        digest: &ContentDigest,
    ) -> Result<Option<Vec<u8>>, CryptoError> {
        self.resolve_ref(&ArtifactRef::new(artifact_type, digest.clone())?)
    }

    /// Resolve an artifact by its [`ArtifactRef`].
    pub fn resolve_ref(&self, artifact_ref: &ArtifactRef) -> Result<Option<Vec<u8>>, CryptoError> {
        let path = artifact_ref.path_in(&self.base_dir);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            CryptoError::Cas(format!(
                "stored artifact at {} is not valid JSON: {e}",
                path.display()
            ))
        })?;
        let recanon = CanonicalBytes::from_value(value).map_err(|e| {
            CryptoError::Cas(format!(
                "stored artifact at {} failed re-canonicalization: {e}",
                path.display()
            ))
        })?;
        let recomputed = sha256_digest(&recanon);
        if !bool::from(recomputed.as_bytes().ct_eq(artifact_ref.digest.as_bytes())) {
            return Err(CryptoError::Cas(format!(
                "integrity violation: artifact at {} has digest {} but filename says {}",
                path.display(),
                recomputed.to_hex(),
                artifact_ref.address(),
            )));
        }

        Ok(Some(bytes))
    }

    /// Check whether an artifact exists in the store.
    pub fn contains(&self, artifact_type: &str, digest: &ContentDigest) -> Result<bool, CryptoError> {
        let artifact_ref = ArtifactRef::new(artifact_type, digest.clone())?;
        Ok(artifact_ref.path_in(&self.base_dir).exists())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
