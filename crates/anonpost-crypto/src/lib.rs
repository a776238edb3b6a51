//! # anonpost-crypto: Cryptographic Primitives
//!
//! - **Signature artifacts** ([`artifacts`]): recompute the `T` table and
//!   `U` point that bind a secp256k1 ECDSA signature to the membership
//!   proof without revealing the signer's public key.
//! - **Keccak-256** ([`keccak`]): message hashing as done by Ethereum
//!   wallets.
//! - **Content-Addressed Storage** ([`cas`]): store and resolve committed
//!   submission artifacts by the SHA-256 of their canonical JSON.

pub mod artifacts;
pub mod cas;
pub mod error;
pub mod keccak;

// Re-export primary types.
pub use artifacts::{
    compute_artifacts, ArtifactPoint, ArtifactTable, PointRegisters, SignatureArtifacts,
    ENTRIES_PER_WINDOW, REGISTERS, REGISTER_BITS, STRIDE_BITS, WINDOWS,
};
pub use cas::{ArtifactRef, ArtifactType, ContentAddressedStore};
pub use error::{ArtifactError, CryptoError};
pub use keccak::keccak256;
