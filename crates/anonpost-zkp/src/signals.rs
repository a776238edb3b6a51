//! # Public Signal Assembly
//!
//! Builds the ordered public-input vector the membership circuit was
//! compiled against:
//!
//! ```text
//! [ root, propId, groupType, T[0][0].x[0..4], T[0][0].y[0..4], …, T[31][255].y[3],
//!   U.x[0..4], U.y[0..4] ]
//! ```
//!
//! Every element is a decimal string of a BN254 scalar field element. The
//! order and encoding must match the circuit exactly: one transposed
//! register and every proof fails.

use std::sync::OnceLock;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use anonpost_core::{GroupType, MerkleRoot, PropId};
use anonpost_crypto::{
    ArtifactPoint, SignatureArtifacts, ENTRIES_PER_WINDOW, REGISTERS, WINDOWS,
};

/// Order of the BN254 scalar field; every public signal must be below it.
pub const BN254_SCALAR_MODULUS: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Number of leading scalar signals: root, propId, groupType.
pub const HEADER_SIGNALS: usize = 3;

/// Total signal count for the membership circuit.
pub const PUBLIC_SIGNAL_COUNT: usize =
    HEADER_SIGNALS + WINDOWS * ENTRIES_PER_WINDOW * 2 * REGISTERS + 2 * REGISTERS;

/// A public signal could not be encoded as a field element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Not a canonical decimal (or, for the root, hex) integer.
    #[error("signal {index}: {value:?} is not a canonical integer")]
    Malformed {
        /// Position in the signal vector.
        index: usize,
        /// The offending input.
        value: String,
    },

    /// Integer is not below the BN254 scalar field modulus.
    #[error("signal {index}: value is not below the BN254 scalar field modulus")]
    OutOfField {
        /// Position in the signal vector.
        index: usize,
    },

    /// Artifacts do not have the table dimensions the circuit expects.
    #[error("artifact shape mismatch: {0}")]
    Shape(String),
}

/// The ordered public-input vector, as decimal field-element strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicSignals(Vec<String>);

impl PublicSignals {
    /// Validate an externally supplied vector, e.g. a snarkjs `public.json`.
    pub fn from_decimal_strings(values: Vec<String>) -> Result<Self, SerializationError> {
        for (index, value) in values.iter().enumerate() {
            parse_canonical_decimal(index, value)?;
        }
        Ok(Self(values))
    }

    /// Number of signals.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The signals in circuit order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Parse every signal into an integer below the field modulus.
    pub fn to_biguints(&self) -> Result<Vec<BigUint>, SerializationError> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, v)| parse_canonical_decimal(i, v))
            .collect()
    }
}

/// The BN254 scalar field modulus as an integer.
pub fn field_modulus() -> &'static BigUint {
    static MODULUS: OnceLock<BigUint> = OnceLock::new();
    MODULUS.get_or_init(|| {
        BigUint::parse_bytes(BN254_SCALAR_MODULUS.as_bytes(), 10).unwrap_or_default()
    })
}

fn check_in_field(index: usize, n: BigUint) -> Result<BigUint, SerializationError> {
    if &n < field_modulus() {
        Ok(n)
    } else {
        Err(SerializationError::OutOfField { index })
    }
}

fn parse_canonical_decimal(index: usize, value: &str) -> Result<BigUint, SerializationError> {
    let canonical = !value.is_empty()
        && value.bytes().all(|b| b.is_ascii_digit())
        && (value == "0" || !value.starts_with('0'));
    if !canonical {
        return Err(SerializationError::Malformed {
            index,
            value: value.to_string(),
        });
    }
    let n = BigUint::parse_bytes(value.as_bytes(), 10).ok_or_else(|| {
        SerializationError::Malformed {
            index,
            value: value.to_string(),
        }
    })?;
    check_in_field(index, n)
}

/// Convert a group root (`0x`-hex or decimal) to a decimal field element.
pub fn root_to_field(root: &str) -> Result<String, SerializationError> {
    let malformed = || SerializationError::Malformed {
        index: 0,
        value: root.to_string(),
    };
    let (digits, radix) = match root.strip_prefix("0x").or_else(|| root.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (root, 10),
    };
    if digits.is_empty() || !digits.bytes().all(|b| (b as char).is_digit(radix)) {
        return Err(malformed());
    }
    let n = BigUint::parse_bytes(digits.as_bytes(), radix).ok_or_else(malformed)?;
    Ok(check_in_field(0, n)?.to_string())
}

/// Assemble the public-input vector in circuit order.
pub fn assemble(
    root: &MerkleRoot,
    prop_id: PropId,
    group_type: GroupType,
    t: &[Vec<ArtifactPoint>],
    u: &ArtifactPoint,
) -> Result<PublicSignals, SerializationError> {
    if t.len() != WINDOWS {
        return Err(SerializationError::Shape(format!(
            "T has {} windows, expected {WINDOWS}",
            t.len()
        )));
    }
    if let Some((i, row)) = t
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != ENTRIES_PER_WINDOW)
    {
        return Err(SerializationError::Shape(format!(
            "T[{i}] has {} entries, expected {ENTRIES_PER_WINDOW}",
            row.len()
        )));
    }

    let mut out = Vec::with_capacity(PUBLIC_SIGNAL_COUNT);
    out.push(root_to_field(root.as_str())?);
    out.push(prop_id.value().to_string());
    out.push(group_type.value().to_string());

    let points = t.iter().flatten().chain(std::iter::once(u));
    for point in points {
        for register in point.iter().flatten() {
            let index = out.len();
            parse_canonical_decimal(index, register)?;
            out.push(register.clone());
        }
    }

    debug_assert_eq!(out.len(), PUBLIC_SIGNAL_COUNT);
    Ok(PublicSignals(out))
}

/// Assemble directly from computed artifacts.
pub fn assemble_from_artifacts(
    root: &MerkleRoot,
    prop_id: PropId,
    group_type: GroupType,
    artifacts: &SignatureArtifacts,
) -> Result<PublicSignals, SerializationError> {
    assemble(
        root,
        prop_id,
        group_type,
        &artifacts.table_strings(),
        &artifacts.u_strings(),
    )
}
