//! # Signature Artifacts (T table and U point)
//!
//! The membership circuit proves knowledge of an ECDSA signature without
//! revealing the public key `Q`. Instead of verifying `(r, s)` directly it
//! checks the rearranged relation
//!
//! ```text
//! s · T + U == Q      where  T = r⁻¹ · R,  U = −(r⁻¹ · m) · G
//! ```
//!
//! `R` is the signature nonce point (recovered from `r` and the parity of
//! its y-coordinate) and `m` is the keccak-256 digest of the signed message
//! reduced modulo the group order `n`. Both `T` and `U` are public, so they
//! are computed outside the circuit and passed in as public signals.
//!
//! Scalar multiplication by the secret `s` is done in-circuit with a
//! fixed-window table: `T[i][j] = (j · 2^(8i)) · T` for 32 windows of 256
//! entries. Entry `j = 0` is the point at infinity and is encoded as all
//! zeros.
//!
//! Every coordinate is split into four little-endian 64-bit registers, the
//! limb layout of the circuit's non-native field arithmetic. The output must
//! match the client's computation bit for bit, so the layout constants below
//! are pinned by literal vectors in the tests.

use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::point::DecompressPoint;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::subtle::Choice;
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, FieldBytes, ProjectivePoint, Scalar, U256};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use anonpost_core::encoding::{decode_hex, strip_hex_prefix};
use anonpost_core::SignatureClaim;

use crate::error::ArtifactError;
use crate::keccak::keccak256;

/// Number of windows in the precomputed table.
pub const WINDOWS: usize = 32;
/// Bits of the secret scalar consumed per window.
pub const STRIDE_BITS: usize = 8;
/// Entries per window (`2^STRIDE_BITS`).
pub const ENTRIES_PER_WINDOW: usize = 1 << STRIDE_BITS;
/// Registers per coordinate.
pub const REGISTERS: usize = 4;
/// Width of one register.
pub const REGISTER_BITS: usize = 64;

/// One point as `[x_registers, y_registers]` of decimal strings.
pub type ArtifactPoint = [[String; REGISTERS]; 2];

/// The full table as `[window][entry]` of [`ArtifactPoint`]s.
pub type ArtifactTable = Vec<Vec<ArtifactPoint>>;

/// Affine coordinates of a point split into little-endian registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointRegisters {
    /// x-coordinate, register 0 least significant.
    pub x: [u64; REGISTERS],
    /// y-coordinate, register 0 least significant.
    pub y: [u64; REGISTERS],
}

impl PointRegisters {
    /// Encoding of the point at infinity.
    pub const IDENTITY: Self = Self {
        x: [0; REGISTERS],
        y: [0; REGISTERS],
    };

    fn from_projective(point: &ProjectivePoint) -> Self {
        let encoded = point.to_affine().to_encoded_point(false);
        match (encoded.x(), encoded.y()) {
            (Some(x), Some(y)) => Self {
                x: split_registers(x),
                y: split_registers(y),
            },
            _ => Self::IDENTITY,
        }
    }

    /// Decimal rendering used in public signals and stored artifacts.
    pub fn to_strings(&self) -> ArtifactPoint {
        [self.x.map(|r| r.to_string()), self.y.map(|r| r.to_string())]
    }
}

fn split_registers(be_bytes: &FieldBytes) -> [u64; REGISTERS] {
    let mut regs = [0u64; REGISTERS];
    for (i, reg) in regs.iter_mut().enumerate() {
        let end = be_bytes.len() - i * (REGISTER_BITS / 8);
        let mut word = [0u8; 8];
        word.copy_from_slice(&be_bytes[end - 8..end]);
        *reg = u64::from_be_bytes(word);
    }
    regs
}

// ---------------------------------------------------------------------------
// SignatureArtifacts
// ---------------------------------------------------------------------------

/// The `(T, U)` pair bound into a membership proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureArtifacts {
    /// Row-major `[window][entry]`, `WINDOWS * ENTRIES_PER_WINDOW` long.
    table: Vec<PointRegisters>,
    u: PointRegisters,
    t_point: AffinePoint,
    u_point: AffinePoint,
}

impl SignatureArtifacts {
    /// Compute artifacts for a submitted signature claim.
    pub fn from_claim(claim: &SignatureClaim) -> Result<Self, ArtifactError> {
        let message = decode_hex(&claim.message)
            .map_err(|e| ArtifactError::InvalidMessage(e.to_string()))?;
        compute_artifacts(&claim.r, claim.is_ry_odd, &message)
    }

    /// Table entry `(j · 2^(8·window)) · T`.
    ///
    /// # Panics
    ///
    /// Panics if `window >= WINDOWS` or `entry >= ENTRIES_PER_WINDOW`.
    pub fn entry(&self, window: usize, entry: usize) -> &PointRegisters {
        assert!(window < WINDOWS && entry < ENTRIES_PER_WINDOW);
        &self.table[window * ENTRIES_PER_WINDOW + entry]
    }

    /// The `U` point.
    pub fn u(&self) -> &PointRegisters {
        &self.u
    }

    /// `T = r⁻¹ · R`, the base of the table.
    pub fn t_point(&self) -> &AffinePoint {
        &self.t_point
    }

    /// `U` as a curve point.
    pub fn u_point(&self) -> &AffinePoint {
        &self.u_point
    }

    /// The table as nested decimal strings, `[window][entry][coord][register]`.
    pub fn table_strings(&self) -> ArtifactTable {
        self.table
            .chunks(ENTRIES_PER_WINDOW)
            .map(|row| row.iter().map(PointRegisters::to_strings).collect())
            .collect()
    }

    /// `U` as decimal strings, `[coord][register]`.
    pub fn u_strings(&self) -> ArtifactPoint {
        self.u.to_strings()
    }
}

impl Serialize for SignatureArtifacts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SignatureArtifacts", 2)?;
        s.serialize_field("T", &self.table_strings())?;
        s.serialize_field("U", &self.u_strings())?;
        s.end()
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Derive `(T, U)` from the public signature components.
///
/// `r` is a big-endian hex scalar (optional `0x`), `is_ry_odd` the parity of
/// the nonce point's y-coordinate, and `message` the raw signed bytes.
pub fn compute_artifacts(
    r: &str,
    is_ry_odd: bool,
    message: &[u8],
) -> Result<SignatureArtifacts, ArtifactError> {
    let (t_point, u_point) = binding_points(r, is_ry_odd, message)?;
    let table = build_table(&t_point);
    Ok(SignatureArtifacts {
        table,
        u: PointRegisters::from_projective(&ProjectivePoint::from(u_point)),
        t_point,
        u_point,
    })
}

/// Compute only the two curve points `(T, U)`, without the window table.
pub fn binding_points(
    r: &str,
    is_ry_odd: bool,
    message: &[u8],
) -> Result<(AffinePoint, AffinePoint), ArtifactError> {
    let (r_scalar, r_bytes) = parse_r(r)?;
    let r_point = Option::<AffinePoint>::from(AffinePoint::decompress(
        &r_bytes,
        Choice::from(u8::from(is_ry_odd)),
    ))
    .ok_or_else(|| ArtifactError::InvalidR("no secp256k1 point has this x-coordinate".into()))?;

    let digest = keccak256(message);
    let m = <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(digest));
    derive_points(r_scalar, r_point, m)
}

fn derive_points(
    r: Scalar,
    r_point: AffinePoint,
    m: Scalar,
) -> Result<(AffinePoint, AffinePoint), ArtifactError> {
    if bool::from(m.is_zero()) {
        return Err(ArtifactError::DegenerateMessage);
    }
    let r_inv = Option::<Scalar>::from(r.invert())
        .ok_or_else(|| ArtifactError::InvalidR("r is not invertible".into()))?;

    let t = ProjectivePoint::from(r_point) * r_inv;
    let u = ProjectivePoint::GENERATOR * (-(r_inv * m));
    Ok((t.to_affine(), u.to_affine()))
}

fn parse_r(r: &str) -> Result<(Scalar, FieldBytes), ArtifactError> {
    let digits = strip_hex_prefix(r.trim());
    if digits.is_empty() || digits.len() > 64 {
        return Err(ArtifactError::InvalidR(format!(
            "expected 1-64 hex digits, got {}",
            digits.len()
        )));
    }
    let padded = format!("{digits:0>64}");
    let bytes = decode_hex(&padded).map_err(|e| ArtifactError::InvalidR(e.to_string()))?;
    let mut repr = FieldBytes::default();
    repr.copy_from_slice(&bytes);

    let scalar = Option::<Scalar>::from(Scalar::from_repr(repr))
        .ok_or_else(|| ArtifactError::InvalidR("r is not below the group order".into()))?;
    if bool::from(scalar.is_zero()) {
        return Err(ArtifactError::InvalidR("r is zero".into()));
    }
    Ok((scalar, repr))
}

fn build_table(t_point: &AffinePoint) -> Vec<PointRegisters> {
    let mut table = Vec::with_capacity(WINDOWS * ENTRIES_PER_WINDOW);
    let mut base = ProjectivePoint::from(*t_point);
    for _ in 0..WINDOWS {
        table.push(PointRegisters::IDENTITY);
        let mut acc = base;
        for _ in 1..ENTRIES_PER_WINDOW {
            table.push(PointRegisters::from_projective(&acc));
            acc += base;
        }
        // acc == 2^STRIDE_BITS · base
        base = acc;
    }
    table
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use anonpost_core::encoding::encode_hex;

    const MESSAGE: &[u8] = b"heyanon: propId=7 groupType=2";
    const R_HEX: &str = "0xf973a0b87062c389d125d8199e803b832b6ac6bf7867a4f6cd87506060fc4c58";
    const S_HEX: &str = "01d5106048c53538c2db06fb4e210dcefbef080e3d51a7e8e017a08267fef67e";
    const SECRET_KEY: u64 = 0x2a;

    fn regs(values: [&str; 4]) -> [u64; 4] {
        values.map(|v| v.parse().unwrap())
    }

    fn scalar_from_hex(hex: &str) -> Scalar {
        let bytes = decode_hex(&format!("{:0>64}", strip_hex_prefix(hex))).unwrap();
        Option::from(Scalar::from_repr(FieldBytes::clone_from_slice(&bytes))).unwrap()
    }

    fn fixture() -> SignatureArtifacts {
        compute_artifacts(R_HEX, true, MESSAGE).unwrap()
    }

    #[test]
    fn register_split_of_generator() {
        let g = PointRegisters::from_projective(&ProjectivePoint::GENERATOR);
        assert_eq!(
            g.x,
            regs([
                "6481385041966929816",
                "188021827762530521",
                "6170039885052185351",
                "8772561819708210092"
            ])
        );
        assert_eq!(
            g.y,
            regs([
                "11261198710074299576",
                "18237243440184513561",
                "6747795201694173352",
                "5204712524664259685"
            ])
        );
    }

    #[test]
    fn identity_encodes_as_zeros() {
        assert_eq!(
            PointRegisters::from_projective(&ProjectivePoint::IDENTITY),
            PointRegisters::IDENTITY
        );
    }

    #[test]
    fn known_vector_t_and_u() {
        let a = fixture();
        let t = a.entry(0, 1);
        assert_eq!(
            t.x,
            regs([
                "11104690495993307358",
                "6836510829462618084",
                "5838476881954985289",
                "4105143250092783620"
            ])
        );
        assert_eq!(
            t.y,
            regs([
                "2945786070869281491",
                "6075231500406013725",
                "5509201002482411947",
                "10186071514254342633"
            ])
        );
        assert_eq!(
            a.u().x,
            regs([
                "4299032637006751517",
                "17977969543835961360",
                "11078880617009242082",
                "11904114540169407536"
            ])
        );
        assert_eq!(
            a.u().y,
            regs([
                "10934463785849754865",
                "10770137073052894774",
                "7348619854927789918",
                "9474300678510357166"
            ])
        );
    }

    #[test]
    fn known_vector_table_entries() {
        let a = fixture();
        for window in 0..WINDOWS {
            assert_eq!(*a.entry(window, 0), PointRegisters::IDENTITY);
        }
        let w1 = a.entry(1, 1);
        assert_eq!(
            w1.x,
            regs([
                "1735272428343528768",
                "17629417371650789081",
                "11443797575230143231",
                "16751685967713757676"
            ])
        );
        assert_eq!(
            w1.y,
            regs([
                "15659778730562342537",
                "3716588457258443014",
                "6441389065183981827",
                "1579580886374272056"
            ])
        );
        let last = a.entry(WINDOWS - 1, ENTRIES_PER_WINDOW - 1);
        assert_eq!(
            last.x,
            regs([
                "170696286311804558",
                "7839195975005049058",
                "8366292301691587791",
                "7320760394128139871"
            ])
        );
        assert_eq!(
            last.y,
            regs([
                "2310773050217394937",
                "14386779164772740255",
                "10985214525867382657",
                "17680463715731350124"
            ])
        );
    }

    #[test]
    fn secret_scalar_recovers_public_key() {
        let a = fixture();
        let s = scalar_from_hex(S_HEX);
        let lhs = ProjectivePoint::from(*a.t_point()) * s + ProjectivePoint::from(*a.u_point());
        let q = ProjectivePoint::GENERATOR * Scalar::from(SECRET_KEY);
        assert_eq!(lhs.to_affine(), q.to_affine());
    }

    #[test]
    fn table_shape_and_strings() {
        let a = fixture();
        let table = a.table_strings();
        assert_eq!(table.len(), WINDOWS);
        assert!(table.iter().all(|row| row.len() == ENTRIES_PER_WINDOW));
        assert_eq!(table[0][0], PointRegisters::IDENTITY.to_strings());
        assert_eq!(table[0][0][0][0], "0");
        assert_eq!(table[0][1][0][0], "11104690495993307358");
        assert_eq!(a.u_strings()[1][3], "9474300678510357166");
    }

    #[test]
    fn computation_is_deterministic() {
        let a = fixture();
        let b = fixture();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn parity_selects_the_other_point() {
        let odd = binding_points(R_HEX, true, MESSAGE).unwrap();
        let even = binding_points(R_HEX, false, MESSAGE).unwrap();
        assert_ne!(odd.0, even.0);
        assert_eq!(odd.1, even.1);
    }

    #[test]
    fn prefix_and_padding_are_accepted() {
        let plain = binding_points(R_HEX.trim_start_matches("0x"), true, MESSAGE).unwrap();
        assert_eq!(plain, binding_points(R_HEX, true, MESSAGE).unwrap());
    }

    #[test]
    fn r_not_on_curve_is_rejected() {
        assert!(matches!(
            compute_artifacts("0x05", true, MESSAGE),
            Err(ArtifactError::InvalidR(_))
        ));
    }

    #[test]
    fn r_out_of_range_is_rejected() {
        let too_long = "1".repeat(65);
        for bad in [
            "0x0",
            "",
            "0xzz",
            // the group order n
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
            too_long.as_str(),
        ] {
            assert!(
                matches!(binding_points(bad, false, MESSAGE), Err(ArtifactError::InvalidR(_))),
                "accepted r = {bad:?}"
            );
        }
    }

    #[test]
    fn zero_message_scalar_is_degenerate() {
        let (r, bytes) = parse_r(R_HEX).unwrap();
        let r_point = Option::<AffinePoint>::from(AffinePoint::decompress(
            &bytes,
            Choice::from(1),
        ))
        .unwrap();
        assert_eq!(
            derive_points(r, r_point, Scalar::ZERO),
            Err(ArtifactError::DegenerateMessage)
        );
    }

    #[test]
    fn claim_with_bad_message_hex_is_rejected() {
        let claim = SignatureClaim {
            r: R_HEX.into(),
            is_ry_odd: true,
            message: "0xabc".into(),
            eip712_value: anonpost_core::Eip712Value {
                prop_id: anonpost_core::PropId::new(7),
                group_type: anonpost_core::GroupType::new(2),
            },
        };
        assert!(matches!(
            SignatureArtifacts::from_claim(&claim),
            Err(ArtifactError::InvalidMessage(_))
        ));
    }

    #[test]
    fn claim_message_is_hex_of_signed_bytes() {
        let claim = SignatureClaim {
            r: R_HEX.into(),
            is_ry_odd: true,
            message: format!("0x{}", encode_hex(MESSAGE)),
            eip712_value: anonpost_core::Eip712Value {
                prop_id: anonpost_core::PropId::new(7),
                group_type: anonpost_core::GroupType::new(2),
            },
        };
        assert_eq!(SignatureArtifacts::from_claim(&claim).unwrap(), fixture());
    }
}
