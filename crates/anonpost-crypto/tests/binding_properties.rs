//! The binding points must let the holder of `s` reconstruct their public
//! key, for any key, nonce, and message.

use anonpost_core::encoding::encode_hex;
use anonpost_crypto::artifacts::binding_points;
use anonpost_crypto::keccak256;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, ProjectivePoint, Scalar, U256};
use proptest::prelude::*;

struct Signed {
    r_hex: String,
    is_ry_odd: bool,
    s: Scalar,
    public_key: ProjectivePoint,
}

fn sign(secret: u64, nonce: u64, message: &[u8]) -> Option<Signed> {
    let d = Scalar::from(secret);
    let k = Scalar::from(nonce);
    let nonce_point = (ProjectivePoint::GENERATOR * k).to_affine().to_encoded_point(false);
    let x = nonce_point.x()?;
    let y = nonce_point.y()?;
    let r = <Scalar as Reduce<U256>>::reduce_bytes(x);
    if bool::from(r.is_zero()) {
        return None;
    }
    let m = <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(keccak256(message)));
    let k_inv = Option::<Scalar>::from(k.invert())?;
    Some(Signed {
        r_hex: encode_hex(&r.to_bytes()),
        is_ry_odd: y[31] & 1 == 1,
        s: k_inv * (m + r * d),
        public_key: ProjectivePoint::GENERATOR * d,
    })
}

proptest! {
    #[test]
    fn s_times_t_plus_u_is_public_key(
        secret in 1u64..,
        nonce in 1u64..,
        message in prop::collection::vec(any::<u8>(), 0..96),
    ) {
        let signed = sign(secret, nonce, &message).unwrap();
        let (t, u) = binding_points(&signed.r_hex, signed.is_ry_odd, &message).unwrap();
        let recovered = ProjectivePoint::from(t) * signed.s + ProjectivePoint::from(u);
        prop_assert_eq!(recovered.to_affine(), signed.public_key.to_affine());
    }

    #[test]
    fn wrong_message_breaks_binding(
        secret in 1u64..,
        nonce in 1u64..,
        message in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let signed = sign(secret, nonce, &message).unwrap();
        let mut other = message.clone();
        other[0] ^= 0x01;
        let (t, u) = binding_points(&signed.r_hex, signed.is_ry_odd, &other).unwrap();
        let recovered = ProjectivePoint::from(t) * signed.s + ProjectivePoint::from(u);
        prop_assert_ne!(recovered.to_affine(), signed.public_key.to_affine());
    }
}
