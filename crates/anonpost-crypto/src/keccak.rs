//! Keccak-256 (the pre-standard SHA-3 padding used by Ethereum).

use sha3::{Digest, Keccak256};

/// Hash `data` with Keccak-256.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let hash = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anonpost_core::encoding::encode_hex;

    #[test]
    fn empty_input_vector() {
        assert_eq!(
            encode_hex(&keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn abc_vector() {
        assert_eq!(
            encode_hex(&keccak256(b"abc")),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }
}
