//! Hex encoding helpers shared by the digest, signature-claim, and CLI code.

use crate::error::ValidationError;

/// Render bytes as lowercase hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Strip an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode a hex string (optional `0x` prefix) into bytes.
///
/// Odd-length input is rejected rather than left-padded: a message digest
/// with a dropped nibble must not silently hash to something else.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, ValidationError> {
    let digits = strip_hex_prefix(s.trim());
    if digits.len() % 2 != 0 {
        return Err(ValidationError::InvalidHex(format!(
            "odd number of hex digits ({})",
            digits.len()
        )));
    }
    digits
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let hi = hex_value(pair[0])?;
            let lo = hex_value(pair[1])?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn hex_value(c: u8) -> Result<u8, ValidationError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        other => Err(ValidationError::InvalidHex(format!(
            "invalid hex character {:?}",
            other as char
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        let bytes = [0x00, 0x7f, 0xab, 0xff];
        assert_eq!(encode_hex(&bytes), "007fabff");
        assert_eq!(decode_hex("007fabff").unwrap(), bytes);
        assert_eq!(decode_hex("0x007FABFF").unwrap(), bytes);
    }

    #[test]
    fn empty_is_valid() {
        assert!(decode_hex("").unwrap().is_empty());
        assert!(decode_hex("0x").unwrap().is_empty());
    }

    #[test]
    fn odd_length_rejected() {
        assert!(decode_hex("abc").is_err());
    }

    #[test]
    fn non_hex_rejected() {
        assert!(decode_hex("zz").is_err());
    }
}
