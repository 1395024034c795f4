//! RFC 4648 Base32 codec for shared secrets.
//!
//! Decoding is permissive: case is ignored, the first `=` ends the input and
//! trailing bits that do not fill a whole byte are dropped.

use base32::Alphabet;

use crate::error::{Error, Result};

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const PADDING: char = '=';

#[inline]
fn symbol_value(character: char) -> Option<u8> {
    if !character.is_ascii() {
        return None;
    }

    let symbol = character.to_ascii_uppercase() as u8;
    ALPHABET.iter().position(|&s| s == symbol).map(|p| p as u8)
}

/// Decode Base32 text into raw bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidCharacter`] if a symbol outside the alphabet
/// appears before padding.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for (position, character) in text.chars().enumerate() {
        if character == PADDING {
            break;
        }

        let value = symbol_value(character)
            .ok_or(Error::InvalidCharacter { character, position })?;

        buffer = (buffer << 5) | value as u32;
        bits += 5;

        if bits >= 8 {
            bits -= 8;
            bytes.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    Ok(bytes)
}

/// Encode bytes as uppercase Base32 without padding.
pub fn encode(bytes: &[u8]) -> String {
    base32::encode(Alphabet::Rfc4648 { padding: false }, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_padded(bytes: &[u8]) -> String {
        base32::encode(Alphabet::Rfc4648 { padding: true }, bytes)
    }

    const VECTORS: &[(&str, &str, &str)] = &[
        ("", "", ""),
        ("f", "MY", "MY======"),
        ("fo", "MZXQ", "MZXQ===="),
        ("foo", "MZXW6", "MZXW6==="),
        ("foob", "MZXW6YQ", "MZXW6YQ="),
        ("fooba", "MZXW6YTB", "MZXW6YTB"),
        ("foobar", "MZXW6YTBOI", "MZXW6YTBOI======"),
    ];

    #[test]
    fn test_rfc4648_vectors() {
        for (plain, unpadded, padded) in VECTORS {
            assert_eq!(encode(plain.as_bytes()), *unpadded);
            assert_eq!(encode_padded(plain.as_bytes()), *padded);
            assert_eq!(decode(unpadded).unwrap(), plain.as_bytes());
            assert_eq!(decode(padded).unwrap(), plain.as_bytes());
        }
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        assert_eq!(decode("mzxw6ytboi").unwrap(), b"foobar");
        assert_eq!(decode("MzXw6YtBoI").unwrap(), b"foobar");
    }

    #[test]
    fn test_decode_stops_at_padding() {
        // Anything after the first `=` is ignored, even invalid symbols.
        assert_eq!(decode("MZXW6===!!").unwrap(), b"foo");
        assert_eq!(decode("MY=MZXW6").unwrap(), b"f");
        assert!(decode("=").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_invalid_character() {
        match decode("MZX1W6") {
            Err(Error::InvalidCharacter { character, position }) => {
                assert_eq!(character, '1');
                assert_eq!(position, 3);
            },
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(decode("JBSWY3DP EHPK3PXP").is_err());
        assert!(decode("JBSWY3DPÉ").is_err());
    }

    #[test]
    fn test_round_trip() {
        for length in 0..=64usize {
            let bytes: Vec<u8> = (0..length)
                .map(|i| (i as u8).wrapping_mul(37).wrapping_add(length as u8))
                .collect();

            assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
            assert_eq!(decode(&encode_padded(&bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn test_agrees_with_base32_crate() {
        let text = "JBSWY3DPEHPK3PXP";
        let expected =
            base32::decode(Alphabet::Rfc4648 { padding: false }, text).unwrap();

        assert_eq!(decode(text).unwrap(), expected);
    }
}
