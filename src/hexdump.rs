//! Byte extraction from textual hex dumps.
//!
//! Captures arrive as text: a hex dump with arbitrary surrounding format
//! (whitespace or newline separated pairs, address columns, separators).
//! [`extract_bytes`] scans the text for every two-digit hexadecimal pair,
//! left to right and without overlap, and decodes each pair into one byte.
//! Anything that is not part of a pair is ignored.
//!
//! # Example
//!
//! ```
//! use hdlc_speed::hexdump::{extract_bytes, format_bytes};
//!
//! let bytes = extract_bytes("7E 01 a2\n7e");
//! assert_eq!(bytes, vec![0x7E, 0x01, 0xA2, 0x7E]);
//! assert_eq!(format_bytes(&bytes), "7E 01 A2 7E");
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Pattern for a single hexadecimal byte pair.
pub const HEX_PAIR_PATTERN: &str = "[0-9A-Fa-f]{2}";

static HEX_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HEX_PAIR_PATTERN).expect("hex pair pattern is valid"));

/// Decodes every hexadecimal pair found in `text` into a byte.
///
/// Matches are leftmost-first and non-overlapping, so `"ABC"` yields only
/// `0xAB` and `"0x7E"` yields only `0x7E` (the `0x` prefix is not a pair).
/// Text without any pair yields an empty vector.
#[must_use]
pub fn extract_bytes(text: &str) -> Vec<u8> {
    HEX_PAIR
        .find_iter(text)
        .filter_map(|pair| {
            let mut byte = [0u8; 1];
            hex::decode_to_slice(pair.as_str(), &mut byte).ok()?;
            Some(byte[0])
        })
        .collect()
}

/// Renders bytes as space separated upper-case hex pairs.
///
/// The output is accepted by [`extract_bytes`].
#[must_use]
pub fn format_bytes(bytes: &[u8]) -> String {
    let encoded = hex::encode_upper(bytes);
    let mut out = String::with_capacity(encoded.len() + bytes.len());
    for (i, pair) in encoded.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(char::from(pair[0]));
        out.push(char::from(pair[1]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_pair_pattern_compiles() {
        assert!(Regex::new(HEX_PAIR_PATTERN).is_ok());
        assert!(HEX_PAIR.is_match("7e"));
    }

    #[test]
    fn test_extract_bytes_space_separated() {
        assert_eq!(extract_bytes("7E 10 20 7E"), vec![0x7E, 0x10, 0x20, 0x7E]);
    }

    #[test]
    fn test_extract_bytes_case_insensitive() {
        assert_eq!(extract_bytes("ab AB aB"), vec![0xAB, 0xAB, 0xAB]);
    }

    #[test]
    fn test_extract_bytes_newlines_and_separators() {
        let text = "7e,01;02\r\n03|7E";
        assert_eq!(extract_bytes(text), vec![0x7E, 0x01, 0x02, 0x03, 0x7E]);
    }

    #[test]
    fn test_extract_bytes_contiguous_digits() {
        // Pairs are taken left to right without overlap; the odd tail is dropped
        assert_eq!(extract_bytes("7E01020"), vec![0x7E, 0x01, 0x02]);
        assert_eq!(extract_bytes("ABC"), vec![0xAB]);
    }

    #[test]
    fn test_extract_bytes_stray_single_digits() {
        assert_eq!(extract_bytes("1 2 3 45 6"), vec![0x45]);
    }

    #[test]
    fn test_extract_bytes_prefixed_values() {
        assert_eq!(extract_bytes("0x7E 0x10"), vec![0x7E, 0x10]);
    }

    #[test]
    fn test_extract_bytes_address_column_is_decoded() {
        // Address columns made of hex digits are not distinguishable from data
        assert_eq!(extract_bytes("0010: 7E"), vec![0x00, 0x10, 0x7E]);
    }

    #[test]
    fn test_extract_bytes_empty() {
        assert!(extract_bytes("").is_empty());
        assert!(extract_bytes("no pairs here!").is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(&[0x7E, 0x0A, 0xFF]), "7E 0A FF");
        assert_eq!(format_bytes(&[]), "");
    }

    #[test]
    fn test_format_then_extract() {
        let bytes: Vec<u8> = (0..=255).collect();
        assert_eq!(extract_bytes(&format_bytes(&bytes)), bytes);
    }
}
