//! Byte-stuffing escape and unescape for frame payloads.
//!
//! Inside a frame, the delimiter and escape bytes are transmitted as two-byte
//! sequences:
//!
//! | Literal | Escaped     |
//! |---------|-------------|
//! | `0x7E`  | `0x7D 0x5E` |
//! | `0x7D`  | `0x7D 0x5D` |
//!
//! Unescaping is lenient. An escape marker followed by any other byte drops
//! both bytes, and a lone escape marker at the end of the frame is dropped.
//! The frame is truncated rather than rejected; checksum validation is what
//! detects the corruption. [`unescape_with_faults`] reports every dropped
//! sequence as an [`EscapeFault`].
//!
//! # Example
//!
//! ```
//! use hdlc_speed::escape::{escape, unescape};
//!
//! let payload = [0x01, 0x7E, 0x7D, 0x02];
//! let escaped = escape(&payload);
//! assert_eq!(escaped, vec![0x01, 0x7D, 0x5E, 0x7D, 0x5D, 0x02]);
//! assert_eq!(unescape(&escaped), payload);
//! ```

use serde::Serialize;

use crate::framing::FLAG;

/// Escape marker byte.
pub const ESCAPE: u8 = 0x7D;

/// Second byte of an escaped delimiter (`0x7D 0x5E` -> `0x7E`).
pub const ESCAPED_FLAG: u8 = 0x5E;

/// Second byte of an escaped escape marker (`0x7D 0x5D` -> `0x7D`).
pub const ESCAPED_ESCAPE: u8 = 0x5D;

/// A malformed escape sequence that was dropped during unescaping.
///
/// Offsets refer to the position of the escape marker in the escaped frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscapeFault {
    /// The escape marker was followed by a byte other than `0x5E` or `0x5D`.
    /// Both bytes were dropped.
    InvalidEscape {
        /// Offset of the escape marker.
        offset: usize,
        /// The byte that followed the marker.
        byte: u8,
    },

    /// The escape marker was the last byte of the frame and was dropped.
    DanglingEscape {
        /// Offset of the escape marker.
        offset: usize,
    },
}

/// An unescaped frame together with any dropped escape sequences.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unescaped {
    /// The unescaped bytes.
    pub bytes: Vec<u8>,

    /// Malformed escape sequences encountered, in frame order.
    pub faults: Vec<EscapeFault>,
}

impl Unescaped {
    /// Returns whether every escape sequence in the frame was well formed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Unescapes one frame and records malformed escape sequences.
///
/// The output never exceeds the input length.
#[must_use]
pub fn unescape_with_faults(frame: &[u8]) -> Unescaped {
    let mut out = Unescaped {
        bytes: Vec::with_capacity(frame.len()),
        faults: Vec::new(),
    };

    let mut i = 0;
    while i < frame.len() {
        if frame[i] == ESCAPE {
            match frame.get(i + 1) {
                Some(&ESCAPED_FLAG) => out.bytes.push(FLAG),
                Some(&ESCAPED_ESCAPE) => out.bytes.push(ESCAPE),
                Some(&byte) => out.faults.push(EscapeFault::InvalidEscape { offset: i, byte }),
                None => out.faults.push(EscapeFault::DanglingEscape { offset: i }),
            }
            i += 2;
        } else {
            out.bytes.push(frame[i]);
            i += 1;
        }
    }

    out
}

/// Unescapes one frame, silently dropping malformed escape sequences.
#[must_use]
pub fn unescape(frame: &[u8]) -> Vec<u8> {
    unescape_with_faults(frame).bytes
}

/// Escapes a payload so it contains neither delimiter nor bare escape bytes.
#[must_use]
pub fn escape(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len());
    for &byte in payload {
        match byte {
            FLAG => out.extend_from_slice(&[ESCAPE, ESCAPED_FLAG]),
            ESCAPE => out.extend_from_slice(&[ESCAPE, ESCAPED_ESCAPE]),
            _ => out.push(byte),
        }
    }
    out
}

/// Escapes a payload and wraps it in delimiters, ready to append to a stream.
///
/// # Example
///
/// ```
/// use hdlc_speed::escape::encode_frame;
///
/// assert_eq!(encode_frame(&[0x7E]), vec![0x7E, 0x7D, 0x5E, 0x7E]);
/// ```
#[must_use]
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let escaped = escape(payload);
    let mut framed = Vec::with_capacity(escaped.len() + 2);
    framed.push(FLAG);
    framed.extend_from_slice(&escaped);
    framed.push(FLAG);
    framed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_flag() {
        assert_eq!(unescape(&[0x01, 0x7D, 0x5E, 0x02]), vec![0x01, 0x7E, 0x02]);
    }

    #[test]
    fn test_unescape_escape() {
        assert_eq!(unescape(&[0x7D, 0x5D]), vec![0x7D]);
    }

    #[test]
    fn test_unescape_plain_bytes_untouched() {
        let frame = [0x00, 0x5E, 0x5D, 0xFF];
        assert_eq!(unescape(&frame), frame.to_vec());
    }

    #[test]
    fn test_unescape_invalid_escape_drops_both() {
        let result = unescape_with_faults(&[0x01, 0x7D, 0x20, 0x02]);
        assert_eq!(result.bytes, vec![0x01, 0x02]);
        assert_eq!(
            result.faults,
            vec![EscapeFault::InvalidEscape {
                offset: 1,
                byte: 0x20
            }]
        );
        assert!(!result.is_clean());
    }

    #[test]
    fn test_unescape_invalid_escape_consumes_next_marker() {
        // 7D 7D is an invalid pair: the second 7D is consumed, not re-read
        let result = unescape_with_faults(&[0x7D, 0x7D, 0x5E]);
        assert_eq!(result.bytes, vec![0x5E]);
        assert_eq!(result.faults.len(), 1);
    }

    #[test]
    fn test_unescape_dangling_escape() {
        let result = unescape_with_faults(&[0x01, 0x7D]);
        assert_eq!(result.bytes, vec![0x01]);
        assert_eq!(result.faults, vec![EscapeFault::DanglingEscape { offset: 1 }]);
    }

    #[test]
    fn test_unescape_can_yield_empty() {
        assert!(unescape(&[0x7D, 0x00]).is_empty());
        assert!(unescape(&[0x7D]).is_empty());
    }

    #[test]
    fn test_unescape_never_grows() {
        let frames: [&[u8]; 5] = [
            &[0x7D, 0x5E, 0x7D, 0x5D],
            &[0x7D],
            &[0x01, 0x02, 0x03],
            &[0x7D, 0x01, 0x7D, 0x7D],
            &[],
        ];
        for frame in frames {
            assert!(unescape(frame).len() <= frame.len());
        }
    }

    #[test]
    fn test_unescape_repeatable() {
        let frame = [0x10, 0x7D, 0x5E, 0x7D, 0x33, 0x7D];
        assert_eq!(unescape_with_faults(&frame), unescape_with_faults(&frame));
    }

    #[test]
    fn test_escape_inverse() {
        let payload: Vec<u8> = (0..=255).collect();
        let escaped = escape(&payload);
        assert!(!escaped.contains(&FLAG));
        assert_eq!(escaped.len(), payload.len() + 2);

        let result = unescape_with_faults(&escaped);
        assert!(result.is_clean());
        assert_eq!(result.bytes, payload);
    }

    #[test]
    fn test_escape_without_special_bytes_is_identity() {
        let payload = [0x00, 0x10, 0x5E, 0x5D];
        assert_eq!(escape(&payload), payload.to_vec());
    }

    #[test]
    fn test_encode_frame() {
        assert_eq!(
            encode_frame(&[0x01, 0x7D]),
            vec![0x7E, 0x01, 0x7D, 0x5D, 0x7E]
        );
    }
}
