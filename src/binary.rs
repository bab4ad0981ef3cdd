//! Binary reading utilities for unescaped frames.
//!
//! Frame fields are read from plain byte slices. All functions perform
//! bounds checking and report truncation through
//! [`FrameError::UnexpectedEof`], which the analyzer stores as the reason
//! code of an absent record.
//!
//! # Endianness
//!
//! Multi-byte fields are little-endian: the lowest-offset byte contributes
//! the least significant bits.
//!
//! # Example
//!
//! ```
//! use hdlc_speed::binary::{read_bits_le, read_bytes};
//!
//! let frame = [0x10, 0x20, 0x00, 0xF0, 0x0F];
//!
//! let payload = read_bytes(&frame, 2, 3).unwrap();
//! assert_eq!(payload, &[0x00, 0xF0, 0x0F]);
//!
//! // Bits 8..20 of the little-endian value 0x0FF000
//! assert_eq!(read_bits_le(payload, 8, 12), 0xFF0);
//! ```

use crate::error::FrameError;

/// Reads a slice of bytes from the buffer at the given offset.
///
/// # Errors
///
/// Returns `FrameError::UnexpectedEof` if the buffer doesn't contain
/// at least `len` bytes starting from the given offset.
///
/// # Example
///
/// ```
/// use hdlc_speed::binary::read_bytes;
///
/// let data = [0x7E, 0x01, 0x02, 0x03];
/// assert_eq!(read_bytes(&data, 1, 2).unwrap(), &[0x01, 0x02]);
/// assert!(read_bytes(&data, 3, 2).is_err());
/// ```
pub fn read_bytes(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], FrameError> {
    let end = offset.saturating_add(len);
    if end > bytes.len() {
        return Err(FrameError::unexpected_eof(end, bytes.len()));
    }

    Ok(&bytes[offset..end])
}

/// Extracts a bit field from a byte slice read as one little-endian integer.
///
/// The slice is treated as an unsigned integer of arbitrary width where
/// `bytes[0]` holds bits 0..8. The result equals
/// `(value >> shift) & ((1 << width) - 1)`. Bits past the end of the slice
/// read as zero, exactly as they would for the assembled integer.
///
/// `width` is clamped to 64.
///
/// # Example
///
/// ```
/// use hdlc_speed::binary::read_bits_le;
///
/// let data = [0x34, 0x12];
/// assert_eq!(read_bits_le(&data, 0, 16), 0x1234);
/// assert_eq!(read_bits_le(&data, 4, 8), 0x23);
/// assert_eq!(read_bits_le(&data, 12, 12), 0x1);
/// ```
#[must_use]
pub fn read_bits_le(bytes: &[u8], shift: u32, width: u32) -> u64 {
    let width = width.min(64);
    let mut value = 0u64;

    for bit in 0..width {
        let position = shift as usize + bit as usize;
        let Some(&byte) = bytes.get(position / 8) else {
            break;
        };
        if (byte >> (position % 8)) & 1 == 1 {
            value |= 1u64 << bit;
        }
    }

    value
}
