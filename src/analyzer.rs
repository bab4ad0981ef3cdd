//! Per-frame analysis: FCS validation and speed extraction.
//!
//! Both operations work on one unescaped frame and are independent of each
//! other. A frame that is too short for one of them still gets the other:
//!
//! - The checksum needs at least 2 bytes (data section plus FCS).
//! - The speed needs at least [`FrameLayout::min_frame_len`] bytes
//!   (19 with the default layout).
//!
//! # FCS
//!
//! The FCS is the last byte of the frame and equals
//! `0xFF - (sum(data) mod 256)` over every preceding byte.
//!
//! # Example
//!
//! ```
//! use hdlc_speed::analyzer::{compute_fcs, verify_checksum};
//!
//! let data = [0x10, 0x20];
//! let fcs = compute_fcs(&data);
//! assert_eq!(fcs, 0xCF);
//!
//! let record = verify_checksum(&[0x10, 0x20, fcs]).unwrap();
//! assert!(record.valid);
//! ```

use serde::Serialize;
use tracing::trace;

use crate::binary::{read_bits_le, read_bytes};
use crate::error::FrameError;
use crate::escape::{unescape_with_faults, EscapeFault};
use crate::layout::FrameLayout;

/// Result of validating one frame's FCS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecksumRecord {
    /// FCS computed over the data section.
    pub computed: u8,

    /// FCS carried in the last byte of the frame.
    pub received: u8,

    /// Whether the two match.
    pub valid: bool,
}

/// Speed decoded from one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedRecord {
    /// Raw field value before scaling.
    pub raw: u64,

    /// Speed in km/h.
    pub speed_kmh: f64,
}

/// Computes the FCS of a data section.
#[must_use]
pub fn compute_fcs(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0xFF - sum
}

/// Validates the trailing FCS byte of an unescaped frame.
///
/// # Errors
///
/// Returns `FrameError::MissingChecksum` if the frame has fewer than two
/// bytes, since there is no data section separate from the FCS.
pub fn verify_checksum(frame: &[u8]) -> Result<ChecksumRecord, FrameError> {
    let Some((&received, data)) = frame.split_last().filter(|(_, data)| !data.is_empty()) else {
        return Err(FrameError::MissingChecksum {
            available: frame.len(),
        });
    };

    let computed = compute_fcs(data);
    Ok(ChecksumRecord {
        computed,
        received,
        valid: computed == received,
    })
}

/// Extracts the speed field from an unescaped frame.
///
/// Reads `layout.payload_len` bytes after the header as one little-endian
/// integer, takes `layout.speed_bits` bits starting at `layout.speed_shift`
/// and multiplies by `layout.speed_scale`.
///
/// # Errors
///
/// Returns `FrameError::UnexpectedEof` if the frame is shorter than
/// `layout.min_frame_len()`.
///
/// # Example
///
/// ```
/// use hdlc_speed::analyzer::extract_speed;
/// use hdlc_speed::layout::FrameLayout;
///
/// let mut frame = [0u8; 20];
/// frame[3] = 0xE8; // raw 0x3E8 = 1000
/// frame[4] = 0x03;
/// let record = extract_speed(&frame, &FrameLayout::default()).unwrap();
/// assert_eq!(record.raw, 1000);
/// assert!((record.speed_kmh - 100.0).abs() < 1e-9);
/// ```
pub fn extract_speed(frame: &[u8], layout: &FrameLayout) -> Result<SpeedRecord, FrameError> {
    let payload = read_bytes(frame, layout.header_len, layout.payload_len)?;
    let raw = read_bits_le(payload, layout.speed_shift, layout.speed_bits);

    #[allow(clippy::cast_precision_loss)]
    let speed_kmh = raw as f64 * layout.speed_scale;

    Ok(SpeedRecord { raw, speed_kmh })
}

/// Everything learned about one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    /// 1-based position of the frame in the capture.
    pub index: usize,

    /// Length of the frame as captured (still escaped).
    pub escaped_len: usize,

    /// Length after unescaping.
    pub unescaped_len: usize,

    /// Malformed escape sequences dropped from the frame.
    pub escape_faults: Vec<EscapeFault>,

    /// FCS validation result.
    pub checksum: Result<ChecksumRecord, FrameError>,

    /// Speed extraction result.
    pub speed: Result<SpeedRecord, FrameError>,
}

impl FrameAnalysis {
    /// Returns whether the frame carried a matching FCS.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self.checksum, Ok(ChecksumRecord { valid: true, .. }))
    }

    /// Returns the decoded speed in km/h, if any.
    #[must_use]
    pub fn speed_kmh(&self) -> Option<f64> {
        self.speed.as_ref().ok().map(|s| s.speed_kmh)
    }
}

/// Unescapes one escaped frame and runs both analyses on it.
///
/// `index` is the 1-based frame position, carried through unchanged.
#[must_use]
pub fn analyze_frame(index: usize, escaped: &[u8], layout: &FrameLayout) -> FrameAnalysis {
    let unescaped = unescape_with_faults(escaped);
    let checksum = verify_checksum(&unescaped.bytes);
    let speed = extract_speed(&unescaped.bytes, layout);

    trace!(
        index,
        escaped_len = escaped.len(),
        unescaped_len = unescaped.bytes.len(),
        faults = unescaped.faults.len(),
        "analyzed frame"
    );

    FrameAnalysis {
        index,
        escaped_len: escaped.len(),
        unescaped_len: unescaped.bytes.len(),
        escape_faults: unescaped.faults,
        checksum,
        speed,
    }
}
