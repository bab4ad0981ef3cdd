//! Error types for the capture decoder.
//!
//! Two error families exist:
//!
//! - [`ParserError`] covers crate-level operations that can genuinely fail:
//!   reading a capture, loading a frame layout, exporting or plotting results.
//! - [`FrameError`] is the per-frame reason code attached to a checksum or
//!   speed result. A frame error never aborts the pipeline; it only marks the
//!   corresponding record as absent.

use thiserror::Error;

/// The main error type for capture decoding operations.
///
/// # Example
///
/// ```
/// use hdlc_speed::error::{ParserError, Result};
///
/// fn example_operation() -> Result<()> {
///     Err(ParserError::InvalidLayout {
///         reason: "payload_len must be non-zero".to_string(),
///     })
/// }
///
/// assert!(example_operation().is_err());
/// ```
#[derive(Error, Debug)]
pub enum ParserError {
    /// An I/O error occurred while reading a capture or writing a report.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A frame layout failed validation.
    ///
    /// Returned by [`FrameLayout::validate`](crate::layout::FrameLayout::validate)
    /// and by layout loading when a field combination cannot describe a
    /// speed field inside the payload.
    #[error("Invalid frame layout: {reason}")]
    InvalidLayout {
        /// A description of what makes the layout invalid.
        reason: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The speed chart could not be rendered.
    #[error("Plot failed: {reason}")]
    Plot {
        /// A description of the rendering failure.
        reason: String,
    },
}

/// Reason a single frame produced no checksum or speed record.
///
/// Unlike [`ParserError`] this type is `Clone` and `PartialEq` so it can be
/// stored inside per-frame results and compared in tests.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The unescaped frame is too short to hold a data section and a
    /// trailing checksum byte.
    #[error("Frame too short for checksum: {available} byte(s), need at least 2")]
    MissingChecksum {
        /// The number of unescaped bytes in the frame.
        available: usize,
    },

    /// The frame ended before a required field could be read.
    #[error("Unexpected end of frame: expected {expected} bytes, but only {available} available")]
    UnexpectedEof {
        /// The number of bytes that were needed.
        expected: usize,
        /// The number of bytes actually available.
        available: usize,
    },
}

impl FrameError {
    /// Creates an `UnexpectedEof` error with the given sizes.
    ///
    /// # Example
    ///
    /// ```
    /// use hdlc_speed::error::FrameError;
    ///
    /// let err = FrameError::unexpected_eof(19, 18);
    /// assert!(err.to_string().contains("expected 19 bytes"));
    /// ```
    #[must_use]
    pub fn unexpected_eof(expected: usize, available: usize) -> Self {
        FrameError::UnexpectedEof {
            expected,
            available,
        }
    }
}

/// A specialized Result type for crate-level operations.
pub type Result<T> = std::result::Result<T, ParserError>;
