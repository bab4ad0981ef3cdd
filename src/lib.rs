//! # hdlc-speed
//!
//! Decoder for speed sensor captures framed with HDLC-style byte stuffing.
//!
//! A capture is a textual hex dump of a byte stream in which frames are
//! delimited by `0x7E` and escaped with `0x7D`. Each frame ends with an
//! additive-complement FCS byte and carries a 12-bit speed field in its
//! data section.
//!
//! ## Quick Start
//!
//! ```
//! use hdlc_speed::{AnalyzerConfig, Capture};
//!
//! let capture = Capture::from_text("7E 10 20 CF 7E");
//! let report = capture.analyze(&AnalyzerConfig::default());
//!
//! for record in report.checksum_records() {
//!     println!("frame {}: valid = {}", record.index, record.record.valid);
//! }
//! for record in report.speed_records() {
//!     println!("frame {}: {:?} km/h", record.index, record.speed_kmh);
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`hexdump`] - hex pairs in text to bytes
//! 2. [`framing`] - bytes to escaped frames
//! 3. [`escape`] - escaped frame to unescaped frame
//! 4. [`analyzer`] - FCS validation and speed extraction
//!
//! [`capture`] runs the pipeline over a whole capture, analyzing frames in
//! parallel while preserving order. [`report`] and [`plot`] export the
//! results.
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias
//! - [`binary`] - Bounds-checked reads and little-endian bit fields
//! - [`layout`] - Configurable position of the speed field
//!
//! Per-frame failures never abort a capture. A frame too short for the
//! checksum or the speed field gets a [`FrameError`] for that record only.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analyzer;
pub mod binary;
pub mod capture;
pub mod error;
pub mod escape;
pub mod framing;
pub mod hexdump;
pub mod layout;
pub mod plot;
pub mod report;

// Re-export commonly used types at the crate root
pub use analyzer::{
    analyze_frame, compute_fcs, extract_speed, verify_checksum, ChecksumRecord, FrameAnalysis,
    SpeedRecord,
};
pub use capture::{
    AnalyzerConfig, Capture, CaptureReport, CaptureSummary, IndexedChecksum, IndexedSpeed,
};
pub use error::{FrameError, ParserError, Result};
pub use escape::{escape, unescape, unescape_with_faults, EscapeFault, Unescaped};
pub use framing::{split_frames, FrameIterator, FLAG};
pub use hexdump::extract_bytes;
pub use layout::FrameLayout;
