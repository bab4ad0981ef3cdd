//! Capture loading and whole-capture analysis.
//!
//! A [`Capture`] holds the raw byte stream decoded from a hex dump. Calling
//! [`Capture::analyze`] splits it into frames and analyzes every frame,
//! producing a [`CaptureReport`].
//!
//! Frames are independent of each other, so analysis is a data-parallel map:
//! the frame list is cut into contiguous chunks, each chunk runs on a scoped
//! worker thread, and chunk results are concatenated in chunk order. The
//! report order is therefore the capture order for any worker count.
//!
//! # Example
//!
//! ```
//! use hdlc_speed::capture::{AnalyzerConfig, Capture};
//!
//! let capture = Capture::from_text("7E 10 20 CF 7E");
//! let report = capture.analyze(&AnalyzerConfig::default());
//!
//! assert_eq!(report.len(), 1);
//! assert!(report.frames()[0].is_valid());
//! assert_eq!(report.speed_records()[0].speed_kmh, None);
//! ```

use std::num::NonZeroUsize;
use std::path::Path;
use std::thread;

use serde::Serialize;
use tracing::{debug, warn};

use crate::analyzer::{analyze_frame, ChecksumRecord, FrameAnalysis};
use crate::error::Result;
use crate::framing::FrameIterator;
use crate::hexdump::extract_bytes;
use crate::layout::FrameLayout;

/// Settings for [`Capture::analyze`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalyzerConfig {
    /// Frame layout used for speed extraction.
    pub layout: FrameLayout,

    /// Number of worker threads. `None` uses the available parallelism.
    pub workers: Option<NonZeroUsize>,
}

impl AnalyzerConfig {
    /// Returns the number of workers to use for `frame_count` frames.
    ///
    /// Never more workers than frames, and at least one.
    #[must_use]
    pub fn worker_count(&self, frame_count: usize) -> usize {
        let requested = self
            .workers
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get);
        requested.min(frame_count).max(1)
    }
}

/// A decoded capture: the raw byte stream before framing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Capture {
    bytes: Vec<u8>,
}

impl Capture {
    /// Decodes a textual hex dump.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Capture {
            bytes: extract_bytes(text),
        }
    }

    /// Wraps an already decoded byte stream.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Capture { bytes }
    }

    /// Reads and decodes a hex dump file.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected, since only
    /// ASCII hex digits matter.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::IoError` if the file cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let capture = Capture::from_text(&String::from_utf8_lossy(&data));
        debug!(
            path = %path.display(),
            file_len = data.len(),
            bytes = capture.bytes.len(),
            "decoded capture"
        );
        Ok(capture)
    }

    /// Returns the raw byte stream.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns an iterator over the escaped frames.
    #[must_use]
    pub fn frames(&self) -> FrameIterator<'_> {
        FrameIterator::new(&self.bytes)
    }

    /// Splits and analyzes every frame.
    #[must_use]
    pub fn analyze(&self, config: &AnalyzerConfig) -> CaptureReport {
        let mut iter = self.frames();
        let frames: Vec<&[u8]> = iter.by_ref().collect();
        let tail = iter.remainder();

        let truncated_tail = if tail.is_empty() {
            None
        } else {
            warn!(
                tail_len = tail.len(),
                "capture ends inside a frame, trailing bytes dropped"
            );
            Some(tail.len())
        };

        let workers = config.worker_count(frames.len());
        debug!(frames = frames.len(), workers, "analyzing capture");

        let analyses = analyze_frames(&frames, &config.layout, workers);

        let faulty = analyses
            .iter()
            .filter(|a| !a.escape_faults.is_empty())
            .count();
        if faulty > 0 {
            warn!(frames = faulty, "malformed escape sequences dropped");
        }

        CaptureReport {
            frames: analyses,
            truncated_tail,
        }
    }
}

/// Analyzes escaped frames on up to `workers` threads, preserving order.
///
/// Frame indices are 1-based positions in `frames`.
#[must_use]
pub fn analyze_frames(frames: &[&[u8]], layout: &FrameLayout, workers: usize) -> Vec<FrameAnalysis> {
    if workers <= 1 || frames.len() <= 1 {
        return analyze_chunk(frames, 0, layout);
    }

    let chunk_size = frames.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = frames
            .chunks(chunk_size)
            .enumerate()
            .map(|(n, chunk)| scope.spawn(move || analyze_chunk(chunk, n * chunk_size, layout)))
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}

fn analyze_chunk(chunk: &[&[u8]], offset: usize, layout: &FrameLayout) -> Vec<FrameAnalysis> {
    chunk
        .iter()
        .enumerate()
        .map(|(i, frame)| analyze_frame(offset + i + 1, frame, layout))
        .collect()
}

/// A checksum record tagged with its frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexedChecksum {
    /// 1-based frame index.
    pub index: usize,

    /// The checksum result.
    #[serde(flatten)]
    pub record: ChecksumRecord,
}

/// A speed value tagged with its frame index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexedSpeed {
    /// 1-based frame index.
    pub index: usize,

    /// Speed in km/h, or `None` if the frame was too short.
    pub speed_kmh: Option<f64>,
}

/// Aggregate counts over a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CaptureSummary {
    /// Number of frames found.
    pub frames: usize,
    /// Frames whose FCS matched.
    pub valid: usize,
    /// Frames whose FCS did not match.
    pub invalid: usize,
    /// Frames too short to carry an FCS.
    pub checksum_failures: usize,
    /// Frames with a decoded speed.
    pub speeds: usize,
    /// Frames too short for the speed field.
    pub speed_failures: usize,
    /// Total malformed escape sequences dropped.
    pub escape_faults: usize,
    /// Length of the unterminated trailing frame, if any.
    pub truncated_tail: Option<usize>,
}

/// Analysis results for a whole capture, in frame order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptureReport {
    frames: Vec<FrameAnalysis>,
    truncated_tail: Option<usize>,
}

impl CaptureReport {
    /// Returns the per-frame analyses.
    #[must_use]
    pub fn frames(&self) -> &[FrameAnalysis] {
        &self.frames
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns whether the capture contained no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the length of the unterminated trailing frame, if any.
    #[must_use]
    pub fn truncated_tail(&self) -> Option<usize> {
        self.truncated_tail
    }

    /// Returns the checksum records of frames long enough to carry one.
    ///
    /// Frames too short for a checksum are skipped, so indices may have gaps.
    #[must_use]
    pub fn checksum_records(&self) -> Vec<IndexedChecksum> {
        self.frames
            .iter()
            .filter_map(|frame| {
                frame.checksum.ok().map(|record| IndexedChecksum {
                    index: frame.index,
                    record,
                })
            })
            .collect()
    }

    /// Returns one speed entry per frame.
    #[must_use]
    pub fn speed_records(&self) -> Vec<IndexedSpeed> {
        self.frames
            .iter()
            .map(|frame| IndexedSpeed {
                index: frame.index,
                speed_kmh: frame.speed_kmh(),
            })
            .collect()
    }

    /// Returns whether every frame carried a matching FCS.
    ///
    /// An empty capture is not considered valid.
    #[must_use]
    pub fn all_valid(&self) -> bool {
        !self.frames.is_empty() && self.frames.iter().all(FrameAnalysis::is_valid)
    }

    /// Computes aggregate counts.
    #[must_use]
    pub fn summary(&self) -> CaptureSummary {
        let mut summary = CaptureSummary {
            frames: self.frames.len(),
            truncated_tail: self.truncated_tail,
            ..CaptureSummary::default()
        };

        for frame in &self.frames {
            match frame.checksum {
                Ok(record) if record.valid => summary.valid += 1,
                Ok(_) => summary.invalid += 1,
                Err(_) => summary.checksum_failures += 1,
            }
            if frame.speed.is_ok() {
                summary.speeds += 1;
            } else {
                summary.speed_failures += 1;
            }
            summary.escape_faults += frame.escape_faults.len();
        }

        summary
    }
}
