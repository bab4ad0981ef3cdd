//! Tabular and JSON export of capture results.
//!
//! Two CSV tables are produced, both keyed by the 1-based frame index in an
//! unnamed first column so they line up with an external frame log:
//!
//! ```text
//! ,Calculated FCS,Given FCS,Valid        ,Speed (km/h)
//! 1,207,207,True                         1,12.3
//! 2,14,200,False                         2,
//! ```
//!
//! Frames without a checksum are left out of the first table. Frames
//! without a speed keep their row in the second table with an empty cell.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::capture::{CaptureReport, CaptureSummary, IndexedChecksum, IndexedSpeed};
use crate::error::Result;

/// Default file name of the checksum table.
pub const CHECKSUM_CSV_NAME: &str = "fcs_validation_results.csv";

/// Default file name of the speed table.
pub const SPEED_CSV_NAME: &str = "extracted_speeds.csv";

/// Header row of the checksum table.
pub const CHECKSUM_CSV_HEADER: &str = ",Calculated FCS,Given FCS,Valid";

/// Header row of the speed table.
pub const SPEED_CSV_HEADER: &str = ",Speed (km/h)";

/// Writes the checksum table.
///
/// # Errors
///
/// Returns `ParserError::IoError` if writing fails.
pub fn write_checksum_csv<W: Write>(writer: &mut W, report: &CaptureReport) -> Result<()> {
    writeln!(writer, "{CHECKSUM_CSV_HEADER}")?;
    for IndexedChecksum { index, record } in report.checksum_records() {
        let valid = if record.valid { "True" } else { "False" };
        writeln!(
            writer,
            "{index},{},{},{valid}",
            record.computed, record.received
        )?;
    }
    Ok(())
}

/// Writes the speed table.
///
/// # Errors
///
/// Returns `ParserError::IoError` if writing fails.
pub fn write_speed_csv<W: Write>(writer: &mut W, report: &CaptureReport) -> Result<()> {
    writeln!(writer, "{SPEED_CSV_HEADER}")?;
    for IndexedSpeed { index, speed_kmh } in report.speed_records() {
        match speed_kmh {
            Some(speed) => writeln!(writer, "{index},{}", format_float(speed))?,
            None => writeln!(writer, "{index},")?,
        }
    }
    Ok(())
}

/// Writes both tables into `dir` under their default names.
///
/// Returns the paths of the checksum and speed tables.
///
/// # Errors
///
/// Returns `ParserError::IoError` if a file cannot be created or written.
pub fn write_csv_reports(dir: &Path, report: &CaptureReport) -> Result<(PathBuf, PathBuf)> {
    let checksum_path = dir.join(CHECKSUM_CSV_NAME);
    let mut writer = BufWriter::new(File::create(&checksum_path)?);
    write_checksum_csv(&mut writer, report)?;
    writer.flush()?;

    let speed_path = dir.join(SPEED_CSV_NAME);
    let mut writer = BufWriter::new(File::create(&speed_path)?);
    write_speed_csv(&mut writer, report)?;
    writer.flush()?;

    Ok((checksum_path, speed_path))
}

/// Formats a float with the shortest representation that round-trips,
/// keeping a trailing `.0` on whole numbers.
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Serializable view of a whole report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    /// Aggregate counts.
    pub summary: CaptureSummary,
    /// Checksum records, as in the checksum table.
    pub checksums: Vec<IndexedChecksum>,
    /// Speed records, as in the speed table.
    pub speeds: Vec<IndexedSpeed>,
}

impl From<&CaptureReport> for ReportDocument {
    fn from(report: &CaptureReport) -> Self {
        ReportDocument {
            summary: report.summary(),
            checksums: report.checksum_records(),
            speeds: report.speed_records(),
        }
    }
}

/// Writes the report as pretty-printed JSON.
///
/// # Errors
///
/// Returns `ParserError::Serialization` if serialization or writing fails.
pub fn write_json<W: Write>(writer: W, report: &CaptureReport) -> Result<()> {
    serde_json::to_writer_pretty(writer, &ReportDocument::from(report))?;
    Ok(())
}
