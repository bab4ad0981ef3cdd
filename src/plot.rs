//! Speed-over-frames chart rendering.
//!
//! Renders the decoded speeds of a report as an SVG line chart with one
//! marker per frame. Frames without a speed are skipped, leaving the line to
//! connect the surrounding points.

use std::path::Path;

use plotters::prelude::*;

use crate::capture::CaptureReport;
use crate::error::{ParserError, Result};

/// Chart size in pixels.
pub const CHART_SIZE: (u32, u32) = (1000, 500);

/// Chart title.
pub const CHART_TITLE: &str = "Extracted Speed per Frame";

/// Collects `(frame index, speed)` points for plotting.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn speed_points(report: &CaptureReport) -> Vec<(f64, f64)> {
    report
        .speed_records()
        .into_iter()
        .filter_map(|s| s.speed_kmh.map(|speed| (s.index as f64, speed)))
        .collect()
}

/// Renders the speed chart of a report to an SVG file.
///
/// # Errors
///
/// Returns `ParserError::Plot` if the report has no speed values or the
/// chart cannot be drawn or written.
pub fn render_speed_svg(path: &Path, report: &CaptureReport) -> Result<()> {
    let points = speed_points(report);
    if points.is_empty() {
        return Err(ParserError::Plot {
            reason: "no speed values to plot".to_string(),
        });
    }

    draw_chart(path, &points).map_err(|e| ParserError::Plot {
        reason: e.to_string(),
    })
}

fn draw_chart(
    path: &Path,
    points: &[(f64, f64)],
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let x_max = points.iter().map(|p| p.0).fold(1.0, f64::max) + 1.0;
    let y_max = points.iter().map(|p| p.1).fold(1.0, f64::max) * 1.05;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_TITLE, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Frame Index")
        .y_desc("Speed")
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(
        points
            .iter()
            .map(|&point| Circle::new(point, 3, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{AnalyzerConfig, Capture};

    #[test]
    fn test_speed_points_skip_absent() {
        let mut frame = vec![0u8; 19];
        frame[3] = 10;
        frame.push(crate::analyzer::compute_fcs(&frame));

        let mut raw = vec![0x7E, 0x10, 0x20, 0xCF, 0x7E];
        raw.extend(crate::escape::encode_frame(&frame));
        let report = Capture::from_bytes(raw).analyze(&AnalyzerConfig::default());

        let points = speed_points(&report);
        assert_eq!(points, vec![(2.0, 1.0)]);
    }

    #[test]
    fn test_render_writes_svg() {
        let mut raw = Vec::new();
        for step in 0u8..4 {
            let mut frame = vec![0u8; 19];
            frame[3] = step * 25;
            frame.push(crate::analyzer::compute_fcs(&frame));
            raw.extend(crate::escape::encode_frame(&frame));
        }
        let report = Capture::from_bytes(raw).analyze(&AnalyzerConfig::default());

        let path = std::env::temp_dir().join(format!("hdlc-speed-chart-{}.svg", std::process::id()));
        let result = render_speed_svg(&path, &report);
        let svg = std::fs::read_to_string(&path);
        let _ = std::fs::remove_file(&path);

        assert!(result.is_ok(), "render failed: {result:?}");
        let svg = svg.unwrap();
        assert!(!svg.is_empty());
        assert!(svg.contains("<svg"));
        assert!(svg.contains(CHART_TITLE));
    }

    #[test]
    fn test_render_rejects_empty_report() {
        let result = render_speed_svg(Path::new("unused.svg"), &CaptureReport::default());
        assert!(matches!(result, Err(ParserError::Plot { .. })));
    }
}
