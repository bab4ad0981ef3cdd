//! HDLC speed capture decoder CLI
//!
//! A command-line interface for validating and decoding hex dump captures of
//! HDLC-framed speed sensor traffic.
//!
//! ## Commands
//!
//! - `analyze` - Decode a capture, print a summary and optionally write CSV tables
//! - `validate` - Check every frame's FCS (exit codes for scripting)
//! - `frames` - Dump escaped and unescaped frames in hex
//! - `plot` - Render speed per frame as an SVG chart

use clap::{Parser, Subcommand, ValueEnum};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};

use hdlc_speed::framing::split_frames_with_tail;
use hdlc_speed::hexdump::format_bytes;
use hdlc_speed::report::{format_float, write_csv_reports, ReportDocument};
use hdlc_speed::{plot, AnalyzerConfig, Capture, CaptureReport, FrameLayout, Result};

/// HDLC speed capture decoder
#[derive(Parser)]
#[command(name = "hdlc-speed")]
#[command(about = "Decode HDLC-framed speed captures and validate their FCS", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON file describing the frame layout
    #[arg(long, global = true, env = "HDLC_SPEED_LAYOUT")]
    layout: Option<PathBuf>,

    /// Number of worker threads (defaults to available parallelism)
    #[arg(long, global = true)]
    workers: Option<NonZeroUsize>,

    /// Log verbosity
    #[arg(long, global = true, default_value = "warn", env = "HDLC_SPEED_LOG_LEVEL")]
    log_level: LogLevel,

    /// Log output format
    #[arg(long, global = true, default_value = "text", env = "HDLC_SPEED_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a capture and report checksums and speeds
    Analyze {
        /// Path to the hex dump capture
        file: PathBuf,
        /// Output format: pretty, json
        #[arg(short, long, default_value = "pretty")]
        format: OutputFormat,
        /// Directory to write the CSV tables into
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Validate every frame's FCS
    Validate {
        /// Path to the hex dump capture
        file: PathBuf,
        /// List every invalid frame
        #[arg(short, long)]
        verbose: bool,
    },
    /// Dump frames in hex
    Frames {
        /// Path to the hex dump capture
        file: PathBuf,
        /// Maximum number of frames to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Render speed per frame as an SVG chart
    Plot {
        /// Path to the hex dump capture
        file: PathBuf,
        /// Output SVG path
        #[arg(short, long, default_value = "speed.svg")]
        output: PathBuf,
    },
}

/// Output format options
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }
}

fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let config = match load_config(cli.layout.as_deref(), cli.workers) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            eprintln!("Error loading layout: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Analyze {
            file,
            format,
            out_dir,
        } => cmd_analyze(&file, &config, format, out_dir.as_deref()),
        Commands::Validate { file, verbose } => cmd_validate(&file, &config, verbose),
        Commands::Frames { file, limit } => cmd_frames(&file, limit),
        Commands::Plot { file, output } => cmd_plot(&file, &config, &output),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(layout: Option<&Path>, workers: Option<NonZeroUsize>) -> Result<AnalyzerConfig> {
    let layout = match layout {
        Some(path) => {
            let layout = FrameLayout::load(path)?;
            info!(path = %path.display(), ?layout, "loaded frame layout");
            layout
        }
        None => FrameLayout::default(),
    };
    Ok(AnalyzerConfig { layout, workers })
}

fn load_report(file: &Path, config: &AnalyzerConfig) -> Result<CaptureReport> {
    let capture = Capture::open(file)?;
    let report = capture.analyze(config);
    debug!(frames = report.len(), "capture analyzed");
    Ok(report)
}

// ============================================================================
// Analyze Command Implementation
// ============================================================================

fn cmd_analyze(
    file: &Path,
    config: &AnalyzerConfig,
    format: OutputFormat,
    out_dir: Option<&Path>,
) -> Result<ExitCode> {
    let report = load_report(file, config)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&ReportDocument::from(&report))?;
            println!("{json}");
        }
        OutputFormat::Pretty => print_pretty(file, &report),
    }

    if let Some(dir) = out_dir {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
        let (checksum_path, speed_path) = write_csv_reports(dir, &report)?;
        eprintln!("FCS results written to: {}", checksum_path.display());
        eprintln!("Speeds written to: {}", speed_path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn print_pretty(file: &Path, report: &CaptureReport) {
    let summary = report.summary();

    println!("=== Capture: {} ===\n", file.display());
    println!("Frames: {}", summary.frames);
    println!("  FCS valid:        {}", summary.valid);
    println!("  FCS invalid:      {}", summary.invalid);
    println!("  Too short (FCS):  {}", summary.checksum_failures);
    println!("  Speeds decoded:   {}", summary.speeds);
    println!("  Too short (speed): {}", summary.speed_failures);
    if summary.escape_faults > 0 {
        println!("  Escape faults:    {}", summary.escape_faults);
    }
    if let Some(tail) = summary.truncated_tail {
        println!("  Truncated tail:   {tail} byte(s)");
    }

    let speeds: Vec<f64> = report
        .speed_records()
        .iter()
        .filter_map(|s| s.speed_kmh)
        .collect();
    if !speeds.is_empty() {
        let min = speeds.iter().copied().fold(f64::INFINITY, f64::min);
        let max = speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
        println!("\n=== Speed (km/h) ===");
        println!("  Min:  {min:.1}");
        println!("  Max:  {max:.1}");
        println!("  Mean: {mean:.1}");
    }

    // Only show the first 50 frames to avoid spam
    let display_count = std::cmp::min(report.len(), 50);
    if display_count > 0 {
        println!("\n=== Frames ===");
    }
    for frame in &report.frames()[..display_count] {
        let fcs = match &frame.checksum {
            Ok(c) if c.valid => format!("OK   0x{:02X}", c.received),
            Ok(c) => format!(
                "BAD  0x{:02X} (expected 0x{:02X})",
                c.received, c.computed
            ),
            Err(e) => format!("n/a  {e}"),
        };
        let speed = frame
            .speed_kmh()
            .map_or_else(|| "-".to_string(), format_float);
        println!("  [{:>5}] FCS {fcs:<32} speed {speed}", frame.index);
    }
    if report.len() > 50 {
        println!("  ... and {} more frames", report.len() - 50);
    }
}

// ============================================================================
// Validate Command Implementation
// ============================================================================

fn cmd_validate(file: &Path, config: &AnalyzerConfig, verbose: bool) -> Result<ExitCode> {
    let report = load_report(file, config)?;
    let summary = report.summary();

    if verbose {
        println!("Validating: {}\n", file.display());
        for frame in report.frames() {
            match &frame.checksum {
                Ok(c) if c.valid => {}
                Ok(c) => println!(
                    "  - frame {}: FCS 0x{:02X}, expected 0x{:02X}",
                    frame.index, c.received, c.computed
                ),
                Err(e) => println!("  - frame {}: {e}", frame.index),
            }
        }
        if let Some(tail) = summary.truncated_tail {
            println!("  - capture ends inside a frame ({tail} byte(s) dropped)");
        }
        println!(
            "\nFrames: {}, valid: {}, invalid: {}, too short: {}",
            summary.frames, summary.valid, summary.invalid, summary.checksum_failures
        );
    }

    let status = if report.all_valid() { "VALID" } else { "INVALID" };
    println!("{}: {status}", file.display());

    if report.all_valid() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// Frames Command Implementation
// ============================================================================

fn cmd_frames(file: &Path, limit: Option<usize>) -> Result<ExitCode> {
    let capture = Capture::open(file)?;
    let (frames, tail) = split_frames_with_tail(capture.bytes());
    let shown = limit.unwrap_or(frames.len()).min(frames.len());

    for (i, frame) in frames[..shown].iter().enumerate() {
        let unescaped = hdlc_speed::unescape_with_faults(frame);
        println!(
            "Frame {} ({} bytes escaped, {} unescaped)",
            i + 1,
            frame.len(),
            unescaped.bytes.len()
        );
        println!("  escaped:   {}", format_bytes(frame));
        println!("  unescaped: {}", format_bytes(&unescaped.bytes));
        for fault in &unescaped.faults {
            println!("  fault:     {fault:?}");
        }
    }
    if frames.len() > shown {
        println!("... and {} more frames", frames.len() - shown);
    }

    if let Some(tail) = tail {
        println!(
            "Unterminated tail ({} bytes): {}",
            tail.len(),
            format_bytes(tail)
        );
    }

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Plot Command Implementation
// ============================================================================

fn cmd_plot(file: &Path, config: &AnalyzerConfig, output: &Path) -> Result<ExitCode> {
    let report = load_report(file, config)?;
    plot::render_speed_svg(output, &report)?;
    println!("Chart written to: {}", output.display());
    Ok(ExitCode::SUCCESS)
}
