//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Drop
//!
//! ```text
//! Loaded 3 images
//!     Skipped notes.txt: unsupported type
//!     Skipped 11.png: over the per-drop limit
//! ```
//!
//! ## Convert
//!
//! ```text
//! Target: png (lossless, quality ignored)
//! Converting 3 images
//! [ 33%] 001/003 dawn.jpeg → dawn.png (41.2 KB)
//! [ 67%] 002/003 broken.png failed: Decode failed: ...
//! [100%] 003/003 dusk.gif → dusk.png (18.0 KB)
//!
//! Converted 2 of 3 images (59.2 KB)
//!     Failed broken.png: Decode failed: ...
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 dawn.jpeg (image/jpeg, 120.5 KB) 4000x3000
//! 002 broken.png (image/png, 12 B) unreadable: Decode failed: ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. The `--json` report is a
//! serializable [`ConversionReport`].

use crate::convert::{BatchOutcome, ProgressEvent};
use crate::imaging::{ConversionRequest, Dimensions, ImagingError, progress_percent};
use crate::session::DropReport;
use crate::types::InputImage;
use serde::Serialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte size.
///
/// ```text
/// 512      → 512 B
/// 42_188   → 41.2 KB
/// 3_500_000 → 3.3 MB
/// ```
fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

/// `[ 40%] 002/005`
fn progress_prefix(current: usize, total: usize) -> String {
    format!(
        "[{:>3}%] {}/{}",
        progress_percent(current, total),
        format_index(current),
        format_index(total)
    )
}

// ============================================================================
// Drops
// ============================================================================

pub fn format_drop_report(report: &DropReport) -> Vec<String> {
    let mut lines = vec![format!("Loaded {}", plural(report.added.len(), "image"))];
    let skipped = [
        (&report.rejected_type, "unsupported type"),
        (&report.duplicates, "already loaded"),
        (&report.over_limit, "over the per-drop limit"),
    ];
    for (names, reason) in skipped {
        for name in names {
            lines.push(format!("{}Skipped {}: {}", indent(1), name, reason));
        }
    }
    lines
}

pub fn print_drop_report(report: &DropReport) {
    for line in format_drop_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_progress_event(event: &ProgressEvent) -> Vec<String> {
    match event {
        ProgressEvent::BatchStarted { total } => {
            vec![format!("Converting {}", plural(*total, "image"))]
        }
        ProgressEvent::ImageConverted {
            current,
            total,
            source,
            filename,
            bytes,
        } => vec![format!(
            "{} {} → {} ({})",
            progress_prefix(*current, *total),
            source,
            filename,
            format_bytes(*bytes)
        )],
        ProgressEvent::ImageFailed {
            current,
            total,
            source,
            error,
        } => vec![format!(
            "{} {} failed: {}",
            progress_prefix(*current, *total),
            source,
            error
        )],
        ProgressEvent::PageAdded {
            current,
            total,
            source,
        } => vec![format!(
            "{} page {}",
            progress_prefix(*current, *total),
            source
        )],
    }
}

/// Describe the run about to start.
///
/// ```text
/// Target: jpg at 80%
/// Target: png (lossless, quality ignored)
/// ```
pub fn format_request(request: &ConversionRequest) -> String {
    if request.format.uses_quality() {
        format!("Target: {} at {}", request.format, request.quality)
    } else {
        format!("Target: {} (lossless, quality ignored)", request.format)
    }
}

// ============================================================================
// Summaries
// ============================================================================

pub fn format_batch_summary(outcome: &BatchOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "Converted {} of {} ({})",
        outcome.converted.len(),
        plural(outcome.processed(), "image"),
        format_bytes(outcome.total_bytes())
    )];
    for failure in &outcome.failures {
        lines.push(format!(
            "{}Failed {}: {}",
            indent(1),
            failure.original.name(),
            failure.error
        ));
    }
    lines
}

pub fn print_batch_summary(outcome: &BatchOutcome) {
    for line in format_batch_summary(outcome) {
        println!("{}", line);
    }
}

/// `Wrote out/converted-images.zip (1.2 MB)`
pub fn format_written(path: &Path, bytes: usize) -> String {
    format!("Wrote {} ({})", path.display(), format_bytes(bytes))
}

// ============================================================================
// Check
// ============================================================================

/// Format the inventory printed by `check`: one line per loaded image with
/// its decoded dimensions, or why it could not be decoded.
pub fn format_check(entries: &[(InputImage, Result<Dimensions, ImagingError>)]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (image, dims))| {
            let header = format!(
                "{} {} ({}, {})",
                format_index(i + 1),
                image.name(),
                image.mime_type().unwrap_or("unknown"),
                format_bytes(image.size() as usize)
            );
            match dims {
                Ok(d) => format!("{} {}x{}", header, d.width, d.height),
                Err(e) => format!("{} unreadable: {}", header, e),
            }
        })
        .collect()
}

pub fn print_check(entries: &[(InputImage, Result<Dimensions, ImagingError>)]) {
    for line in format_check(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// JSON report
// ============================================================================

/// Machine-readable summary of a `convert` run.
#[derive(Debug, Serialize)]
pub struct ConversionReport {
    pub request: ConversionRequest,
    pub converted: Vec<ReportEntry>,
    pub failed: Vec<ReportFailure>,
    /// Set when results were bundled into a zip.
    pub archive: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub source: String,
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: usize,
    /// Where the file was written, when delivered individually.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ReportFailure {
    pub source: String,
    pub error: String,
}

impl ConversionReport {
    /// Build a report from a finished run. `paths` holds the delivered path
    /// of each converted image, in the same order, when known.
    pub fn new(
        request: ConversionRequest,
        outcome: &BatchOutcome,
        paths: &[PathBuf],
        archive: Option<PathBuf>,
    ) -> Self {
        let converted = outcome
            .converted
            .iter()
            .enumerate()
            .map(|(i, c)| ReportEntry {
                source: c.original.name().to_string(),
                filename: c.filename.clone(),
                mime_type: c.mime_type(),
                bytes: c.bytes.len(),
                path: paths.get(i).cloned(),
            })
            .collect();
        let failed = outcome
            .failures
            .iter()
            .map(|f| ReportFailure {
                source: f.original.name().to_string(),
                error: f.error.to_string(),
            })
            .collect();
        Self {
            request,
            converted,
            failed,
            archive,
        }
    }
}

pub fn format_json_report(report: &ConversionReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::BatchFailure;
    use crate::imaging::{OutputFormat, Quality};
    use crate::test_helpers::converted;

    fn outcome_with_failure() -> BatchOutcome {
        BatchOutcome {
            converted: vec![converted("a.png", vec![0; 2048]), converted("c.png", vec![0; 10])],
            failures: vec![BatchFailure {
                original: InputImage::from_bytes("b.jpg", vec![1, 2], 0),
                error: ImagingError::Decode("bad header".into()),
            }],
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "image"), "1 image");
        assert_eq!(plural(0, "image"), "0 images");
        assert_eq!(plural(4, "image"), "4 images");
    }

    #[test]
    fn progress_prefix_pads_percent_and_index() {
        assert_eq!(progress_prefix(2, 5), "[ 40%] 002/005");
        assert_eq!(progress_prefix(5, 5), "[100%] 005/005");
    }

    // =========================================================================
    // Progress events
    // =========================================================================

    #[test]
    fn batch_started_line() {
        let lines = format_progress_event(&ProgressEvent::BatchStarted { total: 3 });
        assert_eq!(lines, vec!["Converting 3 images"]);
    }

    #[test]
    fn image_converted_line() {
        let lines = format_progress_event(&ProgressEvent::ImageConverted {
            current: 1,
            total: 4,
            source: "dawn.jpeg".into(),
            filename: "dawn.png".into(),
            bytes: 2048,
        });
        assert_eq!(lines, vec!["[ 25%] 001/004 dawn.jpeg → dawn.png (2.0 KB)"]);
    }

    #[test]
    fn image_failed_line() {
        let lines = format_progress_event(&ProgressEvent::ImageFailed {
            current: 4,
            total: 4,
            source: "x.png".into(),
            error: "Decode failed: eof".into(),
        });
        assert_eq!(lines, vec!["[100%] 004/004 x.png failed: Decode failed: eof"]);
    }

    #[test]
    fn page_added_line() {
        let lines = format_progress_event(&ProgressEvent::PageAdded {
            current: 1,
            total: 2,
            source: "a.png".into(),
        });
        assert_eq!(lines, vec!["[ 50%] 001/002 page a.png"]);
    }

    // =========================================================================
    // Drop report
    // =========================================================================

    #[test]
    fn drop_report_lists_skipped_files() {
        let report = DropReport {
            added: vec![InputImage::from_bytes("a.png", vec![], 0).key()],
            duplicates: vec!["b.png".into()],
            rejected_type: vec!["notes.txt".into()],
            over_limit: vec!["z.png".into()],
        };
        assert_eq!(
            format_drop_report(&report),
            vec![
                "Loaded 1 image",
                "    Skipped notes.txt: unsupported type",
                "    Skipped b.png: already loaded",
                "    Skipped z.png: over the per-drop limit",
            ]
        );
    }

    #[test]
    fn empty_drop_report() {
        assert_eq!(format_drop_report(&DropReport::default()), vec!["Loaded 0 images"]);
    }

    // =========================================================================
    // Summaries
    // =========================================================================

    #[test]
    fn batch_summary_counts_and_failures() {
        let lines = format_batch_summary(&outcome_with_failure());
        assert_eq!(lines[0], "Converted 2 of 3 images (2.0 KB)");
        assert_eq!(lines[1], "    Failed b.jpg: Decode failed: bad header");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn request_line_shows_quality_for_jpeg() {
        let request = ConversionRequest::new(OutputFormat::Jpg, Quality::new(75));
        assert_eq!(format_request(&request), "Target: jpg at 75%");
    }

    #[test]
    fn request_line_flags_ignored_quality() {
        for format in [OutputFormat::Png, OutputFormat::Webp, OutputFormat::Gif] {
            let request = ConversionRequest::new(format, Quality::new(40));
            assert_eq!(
                format_request(&request),
                format!("Target: {format} (lossless, quality ignored)")
            );
        }
    }

    #[test]
    fn written_line() {
        assert_eq!(
            format_written(Path::new("out/converted-images.zip"), 100),
            "Wrote out/converted-images.zip (100 B)"
        );
    }

    #[test]
    fn check_lines() {
        let entries = vec![
            (
                InputImage::from_bytes("dawn.jpeg", vec![0; 2048], 0),
                Ok(Dimensions {
                    width: 400,
                    height: 300,
                }),
            ),
            (
                InputImage::from_bytes("broken.png", vec![0; 12], 0),
                Err(ImagingError::Decode("bad".into())),
            ),
        ];
        assert_eq!(
            format_check(&entries),
            vec![
                "001 dawn.jpeg (image/jpeg, 2.0 KB) 400x300",
                "002 broken.png (image/png, 12 B) unreadable: Decode failed: bad",
            ]
        );
    }

    // =========================================================================
    // JSON report
    // =========================================================================

    #[test]
    fn json_report_shape() {
        let request = ConversionRequest::new(OutputFormat::Png, Quality::new(70));
        let paths = vec![PathBuf::from("out/a.png")];
        let report = ConversionReport::new(request, &outcome_with_failure(), &paths, None);
        let json = format_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["request"]["format"], "png");
        assert_eq!(value["request"]["quality"], 70);
        assert_eq!(value["converted"][0]["filename"], "a.png");
        assert_eq!(value["converted"][0]["path"], "out/a.png");
        assert_eq!(value["converted"][0]["bytes"], 2048);
        assert_eq!(value["converted"][1]["path"], serde_json::Value::Null);
        assert_eq!(value["failed"][0]["source"], "b.jpg");
        assert_eq!(value["archive"], serde_json::Value::Null);
    }
}
