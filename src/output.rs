//! CLI output formatting for pipeline runs.
//!
//! Each stage has a `format_*` function returning lines (pure, testable)
//! and a `print_*` wrapper that writes them to stdout. Per-file lines lead
//! with the outcome; the stage summary closes with counts, so a long run
//! stays scannable:
//!
//! ```text
//! upload.jpg -> 2023-05-01-img_001.g.avif (1.204s)
//! (warn) missing date or original filename: broken.jpg
//! intake: 1 processed, 1 skipped, 0 failed
//! ```

use crate::intake::{FileOutcome, ImportReport};
use crate::project::Projection;
use crate::reconcile::ReconcileReport;

/// One line per file outcome.
pub fn format_outcome(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Imported {
            filename,
            key,
            elapsed,
        } => format!("{filename} -> {key} ({:.3}s)", elapsed.as_secs_f64()),
        FileOutcome::Skipped { filename, reason } => format!("(warn) {reason}: {filename}"),
        FileOutcome::Failed { filename, detail } => format!("(error) {filename}: {detail}"),
    }
}

/// All outcome lines for a stage plus its summary line.
pub fn format_stage(label: &str, report: &ImportReport) -> Vec<String> {
    let mut lines: Vec<String> = report.outcomes.iter().map(format_outcome).collect();
    let (imported, skipped, failed) = report.counts();
    lines.push(format!(
        "{label}: {imported} processed, {skipped} skipped, {failed} failed"
    ));
    lines
}

/// What reconciliation removed; empty when nothing was pruned.
pub fn format_reconcile(report: &ReconcileReport) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.pruned_records.is_empty() {
        lines.push(format!(
            "deleted {} stale metadata entries",
            report.pruned_records.len()
        ));
        lines.push(report.pruned_records.join(", "));
    }
    if !report.deleted_files.is_empty() {
        lines.push(format!(
            "deleted {} orphaned generated files",
            report.deleted_files.len()
        ));
        lines.push(report.deleted_files.join(", "));
    }
    lines
}

/// One-line projection summary.
pub fn format_projection(projection: &Projection) -> String {
    format!(
        "projected {} keys, {} names, {} tags",
        projection.keys.len(),
        projection.names.len(),
        projection.tags.len()
    )
}

pub fn print_stage(label: &str, report: &ImportReport) {
    print_lines(&format_stage(label, report));
}

pub fn print_reconcile(report: &ReconcileReport) {
    print_lines(&format_reconcile(report));
}

pub fn print_projection(projection: &Projection) {
    println!("{}", format_projection(projection));
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
