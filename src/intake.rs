//! Intake import: the per-file pipeline.
//!
//! Every file in the intake directory runs through
//! extract → classify → resolve → transcode ∥ placeholder → record merge,
//! independently of its siblings. Files are processed in parallel across
//! hardware threads; within a file, the two heavy pixel passes (AVIF encode
//! and placeholder summary) run as a `rayon::join` pair over the same
//! decoded image. The one piece of shared state is the store mapping, and
//! the single mutex around record insertion is its only synchronization —
//! each file targets its own key, so there is no contention to speak of.
//!
//! Problem files never abort the run: unsupported extensions and
//! editing-suite exports with missing required fields are skipped (left in
//! intake for manual resolution, nothing written), and per-file I/O or
//! codec failures are reported the same way. The `collect()` on the
//! parallel iterator is the run barrier — reconciliation only starts once
//! every file has finished or been skipped. Re-running is the retry
//! mechanism: keys are deterministic and merges idempotent, so an
//! interrupted run just recomputes.

use crate::config::Paths;
use crate::extract::{self, Classification};
use crate::imaging::{placeholder, transcode};
use crate::resolve;
use crate::store::ImageStore;
use crate::types::{DominantColor, ImageRecord, Provenance};
use rayon::prelude::*;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Why a file was excluded from this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedExtension,
    /// Editing-suite signature matched but capture date or original
    /// filename is missing.
    MissingRequiredFields,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedExtension => write!(f, "unsupported file type"),
            SkipReason::MissingRequiredFields => {
                write!(f, "missing date or original filename")
            }
        }
    }
}

/// Result of one file's trip through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Processed successfully; a record exists under `key`.
    Imported {
        filename: String,
        key: String,
        elapsed: Duration,
    },
    /// Excluded by policy; nothing written, file left in place.
    Skipped {
        filename: String,
        reason: SkipReason,
    },
    /// I/O or codec failure on this file only; siblings unaffected.
    Failed { filename: String, detail: String },
}

/// Per-stage run report.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub outcomes: Vec<FileOutcome>,
}

impl ImportReport {
    /// Filenames that imported successfully this run — the only files the
    /// orchestrator may offer to delete from intake.
    pub fn imported_filenames(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                FileOutcome::Imported { filename, .. } => Some(filename.clone()),
                _ => None,
            })
            .collect()
    }

    /// (imported, skipped, failed) counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for outcome in &self.outcomes {
            match outcome {
                FileOutcome::Imported { .. } => counts.0 += 1,
                FileOutcome::Skipped { .. } => counts.1 += 1,
                FileOutcome::Failed { .. } => counts.2 += 1,
            }
        }
        counts
    }
}

/// Regular files directly inside `dir`, sorted by name.
pub(crate) fn dir_filenames(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Import every file in the intake directory, updating `store` in place.
///
/// Creates the intake and output directories if absent (first run). The
/// returned report covers every file seen, in name order.
pub fn import(store: &mut ImageStore, paths: &Paths) -> io::Result<ImportReport> {
    std::fs::create_dir_all(&paths.intake_dir)?;
    std::fs::create_dir_all(&paths.output_dir)?;

    let filenames = dir_filenames(&paths.intake_dir)?;
    let shared = Mutex::new(store);

    let outcomes = filenames
        .par_iter()
        .map(|filename| import_file(filename, paths, &shared))
        .collect();

    Ok(ImportReport { outcomes })
}

/// One file: the whole extract → transcode → merge pipeline.
fn import_file(
    filename: &str,
    paths: &Paths,
    store: &Mutex<&mut ImageStore>,
) -> FileOutcome {
    let started = Instant::now();

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let Some(format) = transcode::format_for_extension(&extension) else {
        return FileOutcome::Skipped {
            filename: filename.to_string(),
            reason: SkipReason::UnsupportedExtension,
        };
    };

    let bytes = match std::fs::read(paths.intake_dir.join(filename)) {
        Ok(bytes) => bytes,
        Err(e) => return failed(filename, e),
    };

    // Pure extraction over the buffer; nothing is written for a skip.
    let fields = extract::extract(&bytes, &extension);
    let (provenance, key) = match extract::classify(&fields) {
        Classification::Lightroom { date, raw_file_name } => (
            Provenance::LightroomIntake,
            resolve::lightroom_key(&date, &raw_file_name),
        ),
        Classification::MissingRequiredFields => {
            return FileOutcome::Skipped {
                filename: filename.to_string(),
                reason: SkipReason::MissingRequiredFields,
            };
        }
        Classification::Misc => (Provenance::MiscIntake, resolve::misc_key(filename)),
    };

    let image = match transcode::decode(&bytes, format) {
        Ok(image) => image,
        Err(e) => return failed(filename, e),
    };
    let aspect_ratio = image.width() as f64 / image.height() as f64;

    // The two heavy passes share the decoded image and join here.
    let output_path = paths.output_dir.join(&key);
    let (written, placeholder) = rayon::join(
        || transcode::transcode_to(&image, &output_path),
        || placeholder::generate(&image),
    );
    if let Err(e) = written {
        return failed(filename, e);
    }
    let placeholder = match placeholder {
        Ok(placeholder) => placeholder,
        Err(e) => return failed(filename, e),
    };

    // Single synchronized boundary: record assembly into the shared map.
    {
        let mut store = store.lock().unwrap();
        let record = store
            .entry(key.clone())
            .or_insert_with(|| ImageRecord::new(&key, provenance));
        resolve::apply_intake_fields(record, &key, provenance, &fields);
        record.aspect_ratio = aspect_ratio;
        record.placeholder_uri = placeholder.uri;
        if !record.dominant_color.overridden {
            record.dominant_color = DominantColor::computed(placeholder.dominant_rgb);
        }
    }

    FileOutcome::Imported {
        filename: filename.to_string(),
        key,
        elapsed: started.elapsed(),
    }
}

fn failed(filename: &str, error: impl fmt::Display) -> FileOutcome {
    FileOutcome::Failed {
        filename: filename.to_string(),
        detail: error.to_string(),
    }
}
