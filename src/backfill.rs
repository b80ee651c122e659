//! Static backfill: metadata for hand-placed images.
//!
//! Files dropped straight into the output directory are already web-ready —
//! they are never transcoded — but the rendering layer still needs a record
//! for them: aspect ratio, placeholder, dominant color. This pass derives
//! exactly those pixel facts and nothing else; a static record's display
//! name, alt text, and tags are purely operator-maintained in the store.
//!
//! Pipeline-generated files (the `.g.avif` suffix) belong to the intake
//! pass and are ignored here.

use crate::config::{GENERATED_IMAGE_SUFFIX, Paths};
use crate::imaging::{placeholder, transcode};
use crate::intake::{FileOutcome, ImportReport, SkipReason, dir_filenames};
use crate::store::ImageStore;
use crate::types::{DominantColor, ImageRecord, Provenance};
use rayon::prelude::*;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

/// Backfill records for every static file in the output directory.
///
/// Creates the output directory if absent. Generated files are ignored
/// silently (they are not this pass's input, not a problem to report).
pub fn backfill(store: &mut ImageStore, paths: &Paths) -> io::Result<ImportReport> {
    std::fs::create_dir_all(&paths.output_dir)?;

    let filenames: Vec<String> = dir_filenames(&paths.output_dir)?
        .into_iter()
        .filter(|name| !name.ends_with(GENERATED_IMAGE_SUFFIX))
        .collect();
    let shared = Mutex::new(store);

    let outcomes = filenames
        .par_iter()
        .map(|filename| backfill_file(filename, paths, &shared))
        .collect();

    Ok(ImportReport { outcomes })
}

fn backfill_file(
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

    let bytes = match std::fs::read(paths.output_dir.join(filename)) {
        Ok(bytes) => bytes,
        Err(e) => return failed(filename, e),
    };
    let image = match transcode::decode(&bytes, format) {
        Ok(image) => image,
        Err(e) => return failed(filename, e),
    };

    let aspect_ratio = image.width() as f64 / image.height() as f64;
    let placeholder = match placeholder::generate(&image) {
        Ok(placeholder) => placeholder,
        Err(e) => return failed(filename, e),
    };

    {
        let mut store = store.lock().unwrap();
        let record = store
            .entry(filename.to_string())
            .or_insert_with(|| ImageRecord::new(filename, Provenance::Static));
        record.provenance = Provenance::Static;
        record.aspect_ratio = aspect_ratio;
        record.placeholder_uri = placeholder.uri;
        if !record.dominant_color.overridden {
            record.dominant_color = DominantColor::computed(placeholder.dominant_rgb);
        }
    }

    FileOutcome::Imported {
        filename: filename.to_string(),
        key: filename.to_string(),
        elapsed: started.elapsed(),
    }
}

fn failed(filename: &str, error: impl std::fmt::Display) -> FileOutcome {
    FileOutcome::Failed {
        filename: filename.to_string(),
        detail: error.to_string(),
    }
}
