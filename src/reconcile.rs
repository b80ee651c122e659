//! Reconciliation: prune orphans in both directions.
//!
//! After imports, the store and the output directory must agree:
//!
//! - a record whose backing file was deleted out from under it is stale —
//!   the record goes;
//! - a generated file whose record was deleted (the operator's way of
//!   rejecting an image) is orphaned — the file goes. Hand-placed static
//!   files are never auto-deleted; only the `.g.avif` suffix marks a file
//!   as the pipeline's to remove.
//!
//! Deleting a record from the store and re-running is therefore the
//! supported way to retire a generated image.

use crate::store::{self, ImageStore};
use std::fs;
use std::io;
use std::path::Path;

/// What a reconciliation pass removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Record keys removed because no backing file exists.
    pub pruned_records: Vec<String>,
    /// Generated files deleted because no record exists.
    pub deleted_files: Vec<String>,
}

/// Run both prune passes over the store and output directory.
pub fn reconcile(store: &mut ImageStore, output_dir: &Path) -> io::Result<ReconcileReport> {
    let pruned_records = store::prune_records_without_files(store, output_dir);
    let deleted_files = store::prune_files_without_records(store, output_dir)?;
    Ok(ReconcileReport {
        pruned_records,
        deleted_files,
    })
}

/// Delete the given (successfully imported) filenames from the intake
/// directory. Already-gone files are fine; returns how many were removed.
pub fn clean_intake_dir(intake_dir: &Path, filenames: &[String]) -> io::Result<usize> {
    let mut removed = 0;
    for filename in filenames {
        match fs::remove_file(intake_dir.join(filename)) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}
