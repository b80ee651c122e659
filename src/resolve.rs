//! Key derivation and the record merge policy.
//!
//! ## Keys
//!
//! The key is the one identifier everything hangs off: it names the
//! generated file, keys the store, and anchors override detection. It must
//! therefore be deterministic — re-ingesting the same source always lands on
//! the same key, never a duplicate entry:
//!
//! - editing-suite export: `{capture-date}-{sanitized raw-file stem}.g.avif`
//!   — derived from embedded metadata that is stable across re-exports, not
//!   from the upload's (arbitrary) filename.
//! - misc import: `{sanitized filename stem}.g.avif`
//! - static asset: the literal filename, untouched.
//!
//! ## Merge policy
//!
//! Re-running the pipeline refreshes what the machine owns and leaves what
//! the operator owns:
//!
//! | field | policy |
//! |---|---|
//! | `display_name` | regenerated from a caption only while still equal to the key |
//! | `alt_text` | overwritten only by a non-empty caption this run |
//! | `tags` | fully replaced from this run's keywords + geo fields |
//! | `provenance`, `date` | refreshed from this run's extraction |
//!
//! Tags deliberately replace rather than union: they mirror what is
//! currently embedded in the source, so re-exporting with a keyword removed
//! removes it here too.

use crate::config::GENERATED_IMAGE_SUFFIX;
use crate::extract::ExtractedFields;
use crate::types::{ImageRecord, Provenance};
use std::path::Path;

/// Sanitize one key/name component: lowercase, spaces and dashes become
/// underscores, everything else non-alphanumeric is dropped.
pub fn sanitize_component(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('_'),
            '_' => Some('_'),
            c if c.is_ascii_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Filename stem: `IMG_001.NEF` → `IMG_001`.
fn stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

/// Key for an editing-suite export.
pub fn lightroom_key(date: &str, raw_file_name: &str) -> String {
    format!(
        "{date}-{}{GENERATED_IMAGE_SUFFIX}",
        sanitize_component(stem(raw_file_name))
    )
}

/// Key for an intake file without qualifying metadata.
pub fn misc_key(filename: &str) -> String {
    format!("{}{GENERATED_IMAGE_SUFFIX}", sanitize_component(stem(filename)))
}

/// Display name derived from a caption, e.g. `sunset-2023-05-01`.
fn display_name_from_caption(caption: &str, date: &str) -> String {
    format!("{}-{date}", sanitize_component(caption))
}

/// Tags for this run: the keyword list plus non-empty geographic fields,
/// lowercased and deduplicated. Keywords are the only embedded text that
/// becomes tags.
fn collect_tags(fields: &ExtractedFields) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |value: &str| {
        let tag = value.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    for keyword in &fields.keywords {
        push(keyword);
    }
    for geo in [&fields.location, &fields.city, &fields.state, &fields.country] {
        if let Some(value) = geo {
            push(value);
        }
    }
    tags
}

/// Apply this run's extraction to a record (fresh or pre-existing) under
/// `key`, following the merge policy above. Pixel-derived fields (aspect
/// ratio, placeholder, dominant color) are the importing stage's job.
pub fn apply_intake_fields(
    record: &mut ImageRecord,
    key: &str,
    provenance: Provenance,
    fields: &ExtractedFields,
) {
    record.provenance = provenance;
    if let Some(date) = &fields.capture_date {
        record.date = Some(date.clone());
    }

    // Only a qualifying editing-suite export supplies names, captions, and
    // tags; a misc import's incidental metadata is never promoted.
    if provenance != Provenance::LightroomIntake {
        return;
    }

    if let Some(caption) = &fields.caption {
        if record.display_name == key {
            if let Some(date) = &fields.capture_date {
                record.display_name = display_name_from_caption(caption, date);
            }
        }
        record.alt_text = Some(caption.clone());
    }

    record.tags = collect_tags(fields);
}
