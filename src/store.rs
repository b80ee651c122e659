//! The durable metadata store and its lookup index.
//!
//! One TOML document maps key → [`ImageRecord`]. The document is the
//! operator's editing surface — `display_name`, `alt_text`, `tags`, and
//! `dominant_color` are all fair game for hand edits between runs — so it
//! is written with deterministic key ordering (a `BTreeMap` end to end) to
//! keep diffs stable across runs.
//!
//! ## Reconciliation primitives
//!
//! The two prune operations enforce the store's file invariants:
//!
//! - every record's key must name a file in the output directory
//!   ([`prune_records_without_files`]);
//! - every generated file (`.g.avif`) must have a record
//!   ([`prune_files_without_records`]). Files without the generated suffix
//!   are hand-placed and never auto-deleted.
//!
//! ## Lookups
//!
//! [`StoreIndex`] is the explicit lookup cache over a store snapshot —
//! by display name and by tag. It is built on demand and simply rebuilt
//! after the store changes; nothing hides behind a process-wide singleton.
//! Building it is also where display-name uniqueness is enforced.

use crate::config::GENERATED_IMAGE_SUFFIX;
use crate::types::ImageRecord;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// In-memory store: key → record, sorted by key.
pub type ImageStore = BTreeMap<String, ImageRecord>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed metadata store: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize metadata store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Two records claim the same display name. Fatal during projection:
/// downstream references by name would be ambiguous.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("duplicate display name \"{name}\" ({first_key} and {second_key})")]
pub struct DuplicateDisplayName {
    pub name: String,
    pub first_key: String,
    pub second_key: String,
}

/// Read the store from disk. A missing or empty file is an empty store,
/// never an error — the first run starts from nothing. Malformed TOML is an
/// error: the file is hand-edited, and silently discarding it would throw
/// away operator work.
pub fn read(path: &Path) -> Result<ImageStore, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ImageStore::new()),
        Err(e) => return Err(e.into()),
    };
    if contents.trim().is_empty() {
        return Ok(ImageStore::new());
    }
    Ok(toml::from_str(&contents)?)
}

/// Serialize the full store with deterministic key ordering.
pub fn write(path: &Path, store: &ImageStore) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let rendered = toml::to_string_pretty(store)?;
    fs::write(path, rendered)?;
    Ok(())
}

/// Remove records whose key names no file in the output directory.
/// Returns the removed keys, for logging.
pub fn prune_records_without_files(store: &mut ImageStore, output_dir: &Path) -> Vec<String> {
    let stale: Vec<String> = store
        .keys()
        .filter(|key| !output_dir.join(key).is_file())
        .cloned()
        .collect();
    for key in &stale {
        store.remove(key);
    }
    stale
}

/// Delete generated-suffix files in the output directory that have no
/// record. Returns the deleted filenames. Static files (no suffix) are
/// never touched; a missing output directory is simply empty.
pub fn prune_files_without_records(
    store: &ImageStore,
    output_dir: &Path,
) -> io::Result<Vec<String>> {
    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut deleted = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.ends_with(GENERATED_IMAGE_SUFFIX) && !store.contains_key(&name) {
            fs::remove_file(entry.path())?;
            deleted.push(name);
        }
    }
    deleted.sort();
    Ok(deleted)
}

/// Lookup cache over a store snapshot: display name → key, tag → keys.
#[derive(Debug, Default, Clone)]
pub struct StoreIndex {
    by_name: BTreeMap<String, String>,
    by_tag: BTreeMap<String, Vec<String>>,
}

impl StoreIndex {
    /// Build the index, failing on the first duplicate display name.
    pub fn build(store: &ImageStore) -> Result<Self, DuplicateDisplayName> {
        let mut index = Self::default();
        for (key, record) in store {
            if let Some(first_key) = index.by_name.get(&record.display_name) {
                return Err(DuplicateDisplayName {
                    name: record.display_name.clone(),
                    first_key: first_key.clone(),
                    second_key: key.clone(),
                });
            }
            index
                .by_name
                .insert(record.display_name.clone(), key.clone());
            for tag in &record.tags {
                index.by_tag.entry(tag.clone()).or_default().push(key.clone());
            }
        }
        Ok(index)
    }

    pub fn key_for_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn keys_for_tag(&self, tag: &str) -> &[String] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All distinct display names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// All distinct tags, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.by_tag.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DominantColor, Provenance};
    use tempfile::TempDir;

    fn record(display_name: &str, tags: &[&str]) -> ImageRecord {
        let mut r = ImageRecord::new("placeholder", Provenance::MiscIntake);
        r.display_name = display_name.to_string();
        r.tags = tags.iter().map(|t| t.to_string()).collect();
        r
    }

    // =========================================================================
    // read / write
    // =========================================================================

    #[test]
    fn read_missing_file_is_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = read(&tmp.path().join("nope.toml")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn read_empty_file_is_empty_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.toml");
        fs::write(&path, "  \n\n").unwrap();
        assert!(read(&path).unwrap().is_empty());
    }

    #[test]
    fn read_malformed_file_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.toml");
        fs::write(&path, "this is [not toml").unwrap();
        assert!(matches!(read(&path), Err(StoreError::Parse(_))));
    }

    #[test]
    fn write_then_read_roundtrips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("content/store.toml");

        let mut store = ImageStore::new();
        let mut r = record("sunset-2023-05-01", &["beach", "sunset"]);
        r.date = Some("2023-05-01".to_string());
        r.alt_text = Some("Sunset".to_string());
        r.aspect_ratio = 1.5;
        r.dominant_color = DominantColor::computed([1, 2, 3]);
        store.insert("2023-05-01-img_001.g.avif".to_string(), r);
        store.insert(
            "map.png".to_string(),
            record("map.png", &[]),
        );

        write(&path, &store).unwrap();
        assert_eq!(read(&path).unwrap(), store);
    }

    #[test]
    fn write_is_deterministic_across_insertion_order() {
        let tmp = TempDir::new().unwrap();
        let a_path = tmp.path().join("a.toml");
        let b_path = tmp.path().join("b.toml");

        let mut a = ImageStore::new();
        a.insert("b.g.avif".to_string(), record("bee", &[]));
        a.insert("a.g.avif".to_string(), record("ay", &[]));

        let mut b = ImageStore::new();
        b.insert("a.g.avif".to_string(), record("ay", &[]));
        b.insert("b.g.avif".to_string(), record("bee", &[]));

        write(&a_path, &a).unwrap();
        write(&b_path, &b).unwrap();
        assert_eq!(
            fs::read_to_string(a_path).unwrap(),
            fs::read_to_string(b_path).unwrap()
        );
    }

    // =========================================================================
    // pruning
    // =========================================================================

    #[test]
    fn prune_records_drops_keys_without_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kept.g.avif"), b"x").unwrap();

        let mut store = ImageStore::new();
        store.insert("kept.g.avif".to_string(), record("kept", &[]));
        store.insert("gone.g.avif".to_string(), record("gone", &[]));

        let removed = prune_records_without_files(&mut store, tmp.path());
        assert_eq!(removed, vec!["gone.g.avif"]);
        assert!(store.contains_key("kept.g.avif"));
        assert!(!store.contains_key("gone.g.avif"));
    }

    #[test]
    fn prune_files_deletes_only_generated_orphans() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("recorded.g.avif"), b"x").unwrap();
        fs::write(tmp.path().join("orphan.g.avif"), b"x").unwrap();
        fs::write(tmp.path().join("static.png"), b"x").unwrap();

        let mut store = ImageStore::new();
        store.insert("recorded.g.avif".to_string(), record("recorded", &[]));

        let deleted = prune_files_without_records(&store, tmp.path()).unwrap();
        assert_eq!(deleted, vec!["orphan.g.avif"]);
        assert!(tmp.path().join("recorded.g.avif").exists());
        assert!(!tmp.path().join("orphan.g.avif").exists());
        // static file without a record survives
        assert!(tmp.path().join("static.png").exists());
    }

    #[test]
    fn prune_files_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = ImageStore::new();
        let deleted =
            prune_files_without_records(&store, &tmp.path().join("missing")).unwrap();
        assert!(deleted.is_empty());
    }

    // =========================================================================
    // StoreIndex
    // =========================================================================

    #[test]
    fn index_looks_up_by_name_and_tag() {
        let mut store = ImageStore::new();
        store.insert("a.g.avif".to_string(), record("dawn", &["sky", "sea"]));
        store.insert("b.g.avif".to_string(), record("dusk", &["sky"]));

        let index = StoreIndex::build(&store).unwrap();
        assert_eq!(index.key_for_name("dawn"), Some("a.g.avif"));
        assert_eq!(index.key_for_name("missing"), None);
        assert_eq!(index.keys_for_tag("sky"), ["a.g.avif", "b.g.avif"]);
        assert_eq!(index.keys_for_tag("sea"), ["a.g.avif"]);
        assert!(index.keys_for_tag("land").is_empty());
    }

    #[test]
    fn index_enumerates_sorted_names_and_tags() {
        let mut store = ImageStore::new();
        store.insert("a.g.avif".to_string(), record("zulu", &["b", "a"]));
        store.insert("b.g.avif".to_string(), record("alpha", &["c"]));

        let index = StoreIndex::build(&store).unwrap();
        assert_eq!(index.names().collect::<Vec<_>>(), ["alpha", "zulu"]);
        assert_eq!(index.tags().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn index_rejects_duplicate_display_names() {
        let mut store = ImageStore::new();
        store.insert("a.g.avif".to_string(), record("same", &[]));
        store.insert("b.g.avif".to_string(), record("same", &[]));

        let err = StoreIndex::build(&store).unwrap_err();
        assert_eq!(err.name, "same");
        assert_eq!(err.first_key, "a.g.avif");
        assert_eq!(err.second_key, "b.g.avif");
    }
}
