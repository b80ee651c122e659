//! Pipeline paths and fixed conventions.
//!
//! The pipeline works against two directories and three files:
//!
//! ```text
//! image-intake/                        # intake: uploads awaiting processing
//! public/images/                       # output: served images
//! ├── 2023-05-01-img_001.g.avif        # pipeline-generated (suffix)
//! └── map-of-the-world.png             # hand-placed static asset
//! content/image_metadata.g.toml        # metadata store (human-editable)
//! content/image_keys.g.rs              # generated key/name/tag value sets
//! content/image_types.g.rs             # generated literal-checking macros
//! ```
//!
//! The `.g.avif` suffix is the single discriminator between generated and
//! static files: it names the transcoder's output, and the reconciler only
//! ever auto-deletes files that carry it.

use std::path::PathBuf;

/// Suffix appended to every pipeline-generated image. Doubles as the
/// generated-vs-static discriminator during reconciliation.
pub const GENERATED_IMAGE_SUFFIX: &str = ".g.avif";

/// Software-signature fragments that identify an editing-suite export.
/// Matched case-insensitively against the embedded creator tool string
/// (e.g. "Adobe Lightroom 8.1 (Macintosh)").
pub const EDITING_SUITE_SIGNATURES: &[&str] = &["lightroom"];

/// Everything the pipeline reads or writes, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Staging directory for uploads awaiting import.
    pub intake_dir: PathBuf,
    /// Served-images directory (generated and hand-placed files).
    pub output_dir: PathBuf,
    /// Metadata store document.
    pub store_file: PathBuf,
    /// Generated value-set declarations (`IMAGE_KEYS` etc.).
    pub keys_file: PathBuf,
    /// Generated literal-checking macros (`image_key!` etc.).
    pub types_file: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            intake_dir: PathBuf::from("image-intake"),
            output_dir: PathBuf::from("public/images"),
            store_file: PathBuf::from("content/image_metadata.g.toml"),
            keys_file: PathBuf::from("content/image_keys.g.rs"),
            types_file: PathBuf::from("content/image_types.g.rs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_suffix_is_an_avif_extension() {
        // The served format and the discriminator must agree, or the
        // reconciler would never match the transcoder's output.
        assert!(GENERATED_IMAGE_SUFFIX.ends_with(".avif"));
        assert!(GENERATED_IMAGE_SUFFIX.starts_with(".g."));
    }

    #[test]
    fn signatures_are_lowercase() {
        // classify() lowercases the embedded string before matching
        for sig in EDITING_SUITE_SIGNATURES {
            assert_eq!(*sig, sig.to_lowercase());
        }
    }
}
