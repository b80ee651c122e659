//! # Image Intake
//!
//! An image-ingestion and metadata-synthesis pipeline for static photo
//! sites. Drop editing-suite exports into an intake directory and the
//! pipeline turns them into web-ready AVIF assets plus a durable,
//! human-editable metadata store; hand-placed static images get the same
//! metadata treatment without being touched. The store is then projected
//! into compile-time-checkable enumerations so the rendering layer can't
//! reference an image that doesn't exist.
//!
//! # Architecture: Reconciling Three Sources of Truth
//!
//! Three things evolve independently between runs — the metadata embedded
//! in source images, the persisted record per image, and the files actually
//! on disk — and each run reconciles them:
//!
//! ```text
//! 1. Backfill   output dir   → records for hand-placed static images
//! 2. Import     intake dir   → transcoded AVIFs + created/refreshed records
//! 3. Reconcile  store ⇄ disk → prune orphaned records and orphaned files
//! 4. Project    store        → generated key/name/tag enumerations
//! ```
//!
//! Everything is idempotent: keys are derived deterministically from stable
//! embedded metadata, so re-running refreshes machine-owned fields in place
//! instead of accumulating duplicates. Operator-owned fields — a customized
//! display name, a pinned dominant color — are never overwritten by
//! automation; rerunning the whole pipeline is the only retry mechanism
//! anyone needs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Paths, the `.g.avif` generated suffix, recognized editing-suite signatures |
//! | [`types`] | The persisted schema: `ImageRecord`, `Provenance`, `DominantColor` |
//! | [`store`] | TOML store: read/write, orphan pruning, the `StoreIndex` lookup cache |
//! | [`extract`] | Provenance classification + normalized embedded fields |
//! | [`resolve`] | Deterministic key derivation and the record merge policy |
//! | [`intake`] | Parallel per-file import pipeline over the intake directory |
//! | [`backfill`] | Metadata backfill for hand-placed static images |
//! | [`reconcile`] | Both prune passes + confirmed intake cleanup |
//! | [`project`] | Enumeration emission; fails atomically on duplicate names |
//! | [`imaging`] | Pixel work: metadata parsing, transcoding, placeholder summary |
//! | [`output`] | CLI output formatting — pure `format_*` + `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## TOML Store, Sorted Keys
//!
//! The store is one TOML document, `BTreeMap` end to end, so writes are
//! byte-deterministic and diffs stay stable across runs. That matters
//! because the file is an editing surface: operators rename images, write
//! alt text, and pin colors directly in it, and a noisy diff would bury
//! their changes.
//!
//! ## AVIF-Only Output
//!
//! Intake images are re-encoded to a single modern format at a fixed
//! quality and bound. One format keeps the output directory and the
//! reconciler's generated-vs-static rule trivial: `.g.avif` is the
//! pipeline's, everything else is hand-placed.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resizing, AVIF encoding, and the embedded-metadata parsing are
//! all pure Rust — no ImageMagick, no libvips, no exiftool binary. The
//! IPTC/XMP reader is a deliberately minimal parser for exactly the fields
//! an editing-suite export carries, not a general metadata library.
//!
//! ## Explicit Overrides
//!
//! Machine-versus-operator ownership is visible in the data, not inferred:
//! a display name equal to its key is machine-owned, and `dominant_color`
//! carries an explicit `overridden` flag. Automation refreshes what it
//! owns and steps around the rest.

pub mod backfill;
pub mod config;
pub mod extract;
pub mod imaging;
pub mod intake;
pub mod output;
pub mod project;
pub mod reconcile;
pub mod resolve;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
