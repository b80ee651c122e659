//! The persisted metadata schema.
//!
//! These types are serialized into the metadata store and read back on every
//! run, so they are also the contract with the operator: the store file is
//! meant to be opened in an editor and touched up by hand. Two fields carry
//! explicit override semantics:
//!
//! - `display_name` — defaults to the record's key; once an operator (or a
//!   caption-derived regeneration) moves it away from the key, automated
//!   runs never touch it again.
//! - `dominant_color` — machine-computed values keep `overridden = false`
//!   and are refreshed every run; set `overridden = true` (and any CSS color
//!   in `css`) to pin it.

use serde::{Deserialize, Serialize};

/// Where an image record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Transcoded from intake with qualifying editing-suite metadata
    /// (recognized software signature + capture date + original filename).
    LightroomIntake,
    /// Transcoded from intake without qualifying embedded metadata.
    MiscIntake,
    /// Hand-placed in the output directory; metadata backfilled only,
    /// never transcoded.
    Static,
}

/// Approximate dominant color of an image.
///
/// `css` is whatever the rendering layer should paint — `#rrggbb` when
/// machine-computed, any CSS color literal once an operator pins it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominantColor {
    pub css: String,
    /// True once an operator has replaced the computed value by hand.
    /// Automated refresh skips the record while this is set.
    #[serde(default)]
    pub overridden: bool,
}

impl DominantColor {
    /// A machine-computed color; eligible for refresh on every run.
    pub fn computed(rgb: [u8; 3]) -> Self {
        Self {
            css: format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]),
            overridden: false,
        }
    }
}

/// One image's persisted record. The key it is stored under is both the
/// store's map key and the generated file's name — it is not repeated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub provenance: Provenance,
    /// Human-facing name, unique across the store. Defaults to the key.
    pub display_name: String,
    /// Original capture/export date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// Set semantics; fully replaced whenever the source supplies keywords.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Width / height of the source image.
    pub aspect_ratio: f64,
    /// `data:image/png;base64,…` preview proxy, painted before the real
    /// asset loads.
    pub placeholder_uri: String,
    // Kept last: serializes as a TOML sub-table.
    pub dominant_color: DominantColor,
}

impl ImageRecord {
    /// A fresh record for `key`. Derivable fields start at placeholder
    /// values; the importing stage fills them in before the record is
    /// persisted.
    pub fn new(key: &str, provenance: Provenance) -> Self {
        Self {
            provenance,
            display_name: key.to_string(),
            date: None,
            alt_text: None,
            tags: Vec::new(),
            aspect_ratio: 1.0,
            placeholder_uri: String::new(),
            dominant_color: DominantColor::computed([0, 0, 0]),
        }
    }
}
