//! Provenance classification and field normalization.
//!
//! Sits on top of [`crate::imaging::meta_parser`]: takes the raw embedded
//! fields and produces the normalized set the resolver consumes, then
//! classifies the file's origin.
//!
//! ## Normalization
//!
//! - **Software signature**: XMP creator tool, falling back to the IPTC
//!   originating program.
//! - **Capture date**: XMP date (full ISO timestamp, date part taken)
//!   preferred over IPTC 2:55 (`YYYYMMDD`, reformatted). Always `YYYY-MM-DD`.
//! - **Caption**: IPTC caption, falling back to the title field — the same
//!   priority the editing suite itself displays.
//!
//! ## Classification
//!
//! A file is an editing-suite export only when the signature matches AND
//! both the capture date and the original raw filename are present. A
//! matching signature with either field missing means the export is
//! incomplete; the file is skipped rather than imported under a key that
//! would change once the metadata is fixed.

use crate::config::EDITING_SUITE_SIGNATURES;
use crate::imaging::meta_parser::{self, EmbeddedMetadata};

/// Normalized embedded fields for one source image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub software: Option<String>,
    /// `YYYY-MM-DD`.
    pub capture_date: Option<String>,
    /// Original raw filename, e.g. "IMG_001.NEF".
    pub raw_file_name: Option<String>,
    /// Caption (preferred) or title.
    pub caption: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub keywords: Vec<String>,
}

/// How an intake file classifies after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Recognized editing-suite export with the required fields present.
    Lightroom { date: String, raw_file_name: String },
    /// Recognized signature but no capture date or no original filename —
    /// skip the file entirely, leave it in intake for manual resolution.
    MissingRequiredFields,
    /// No qualifying embedded metadata.
    Misc,
}

/// Extract and normalize embedded fields from an image buffer.
pub fn extract(bytes: &[u8], extension: &str) -> ExtractedFields {
    let meta = meta_parser::parse(bytes, extension);
    normalize(meta)
}

fn normalize(meta: EmbeddedMetadata) -> ExtractedFields {
    ExtractedFields {
        software: meta.creator_tool.or(meta.originating_program),
        capture_date: normalize_date(
            meta.xmp_create_date.as_deref(),
            meta.iptc_date_created.as_deref(),
        ),
        raw_file_name: meta.raw_file_name,
        caption: meta.caption.or(meta.title),
        location: meta.sub_location,
        city: meta.city,
        state: meta.state,
        country: meta.country,
        keywords: meta.keywords,
    }
}

/// Classify an intake file from its normalized fields.
pub fn classify(fields: &ExtractedFields) -> Classification {
    let signature_matches = fields.software.as_deref().is_some_and(|software| {
        let lower = software.to_lowercase();
        EDITING_SUITE_SIGNATURES.iter().any(|sig| lower.contains(sig))
    });

    if !signature_matches {
        return Classification::Misc;
    }

    match (&fields.capture_date, &fields.raw_file_name) {
        (Some(date), Some(raw_file_name)) => Classification::Lightroom {
            date: date.clone(),
            raw_file_name: raw_file_name.clone(),
        },
        _ => Classification::MissingRequiredFields,
    }
}

/// Normalize to `YYYY-MM-DD`, preferring the ISO-timestamped XMP value.
fn normalize_date(xmp: Option<&str>, iptc: Option<&str>) -> Option<String> {
    if let Some(value) = xmp {
        let date = value.split('T').next().unwrap_or(value);
        if is_iso_date(date) {
            return Some(date.to_string());
        }
    }
    if let Some(value) = iptc {
        if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
            return Some(format!("{}-{}-{}", &value[..4], &value[4..6], &value[6..8]));
        }
    }
    None
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{app1_xmp_segment, app13_segment, encode_jpeg_bytes, iim_dataset, with_segments};

    fn lightroom_fields() -> ExtractedFields {
        ExtractedFields {
            software: Some("Adobe Lightroom 8.1 (Macintosh)".to_string()),
            capture_date: Some("2023-05-01".to_string()),
            raw_file_name: Some("IMG_001.NEF".to_string()),
            ..ExtractedFields::default()
        }
    }

    #[test]
    fn classify_complete_lightroom_export() {
        assert_eq!(
            classify(&lightroom_fields()),
            Classification::Lightroom {
                date: "2023-05-01".to_string(),
                raw_file_name: "IMG_001.NEF".to_string(),
            }
        );
    }

    #[test]
    fn classify_signature_match_is_case_insensitive() {
        let mut fields = lightroom_fields();
        fields.software = Some("ADOBE LIGHTROOM CLASSIC 12".to_string());
        assert!(matches!(classify(&fields), Classification::Lightroom { .. }));
    }

    #[test]
    fn classify_missing_date_skips() {
        let mut fields = lightroom_fields();
        fields.capture_date = None;
        assert_eq!(classify(&fields), Classification::MissingRequiredFields);
    }

    #[test]
    fn classify_missing_raw_filename_skips() {
        let mut fields = lightroom_fields();
        fields.raw_file_name = None;
        assert_eq!(classify(&fields), Classification::MissingRequiredFields);
    }

    #[test]
    fn classify_unrecognized_software_is_misc() {
        let mut fields = lightroom_fields();
        fields.software = Some("GIMP 2.10".to_string());
        assert_eq!(classify(&fields), Classification::Misc);
        fields.software = None;
        assert_eq!(classify(&fields), Classification::Misc);
    }

    #[test]
    fn misc_never_requires_fields() {
        // No signature + no date/filename is a plain misc import, not a skip
        assert_eq!(classify(&ExtractedFields::default()), Classification::Misc);
    }

    #[test]
    fn date_prefers_xmp_timestamp() {
        assert_eq!(
            normalize_date(Some("2023-05-01T14:23:11"), Some("20221231")),
            Some("2023-05-01".to_string())
        );
    }

    #[test]
    fn date_falls_back_to_iptc_form() {
        assert_eq!(
            normalize_date(None, Some("20230501")),
            Some("2023-05-01".to_string())
        );
    }

    #[test]
    fn date_rejects_malformed_values() {
        assert_eq!(normalize_date(Some("yesterday"), None), None);
        assert_eq!(normalize_date(None, Some("2023")), None);
        assert_eq!(normalize_date(None, Some("2023-05-01")), None);
        assert_eq!(normalize_date(None, None), None);
    }

    #[test]
    fn date_accepts_bare_xmp_date() {
        assert_eq!(
            normalize_date(Some("2021-11-30"), None),
            Some("2021-11-30".to_string())
        );
    }

    #[test]
    fn caption_prefers_caption_over_title() {
        let meta = EmbeddedMetadata {
            caption: Some("The caption".to_string()),
            title: Some("The title".to_string()),
            ..EmbeddedMetadata::default()
        };
        assert_eq!(normalize(meta).caption.as_deref(), Some("The caption"));

        let meta = EmbeddedMetadata {
            title: Some("The title".to_string()),
            ..EmbeddedMetadata::default()
        };
        assert_eq!(normalize(meta).caption.as_deref(), Some("The title"));
    }

    #[test]
    fn software_falls_back_to_originating_program() {
        let meta = EmbeddedMetadata {
            originating_program: Some("Adobe Lightroom".to_string()),
            ..EmbeddedMetadata::default()
        };
        assert_eq!(normalize(meta).software.as_deref(), Some("Adobe Lightroom"));
    }

    #[test]
    fn extract_from_full_jpeg_buffer() {
        let mut iim = Vec::new();
        iim.extend(iim_dataset(120, "Sunset"));
        iim.extend(iim_dataset(25, "Beach"));
        iim.extend(iim_dataset(90, "Lisbon"));
        let xmp = r#"<rdf:Description xmp:CreatorTool="Adobe Lightroom 8.1" crs:RawFileName="IMG_001.NEF" xmp:CreateDate="2023-05-01T10:00:00"/>"#;
        let jpeg = with_segments(
            &encode_jpeg_bytes(16, 16),
            &[app13_segment(&iim), app1_xmp_segment(xmp)],
        );

        let fields = extract(&jpeg, "jpg");
        assert_eq!(fields.capture_date.as_deref(), Some("2023-05-01"));
        assert_eq!(fields.raw_file_name.as_deref(), Some("IMG_001.NEF"));
        assert_eq!(fields.caption.as_deref(), Some("Sunset"));
        assert_eq!(fields.city.as_deref(), Some("Lisbon"));
        assert_eq!(fields.keywords, vec!["Beach"]);
        assert!(matches!(classify(&fields), Classification::Lightroom { .. }));
    }
}
