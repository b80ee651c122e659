//! Intake transcoding: bounded resize + AVIF re-encode.
//!
//! Every intake image is re-encoded into a single served format — AVIF at a
//! fixed quality — sized so the longer edge is at most [`TRANSCODE_BOUND`]
//! pixels. Images already inside the bound are encoded as-is; nothing is
//! ever upscaled. Static files in the output directory are assumed
//! web-ready and never pass through here.

use super::calculations::fit_within;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;

/// Longer-edge bound for served images.
pub const TRANSCODE_BOUND: u32 = 800;
/// Fixed AVIF quality (1-100).
pub const TRANSCODE_QUALITY: u8 = 80;
/// rav1e encoder speed (lower = slower/better).
const AVIF_SPEED: u8 = 6;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("AVIF encode failed: {0}")]
    Encode(String),
}

/// Intake extensions with a decoder compiled in, and the format to decode
/// them as. Buffers are decoded with an explicit format so a mislabeled
/// file fails loudly instead of being sniffed into something else.
const INTAKE_FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// Decodable format for a (lowercased) file extension, if supported.
pub fn format_for_extension(extension: &str) -> Option<ImageFormat> {
    INTAKE_FORMATS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, format)| *format)
}

/// Decode an in-memory buffer as `format`.
pub fn decode(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, TranscodeError> {
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| TranscodeError::Decode(e.to_string()))
}

/// Resize (if needed) and write `image` as AVIF to `output`.
pub fn transcode_to(image: &DynamicImage, output: &Path) -> Result<(), TranscodeError> {
    let resized;
    let source = match fit_within((image.width(), image.height()), TRANSCODE_BOUND) {
        Some((w, h)) => {
            resized = image.resize(w, h, FilterType::Lanczos3);
            &resized
        }
        None => image,
    };

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(output)?;
    let writer = BufWriter::new(file);
    let encoder =
        image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, AVIF_SPEED, TRANSCODE_QUALITY);
    source
        .write_with_encoder(encoder)
        .map_err(|e| TranscodeError::Encode(e.to_string()))
}
