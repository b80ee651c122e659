//! Placeholder proxy and dominant color from pixel data.
//!
//! The preview proxy is a coarse cosine-basis summary of the image —
//! [`COMPONENTS_X`]×[`COMPONENTS_Y`] frequency components computed over
//! linear-light RGB — expanded back into a [`PREVIEW_SIZE`]² pixel image and
//! emitted as a PNG data URI. Painted at full bleed behind the real asset,
//! it gives the characteristic soft-blur instant preview while the AVIF
//! loads.
//!
//! The source is first bounded to [`SOURCE_BOUND`] on the longer edge (the
//! summary is low-frequency; more input pixels buy nothing) and normalized
//! to RGBA so every decoded format walks the same buffer layout. The DC
//! component doubles as the approximate dominant color.

use super::calculations::fit_within;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use std::f32::consts::PI;
use thiserror::Error;

/// Horizontal / vertical component resolution of the summary.
const COMPONENTS_X: usize = 4;
const COMPONENTS_Y: usize = 4;
/// Longer-edge bound applied before the summary is computed.
const SOURCE_BOUND: u32 = 600;
/// Edge length of the expanded preview image.
const PREVIEW_SIZE: u32 = 16;

#[derive(Error, Debug)]
pub enum PlaceholderError {
    #[error("preview encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Result of a placeholder pass over one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// `data:image/png;base64,…` preview proxy.
    pub uri: String,
    /// Approximate dominant color (sRGB).
    pub dominant_rgb: [u8; 3],
}

/// Compute the preview proxy and dominant color for `image`.
pub fn generate(image: &DynamicImage) -> Result<Placeholder, PlaceholderError> {
    let resized;
    let source = match fit_within((image.width(), image.height()), SOURCE_BOUND) {
        Some((w, h)) => {
            // Triangle is plenty for a low-frequency summary and much
            // cheaper than Lanczos3 at these sizes.
            resized = image.resize(w, h, FilterType::Triangle);
            &resized
        }
        None => image,
    };

    let components = cosine_components(&source.to_rgba8());

    let preview = render_preview(&components, PREVIEW_SIZE, PREVIEW_SIZE);
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        &preview,
        PREVIEW_SIZE,
        PREVIEW_SIZE,
        ExtendedColorType::Rgb8,
    )?;

    Ok(Placeholder {
        uri: format!("data:image/png;base64,{}", STANDARD.encode(&png)),
        dominant_rgb: to_srgb(components[0]),
    })
}

/// Project linear-light RGB onto the 2D cosine basis.
///
/// Component (0,0) is the image average; higher components carry the coarse
/// structure. Row-major: `components[cy * COMPONENTS_X + cx]`.
fn cosine_components(pixels: &RgbaImage) -> Vec<[f32; 3]> {
    let w = pixels.width() as usize;
    let h = pixels.height() as usize;

    let linear: Vec<[f32; 3]> = pixels
        .pixels()
        .map(|p| {
            [
                srgb_to_linear(p[0]),
                srgb_to_linear(p[1]),
                srgb_to_linear(p[2]),
            ]
        })
        .collect();

    let mut components = Vec::with_capacity(COMPONENTS_X * COMPONENTS_Y);
    for cy in 0..COMPONENTS_Y {
        for cx in 0..COMPONENTS_X {
            let norm = if cx == 0 && cy == 0 { 1.0 } else { 2.0 };
            let mut sum = [0f32; 3];

            for y in 0..h {
                let basis_y = (PI * cy as f32 * y as f32 / h as f32).cos();
                for x in 0..w {
                    let basis = basis_y * (PI * cx as f32 * x as f32 / w as f32).cos();
                    let px = linear[y * w + x];
                    sum[0] += basis * px[0];
                    sum[1] += basis * px[1];
                    sum[2] += basis * px[2];
                }
            }

            let scale = norm / (w * h) as f32;
            components.push([sum[0] * scale, sum[1] * scale, sum[2] * scale]);
        }
    }
    components
}

/// Expand the component summary back into a small RGB8 pixel buffer.
fn render_preview(components: &[[f32; 3]], width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((width * height * 3) as usize);

    for y in 0..height {
        for x in 0..width {
            let mut value = [0f32; 3];
            for cy in 0..COMPONENTS_Y {
                for cx in 0..COMPONENTS_X {
                    let basis = (PI * cx as f32 * x as f32 / width as f32).cos()
                        * (PI * cy as f32 * y as f32 / height as f32).cos();
                    let c = components[cy * COMPONENTS_X + cx];
                    value[0] += c[0] * basis;
                    value[1] += c[1] * basis;
                    value[2] += c[2] * basis;
                }
            }
            out.extend(to_srgb(value));
        }
    }
    out
}

fn srgb_to_linear(channel: u8) -> f32 {
    let v = channel as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(v: f32) -> u8 {
    let v = v.clamp(0.0, 1.0);
    let s = if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    (s * 255.0 + 0.5) as u8
}

fn to_srgb(linear: [f32; 3]) -> [u8; 3] {
    [
        linear_to_srgb(linear[0]),
        linear_to_srgb(linear[1]),
        linear_to_srgb(linear[2]),
    ]
}
