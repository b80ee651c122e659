//! Shared test utilities for the image-intake test suite.
//!
//! Real editing-suite exports carry their metadata in JPEG marker segments;
//! these helpers synthesize the same byte layout — an encoded JPEG with
//! APP13 (IPTC-IIM inside a Photoshop 8BIM resource) and APP1 (XMP packet)
//! segments spliced in after SOI — so parser and pipeline tests exercise
//! the actual binary paths instead of fixture structs.

use crate::config::Paths;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use tempfile::TempDir;

/// Encode a small gradient JPEG in memory.
pub fn encode_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// Alias that reads better at call sites that don't care about metadata.
pub fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode_jpeg_bytes(width, height)
}

/// One IPTC-IIM Application Record dataset.
pub fn iim_dataset(dataset: u8, value: &str) -> Vec<u8> {
    let mut bytes = vec![0x1C, 0x02, dataset];
    bytes.extend((value.len() as u16).to_be_bytes());
    bytes.extend(value.as_bytes());
    bytes
}

/// APP13 segment wrapping IIM bytes in a Photoshop 8BIM 0x0404 resource.
pub fn app13_segment(iim: &[u8]) -> Vec<u8> {
    let mut resource = Vec::new();
    resource.extend(b"Photoshop 3.0\0");
    resource.extend(b"8BIM");
    resource.extend(0x0404u16.to_be_bytes());
    resource.extend([0u8, 0u8]); // empty pascal name, padded to even
    resource.extend((iim.len() as u32).to_be_bytes());
    resource.extend(iim);
    if iim.len() % 2 == 1 {
        resource.push(0);
    }

    let mut segment = vec![0xFF, 0xED];
    segment.extend(((resource.len() + 2) as u16).to_be_bytes());
    segment.extend(resource);
    segment
}

/// APP1 segment carrying an XMP packet body.
pub fn app1_xmp_segment(xml: &str) -> Vec<u8> {
    let mut payload: Vec<u8> = Vec::new();
    payload.extend(b"http://ns.adobe.com/xap/1.0/\0");
    payload.extend(xml.as_bytes());

    let mut segment = vec![0xFF, 0xE1];
    segment.extend(((payload.len() + 2) as u16).to_be_bytes());
    segment.extend(payload);
    segment
}

/// Splice marker segments into a JPEG right after SOI.
pub fn with_segments(jpeg: &[u8], segments: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(jpeg.len() + segments.iter().map(Vec::len).sum::<usize>());
    out.extend(&jpeg[..2]);
    for segment in segments {
        out.extend(segment);
    }
    out.extend(&jpeg[2..]);
    out
}

/// A JPEG with only an XMP packet attached.
pub fn jpeg_with_xmp(xml: &str) -> Vec<u8> {
    with_segments(&encode_jpeg_bytes(16, 16), &[app1_xmp_segment(xml)])
}

/// A complete synthetic Lightroom export: XMP creator tool, raw filename,
/// capture date, plus optional IPTC caption and keywords.
pub fn lightroom_jpeg(
    date: &str,
    raw_file_name: &str,
    caption: Option<&str>,
    keywords: &[&str],
) -> Vec<u8> {
    let xmp = format!(
        r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF><rdf:Description xmp:CreatorTool="Adobe Lightroom 8.1 (Macintosh)" crs:RawFileName="{raw_file_name}" xmp:CreateDate="{date}T10:00:00"/></rdf:RDF></x:xmpmeta>"#
    );

    let mut iim = Vec::new();
    if let Some(caption) = caption {
        iim.extend(iim_dataset(120, caption));
    }
    for keyword in keywords {
        iim.extend(iim_dataset(25, keyword));
    }

    let mut segments = vec![app1_xmp_segment(&xmp)];
    if !iim.is_empty() {
        segments.push(app13_segment(&iim));
    }
    with_segments(&encode_jpeg_bytes(64, 48), &segments)
}

/// An isolated `Paths` bundle rooted in a fresh temp directory. Keep the
/// `TempDir` alive for the duration of the test.
pub fn test_paths() -> (TempDir, Paths) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let paths = Paths {
        intake_dir: root.join("image-intake"),
        output_dir: root.join("public/images"),
        store_file: root.join("content/image_metadata.g.toml"),
        keys_file: root.join("content/image_keys.g.rs"),
        types_file: root.join("content/image_types.g.rs"),
    };
    (tmp, paths)
}
