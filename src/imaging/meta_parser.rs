//! Minimal embedded-metadata parser for JPEG and TIFF buffers.
//!
//! Reads the two metadata blocks an editing-suite export actually carries:
//!
//! - **IPTC-IIM Application Record** — title (2:05), keywords (2:25), date
//!   created (2:55), originating program (2:65), city (2:90), sub-location
//!   (2:92), province/state (2:95), country (2:101), caption (2:120).
//!   For JPEG this lives in the APP13 marker (Photoshop 8BIM resource
//!   0x0404); for TIFF in IFD tag 33723 (raw IIM) or 34377 (8BIM block).
//! - **XMP packet** — `xmp:CreatorTool` (software signature),
//!   `crs:RawFileName` (Lightroom's stable original-filename reference),
//!   `xmp:CreateDate` / `photoshop:DateCreated` (capture date with full
//!   ISO timestamp). JPEG APP1 with the XMP namespace header, TIFF tag 700.
//!   Attribute and element forms are both accepted; no XML tree is built.
//!
//! Pure extraction over the buffer: no I/O, no side effects, and any
//! malformed structure degrades to "field absent" rather than an error.

/// Raw fields as they appear in the file. Normalization (date formats,
/// caption priority) happens in [`crate::extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedMetadata {
    /// XMP `xmp:CreatorTool`, e.g. "Adobe Lightroom 8.1 (Macintosh)".
    pub creator_tool: Option<String>,
    /// IPTC 2:65 Originating Program — fallback software signature.
    pub originating_program: Option<String>,
    /// XMP `crs:RawFileName`, e.g. "IMG_001.NEF". Consistent across
    /// multiple exports of the same photo.
    pub raw_file_name: Option<String>,
    /// XMP `xmp:CreateDate` or `photoshop:DateCreated` (ISO timestamp).
    pub xmp_create_date: Option<String>,
    /// IPTC 2:55 Date Created (`YYYYMMDD`).
    pub iptc_date_created: Option<String>,
    /// IPTC 2:05 Object Name — the "Title" field.
    pub title: Option<String>,
    /// IPTC 2:120 Caption-Abstract — the "Caption" field.
    pub caption: Option<String>,
    /// IPTC 2:25 Keywords, one entry per dataset.
    pub keywords: Vec<String>,
    /// IPTC 2:92 Sub-location — the "Location" field.
    pub sub_location: Option<String>,
    /// IPTC 2:90 City.
    pub city: Option<String>,
    /// IPTC 2:95 Province/State.
    pub state: Option<String>,
    /// IPTC 2:101 Country name.
    pub country: Option<String>,
}

/// Parse embedded metadata from an image buffer, dispatching on extension.
///
/// JPEG and TIFF are the formats editing suites attach IPTC/XMP to; every
/// other extension returns empty metadata (and will classify as a misc
/// import downstream).
pub fn parse(bytes: &[u8], extension: &str) -> EmbeddedMetadata {
    match extension {
        "jpg" | "jpeg" => parse_jpeg(bytes),
        "tif" | "tiff" => parse_tiff(bytes),
        _ => EmbeddedMetadata::default(),
    }
}

// ---------------------------------------------------------------------------
// IPTC-IIM record parsing
// ---------------------------------------------------------------------------

/// Walk raw IPTC-IIM bytes, filling in Application Record (record 2) fields.
///
/// IIM dataset layout:
///   Byte 0:    0x1C (tag marker)
///   Byte 1:    record number
///   Byte 2:    dataset number
///   Bytes 3-4: data length (big-endian u16)
///   Bytes 5+:  data (UTF-8/ASCII string)
fn parse_iim(data: &[u8], meta: &mut EmbeddedMetadata) {
    let mut pos = 0;

    while pos + 5 <= data.len() {
        if data[pos] != 0x1C {
            pos += 1;
            continue;
        }

        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let length = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        pos += 5;

        if pos + length > data.len() {
            break;
        }

        if record == 2 {
            let value = String::from_utf8_lossy(&data[pos..pos + length])
                .trim()
                .to_string();

            if !value.is_empty() {
                match dataset {
                    5 => meta.title = Some(value),
                    25 => meta.keywords.push(value),
                    55 => meta.iptc_date_created = Some(value),
                    65 => meta.originating_program = Some(value),
                    90 => meta.city = Some(value),
                    92 => meta.sub_location = Some(value),
                    95 => meta.state = Some(value),
                    101 => meta.country = Some(value),
                    120 => meta.caption = Some(value),
                    _ => {}
                }
            }
        }

        pos += length;
    }
}

// ---------------------------------------------------------------------------
// JPEG segment walk
// ---------------------------------------------------------------------------

const XMP_NAMESPACE_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

/// Walk JPEG marker segments from SOI, reading APP13 (IPTC) and APP1 (XMP)
/// payloads until image data (SOS) starts.
fn parse_jpeg(data: &[u8]) -> EmbeddedMetadata {
    let mut meta = EmbeddedMetadata::default();

    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return meta;
    }

    let mut pos = 2;
    while pos + 2 <= data.len() {
        if data[pos] != 0xFF {
            break;
        }
        let marker = data[pos + 1];

        // Fill byte before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // Standalone markers (no length field); SOS/EOI end the metadata zone
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        if marker == 0xD8 || marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        if pos + 4 > data.len() {
            break;
        }
        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            break;
        }
        let payload_start = pos + 4;
        let payload_end = (pos + 2 + seg_len).min(data.len());
        let payload = &data[payload_start..payload_end];

        match marker {
            // APP13: Photoshop resources, IPTC inside
            0xED => {
                if let Some(iim) = iptc_from_8bim(payload) {
                    parse_iim(iim, &mut meta);
                }
            }
            // APP1: XMP packet (APP1 is also EXIF; the header disambiguates)
            0xE1 => {
                if let Some(xml) = payload.strip_prefix(XMP_NAMESPACE_HEADER) {
                    parse_xmp(&String::from_utf8_lossy(xml), &mut meta);
                }
            }
            _ => {}
        }

        pos += 2 + seg_len;
    }

    meta
}

/// Find the raw IPTC-IIM bytes inside a Photoshop 8BIM resource block.
///
/// Each resource: "8BIM" + resource id (u16) + pascal name (padded to even)
/// + data length (u32) + data (padded to even). Resource 0x0404 is IPTC.
fn iptc_from_8bim(segment: &[u8]) -> Option<&[u8]> {
    let data = segment
        .strip_prefix(PHOTOSHOP_HEADER)
        .unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;

        if pos + 2 > data.len() {
            break;
        }
        let resource_id = u16::from_be_bytes([data[pos], data[pos + 1]]);
        pos += 2;

        if pos >= data.len() {
            break;
        }
        let name_len = data[pos] as usize;
        pos += 1 + name_len + (1 + name_len) % 2; // pad to even

        if pos + 4 > data.len() {
            break;
        }
        let res_len =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;

        if pos + res_len > data.len() {
            break;
        }
        if resource_id == IPTC_RESOURCE_ID {
            return Some(&data[pos..pos + res_len]);
        }

        pos += res_len + res_len % 2;
    }

    None
}

// ---------------------------------------------------------------------------
// XMP packet scan
// ---------------------------------------------------------------------------

/// Pull the handful of XMP values this pipeline reads out of the packet.
/// A full RDF parse buys nothing here: Lightroom writes these as plain
/// attributes or simple elements, and both forms are matched textually.
fn parse_xmp(xml: &str, meta: &mut EmbeddedMetadata) {
    if meta.creator_tool.is_none() {
        meta.creator_tool = xmp_value(xml, "xmp:CreatorTool");
    }
    if meta.raw_file_name.is_none() {
        meta.raw_file_name = xmp_value(xml, "crs:RawFileName");
    }
    if meta.xmp_create_date.is_none() {
        meta.xmp_create_date =
            xmp_value(xml, "xmp:CreateDate").or_else(|| xmp_value(xml, "photoshop:DateCreated"));
    }
}

/// Look up one XMP property, trying `name="value"` then `<name>value</name>`.
fn xmp_value(xml: &str, name: &str) -> Option<String> {
    let attr = format!("{name}=\"");
    if let Some(start) = xml.find(&attr) {
        let rest = &xml[start + attr.len()..];
        let end = rest.find('"')?;
        return non_empty(xml_unescape(&rest[..end]));
    }

    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    non_empty(xml_unescape(xml[start..end].trim()))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Undo the five predefined XML entities. `&amp;` last, so entity-encoded
/// ampersands don't double-decode.
fn xml_unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// TIFF IFD walk
// ---------------------------------------------------------------------------

/// Read metadata from a TIFF buffer: tag 700 (XMP packet), tag 33723
/// (raw IPTC-IIM), tag 34377 (Photoshop 8BIM block).
fn parse_tiff(data: &[u8]) -> EmbeddedMetadata {
    let mut meta = EmbeddedMetadata::default();
    if data.len() < 8 {
        return meta;
    }

    let big_endian = match &data[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return meta,
    };

    let read_u16 = |offset: usize| -> u16 {
        let b = [data[offset], data[offset + 1]];
        if big_endian {
            u16::from_be_bytes(b)
        } else {
            u16::from_le_bytes(b)
        }
    };
    let read_u32 = |offset: usize| -> u32 {
        let b = [
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ];
        if big_endian {
            u32::from_be_bytes(b)
        } else {
            u32::from_le_bytes(b)
        }
    };

    if read_u16(2) != 42 {
        return meta;
    }

    // Byte width per TIFF value type; count is in values, not bytes.
    let type_size = |typ: u16| -> usize {
        match typ {
            1 | 2 | 6 | 7 => 1, // BYTE, ASCII, SBYTE, UNDEFINED
            3 | 8 => 2,         // SHORT, SSHORT
            4 | 9 | 11 => 4,    // LONG, SLONG, FLOAT
            5 | 10 | 12 => 8,   // RATIONAL, SRATIONAL, DOUBLE
            _ => 1,
        }
    };

    let mut ifd_offset = read_u32(4) as usize;

    while ifd_offset > 0 && ifd_offset + 2 < data.len() {
        let entry_count = read_u16(ifd_offset) as usize;
        let entries_start = ifd_offset + 2;

        for i in 0..entry_count {
            let entry = entries_start + i * 12;
            if entry + 12 > data.len() {
                return meta;
            }

            let tag = read_u16(entry);
            let typ = read_u16(entry + 2);
            let count = read_u32(entry + 4) as usize;
            let byte_len = count * type_size(typ);
            let value_offset = read_u32(entry + 8) as usize;

            // The blocks we read are all > 4 bytes, so the offset field is
            // always a real offset, never an inline value.
            if byte_len <= 4 || value_offset + byte_len > data.len() {
                continue;
            }
            let value = &data[value_offset..value_offset + byte_len];

            match tag {
                700 => parse_xmp(&String::from_utf8_lossy(value), &mut meta),
                33723 => parse_iim(value, &mut meta),
                34377 => {
                    if let Some(iim) = iptc_from_8bim(value) {
                        parse_iim(iim, &mut meta);
                    }
                }
                _ => {}
            }
        }

        let next = entries_start + entry_count * 12;
        if next + 4 <= data.len() {
            ifd_offset = read_u32(next) as usize;
        } else {
            break;
        }
    }

    meta
}
