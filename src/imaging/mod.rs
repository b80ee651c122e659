//! Pixel and metadata work — pure Rust, zero external dependencies.
//!
//! | Operation | Module / crate |
//! |---|---|
//! | **Embedded metadata** | [`meta_parser`] — custom IPTC-IIM + XMP scan |
//! | **Decode (JPEG, PNG, TIFF, WebP)** | `image` crate (pure Rust decoders) |
//! | **Resize → AVIF** | [`transcode`] — Lanczos3 + rav1e encoder |
//! | **Preview proxy + dominant color** | [`placeholder`] — cosine-basis summary |
//! | **Dimension math** | [`calculations`] — pure functions, unit testable |

pub mod calculations;
pub mod meta_parser;
pub mod placeholder;
pub mod transcode;

pub use calculations::fit_within;
pub use meta_parser::EmbeddedMetadata;
pub use placeholder::{Placeholder, PlaceholderError};
pub use transcode::{TranscodeError, decode, format_for_extension, transcode_to};
