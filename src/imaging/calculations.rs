//! Pure dimension math, testable without any I/O or pixels.

/// Dimensions that fit `source` inside a `bound`×`bound` box, preserving
/// aspect ratio. Returns `None` when the source already fits — callers use
/// that to skip resizing entirely, so images are never upscaled.
pub fn fit_within(source: (u32, u32), bound: u32) -> Option<(u32, u32)> {
    let (w, h) = source;
    let longer = w.max(h);
    if longer <= bound {
        return None;
    }

    let scale = bound as f64 / longer as f64;
    if w >= h {
        Some((bound, ((h as f64 * scale).round() as u32).max(1)))
    } else {
        Some((((w as f64 * scale).round() as u32).max(1), bound))
    }
}
