//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest size that fits inside `bounds` while keeping the
/// aspect ratio of `source`.
///
/// Sources already inside the bounds are returned unchanged; images are never
/// scaled up. Each side of a downscaled result is at least 1 pixel.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Maximum dimensions (width, height)
///
/// # Examples
/// ```
/// # use image_jobs::imaging::fit_within;
/// // 4000x3000 landscape into 800x600 → 800x600
/// assert_eq!(fit_within((4000, 3000), (800, 600)), (800, 600));
///
/// // 1000x2000 portrait into 800x600 → 300x600
/// assert_eq!(fit_within((1000, 2000), (800, 600)), (300, 600));
///
/// // Already small enough → untouched
/// assert_eq!(fit_within((640, 480), (800, 600)), (640, 480));
/// ```
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let scale = f64::min(
        max_w as f64 / src_w as f64,
        max_h as f64 / src_h as f64,
    );
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_matching_aspect() {
        assert_eq!(fit_within((4000, 3000), (800, 600)), (800, 600));
    }

    #[test]
    fn wide_panorama_limited_by_width() {
        assert_eq!(fit_within((4000, 1000), (800, 600)), (800, 200));
    }

    #[test]
    fn portrait_limited_by_height() {
        assert_eq!(fit_within((1000, 2000), (800, 600)), (300, 600));
    }

    #[test]
    fn square_source() {
        assert_eq!(fit_within((1200, 1200), (800, 600)), (600, 600));
    }

    #[test]
    fn smaller_source_not_upscaled() {
        assert_eq!(fit_within((640, 480), (800, 600)), (640, 480));
        assert_eq!(fit_within((10, 10), (800, 600)), (10, 10));
    }

    #[test]
    fn exactly_at_bounds_unchanged() {
        assert_eq!(fit_within((800, 600), (800, 600)), (800, 600));
    }

    #[test]
    fn only_one_side_too_large() {
        assert_eq!(fit_within((900, 100), (800, 600)), (800, 89));
        assert_eq!(fit_within((100, 900), (800, 600)), (67, 600));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within((100_000, 10), (800, 600)), (800, 1));
    }

    #[test]
    fn result_never_exceeds_bounds() {
        for source in [(801, 601), (1919, 1081), (3333, 2222), (599, 6001)] {
            let (w, h) = fit_within(source, (800, 600));
            assert!(w <= 800 && h <= 600, "{source:?} → {w}x{h}");
        }
    }
}
