//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the size of a resized image variation.
///
/// Both dimensions given means an exact size. With only one, the other is
/// derived from the source aspect ratio. With neither, the source size is kept.
///
/// # Examples
/// ```
/// # use seo_maestro::imaging::fit_dimensions;
/// // Width only: 1024x768 → 800x600
/// assert_eq!(fit_dimensions((1024, 768), Some(800), None), (800, 600));
///
/// // Height only: 1024x768 → 400x300
/// assert_eq!(fit_dimensions((1024, 768), None, Some(300)), (400, 300));
/// ```
pub fn fit_dimensions(source: (u32, u32), width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let (src_w, src_h) = source;

    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (None, None) => source,
        // Degenerate source: nothing to derive an aspect ratio from
        _ if src_w == 0 || src_h == 0 => (width.unwrap_or(0), height.unwrap_or(0)),
        (Some(w), None) => {
            let h = (w as f64 * src_h as f64 / src_w as f64).round() as u32;
            (w, h)
        }
        (None, Some(h)) => {
            let w = (h as f64 * src_w as f64 / src_h as f64).round() as u32;
            (w, h)
        }
    }
}

/// File name of a resized variation, `basename.WxH.ext`, with `0` for a
/// dimension that follows from the aspect ratio.
///
/// ```
/// # use seo_maestro::imaging::variation_file_name;
/// assert_eq!(variation_file_name("hero.jpg", Some(800), None), "hero.800x0.jpg");
/// ```
pub fn variation_file_name(file: &str, width: Option<u32>, height: Option<u32>) -> String {
    let size = format!("{}x{}", width.unwrap_or(0), height.unwrap_or(0));
    match file.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}.{size}.{ext}"),
        None => format!("{file}.{size}"),
    }
}
