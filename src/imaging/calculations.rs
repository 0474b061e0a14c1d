//! Pure calculation functions for page layout.
//!
//! All functions here are pure and testable without any I/O or images.

// 1pt = 1/72 inch
const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    /// ISO A4, portrait.
    pub const A4_PORTRAIT: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// Page dimensions in PDF points, as `(width, height)`.
    pub fn to_points(self) -> (f64, f64) {
        (mm_to_points(self.width_mm), mm_to_points(self.height_mm))
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4_PORTRAIT
    }
}

pub fn mm_to_points(mm: f64) -> f64 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

/// Where an image lands on a page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scale an image to fit the page and center it.
///
/// The scale factor is `min(page_w / img_w, page_h / img_h)`: the aspect
/// ratio is preserved exactly and the image touches the page on at least one
/// axis. Small images are scaled up to that fit as well.
///
/// # Arguments
/// * `page` - Page dimensions
/// * `image` - Natural image dimensions in pixels (width, height), both non-zero
///
/// # Examples
/// ```
/// # use imgconv::imaging::{PageSize, fit_to_page};
/// // A 2100x1000 banner on A4: width-bound, centred vertically
/// let p = fit_to_page(PageSize::A4_PORTRAIT, (2100, 1000));
/// assert!((p.scale - 0.1).abs() < 1e-9);
/// assert!(p.x.abs() < 1e-9);
/// assert!((p.y - 98.5).abs() < 1e-9);
/// ```
pub fn fit_to_page(page: PageSize, image: (u32, u32)) -> Placement {
    let (img_w, img_h) = (image.0 as f64, image.1 as f64);

    let scale = (page.width_mm / img_w).min(page.height_mm / img_h);
    let width = img_w * scale;
    let height = img_h * scale;

    Placement {
        scale,
        x: (page.width_mm - width) / 2.0,
        y: (page.height_mm - height) / 2.0,
        width,
        height,
    }
}

/// Cumulative progress as a percentage (0–100).
///
/// An empty run is reported as complete.
pub fn progress_percent(current: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((current.min(total) as f64 / total as f64) * 100.0).round() as u32
}
