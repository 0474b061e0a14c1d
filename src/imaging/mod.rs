//! Image codec layer, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from the bytes) |
//! | **Encode** | `image` JPEG / PNG / WebP / GIF encoders |
//! | **Page fit** | pure arithmetic, see [`fit_to_page`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for layout math (unit testable)
//! - **Parameters**: Format, quality and request types
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, ImageCodec, ImagingError, Raster};
pub use calculations::{PageSize, Placement, fit_to_page, mm_to_points, progress_percent};
pub use params::{ConversionRequest, OutputFormat, Quality};
pub use rust_backend::RustCodec;
