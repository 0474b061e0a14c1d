//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait defines the two operations the conversion
//! pipeline needs from a codec: decode bytes into a raster, and encode a
//! raster into a target format.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), pure Rust, built on the
//! `image` crate. Tests use the recording [`tests::MockCodec`].

use super::params::{OutputFormat, Quality};
use image::{DynamicImage, GenericImageView};
use thiserror::Error;

/// A decoded pixel grid, independent of its source encoding.
pub type Raster = DynamicImage;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Natural pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(raster: &Raster) -> Self {
        let (width, height) = raster.dimensions();
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Trait for image codecs.
///
/// `Sync` so a single codec can be shared across rayon workers.
pub trait ImageCodec: Sync {
    /// Decode a fully-buffered encoded image.
    fn decode(&self, bytes: &[u8]) -> Result<Raster, ImagingError>;

    /// Encode a raster at its natural size.
    fn encode(
        &self,
        raster: &Raster,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ImagingError>;
}
