//! Pure Rust codec built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF) | `image::ImageReader` with format sniffing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality-aware) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless only) |
//! | Encode → GIF | `image::codecs::gif::GifEncoder` (single frame) |

use super::backend::{Dimensions, ImageCodec, ImagingError, Raster};
use super::params::{OutputFormat, Quality};
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, Frame, ImageReader};
use std::io::Cursor;

/// Pure Rust codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// JPEG quality on the encoder's native 1–100 scale.
fn jpeg_quality(quality: Quality) -> u8 {
    (quality.factor() * 100.0).round().clamp(1.0, 100.0) as u8
}

fn encode_jpeg(raster: &Raster, quality: Quality) -> Result<Vec<u8>, ImagingError> {
    // JPEG has no alpha channel; flatten first
    let rgb = DynamicImage::ImageRgb8(raster.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality)))
        .map_err(|e| ImagingError::Encode(format!("JPEG encode failed: {}", e)))?;
    Ok(buf)
}

fn encode_png(raster: &Raster) -> Result<Vec<u8>, ImagingError> {
    let mut buf = Vec::new();
    raster
        .write_with_encoder(PngEncoder::new(&mut buf))
        .map_err(|e| ImagingError::Encode(format!("PNG encode failed: {}", e)))?;
    Ok(buf)
}

fn encode_webp(raster: &Raster) -> Result<Vec<u8>, ImagingError> {
    let rgba = DynamicImage::ImageRgba8(raster.to_rgba8());
    let mut buf = Vec::new();
    rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buf))
        .map_err(|e| ImagingError::Encode(format!("WebP encode failed: {}", e)))?;
    Ok(buf)
}

fn encode_gif(raster: &Raster) -> Result<Vec<u8>, ImagingError> {
    let mut buf = Vec::new();
    {
        // The trailer is written when the encoder is dropped
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .encode_frame(Frame::new(raster.to_rgba8()))
            .map_err(|e| ImagingError::Encode(format!("GIF encode failed: {}", e)))?;
    }
    Ok(buf)
}

impl ImageCodec for RustCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Raster, ImagingError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImagingError::Decode(format!("Failed to read image: {}", e)))?
            .decode()
            .map_err(|e| ImagingError::Decode(format!("Failed to decode image: {}", e)))
    }

    fn encode(
        &self,
        raster: &Raster,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ImagingError> {
        let dims = Dimensions::of(raster);
        if dims.is_empty() {
            return Err(ImagingError::Encode(format!(
                "Cannot encode a {}x{} image",
                dims.width, dims.height
            )));
        }

        tracing::debug!(
            "encoding {}x{} raster as {} ({})",
            dims.width,
            dims.height,
            format,
            quality
        );

        match format {
            OutputFormat::Jpg => encode_jpeg(raster, quality),
            OutputFormat::Png => encode_png(raster),
            OutputFormat::Webp => encode_webp(raster),
            OutputFormat::Gif => encode_gif(raster),
        }
    }
}
