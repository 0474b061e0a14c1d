//! Shared test utilities for the imgconv test suite.
//!
//! Synthetic images are generated in memory so tests never depend on fixture
//! files. Pixel content is a simple gradient, enough for every codec to
//! produce a real, decodable payload.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let input = png_input("photo.png", 32, 24);
//! let broken = corrupt_input("broken.jpg");
//! let zipped = converted("photo.webp", vec![1, 2, 3]);
//! ```

use crate::imaging::OutputFormat;
use crate::naming;
use crate::types::{ConvertedImage, InputImage};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Encoded payloads
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

fn encode(image: image::DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Opaque RGB PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height).into(), ImageFormat::Png)
}

/// PNG with a half-transparent alpha channel.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 20) as u8, (y * 20) as u8, 200, 128])
    });
    encode(img.into(), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height).into(), ImageFormat::Jpeg)
}

// =========================================================================
// Inputs
// =========================================================================

pub fn png_input(name: &str, width: u32, height: u32) -> InputImage {
    InputImage::from_bytes(name, png_bytes(width, height), 1_700_000_000_000)
}

pub fn jpeg_input(name: &str, width: u32, height: u32) -> InputImage {
    InputImage::from_bytes(name, jpeg_bytes(width, height), 1_700_000_000_000)
}

/// An input whose bytes no decoder accepts.
pub fn corrupt_input(name: &str) -> InputImage {
    InputImage::from_bytes(name, b"definitely not an image".to_vec(), 1_700_000_000_000)
}

// =========================================================================
// Outputs
// =========================================================================

/// A converted image with arbitrary bytes. The format follows the filename's
/// extension, falling back to PNG.
pub fn converted(filename: &str, bytes: Vec<u8>) -> ConvertedImage {
    let ext = naming::split_extension(filename).1.unwrap_or("png");
    let format = OutputFormat::ALL
        .into_iter()
        .find(|f| f.extension() == ext)
        .unwrap_or(OutputFormat::Png);
    ConvertedImage {
        bytes,
        filename: filename.to_string(),
        format,
        original: InputImage::from_bytes(filename, vec![0; 8], 0),
    }
}
