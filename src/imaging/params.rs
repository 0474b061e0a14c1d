//! Parameter types for conversion runs.
//!
//! These types describe *what* to produce, not *how*. They are shared by the
//! single-image converter, the batch orchestrator, the config file and the CLI.
//!
//! ## Types
//!
//! - [`Quality`]: Encoding quality (10–100 in steps of 5, default 80). Clamped and snapped on construction.
//! - [`OutputFormat`]: The closed set of target formats: JPG, PNG, WEBP, GIF.
//! - [`ConversionRequest`]: Format + quality, applied uniformly to every image of a run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting for encoding (10-100, step 5).
///
/// Serialized as a bare integer. Out-of-range or off-step values are clamped
/// and snapped to the nearest step by [`Quality::new`]; the config loader
/// rejects them instead (see `config::ConverterConfig::validate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(u32);

impl Quality {
    pub const MIN: u32 = 10;
    pub const MAX: u32 = 100;
    pub const STEP: u32 = 5;

    pub fn new(value: u32) -> Self {
        let clamped = value.clamp(Self::MIN, Self::MAX);
        let snapped = (clamped + Self::STEP / 2) / Self::STEP * Self::STEP;
        Self(snapped.min(Self::MAX))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Linear mapping onto the 0.0–1.0 scale codecs reason in.
    pub fn factor(self) -> f32 {
        self.0 as f32 / 100.0
    }

    /// Whether `value` is already a valid quality (in range and on a step).
    pub fn is_valid(value: u32) -> bool {
        (Self::MIN..=Self::MAX).contains(&value) && value % Self::STEP == 0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Target encoding format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpg,
    Png,
    Webp,
    Gif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Jpg, Self::Png, Self::Webp, Self::Gif];

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Whether the encoder behind this format honours [`Quality`].
    ///
    /// Only JPEG does: PNG and GIF are lossless, and the `image` crate
    /// ships a lossless-only WebP encoder.
    pub fn uses_quality(self) -> bool {
        matches!(self, Self::Jpg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Format and quality for one conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub format: OutputFormat,
    pub quality: Quality,
}

impl ConversionRequest {
    pub fn new(format: OutputFormat, quality: Quality) -> Self {
        Self { format, quality }
    }
}
