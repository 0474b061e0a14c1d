//! # imgconv
//!
//! A batch image converter. Load a drop of images, pick a target format and
//! quality, and get the converted files back one by one, bundled into a zip,
//! or laid out one per page in a PDF.
//!
//! # Architecture: Convert, Then Package
//!
//! ```text
//! 1. Load      files     →  Session          (filter, dedupe, select)
//! 2. Convert   selection →  ConvertedImage*  (decode + re-encode, in parallel)
//! 3. Package   results   →  zip blob         (or: originals → PDF blob)
//! 4. Deliver   blob      →  output directory
//! ```
//!
//! Every stage is a plain function over in-memory buffers. Codecs sit behind
//! the [`imaging::ImageCodec`] trait, so pipeline logic is tested against a
//! recording mock without encoding real pixels.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Codec trait, the `image`-crate codec, conversion parameters, page layout math |
//! | [`convert`] | Single-image conversion and the batch orchestrator with progress events |
//! | [`package`] | Zip archive of results and PDF document of originals |
//! | [`delivery`] | Saving produced files into an output directory |
//! | [`session`] | Loaded inputs, selection, and the last run's results |
//! | [`config`] | `imgconv.toml` loading, validation, and merging |
//! | [`types`] | `InputImage`, `ConvertedImage`, identity keys |
//! | [`naming`] | Output filename derivation and unique archive entry names |
//! | [`output`] | CLI output formatting and the JSON report |
//!
//! # Design Decisions
//!
//! ## Partial Success vs. Fail Fast
//!
//! Batch conversion skips images that fail and carries on; the failures are
//! reported alongside the results. The PDF path aborts on the first image it
//! cannot decode, since a document with missing pages is not a useful
//! artifact.
//!
//! ## Pure-Rust Codecs
//!
//! Decoding and encoding use the `image` crate only. JPEG is the one lossy
//! target; PNG, GIF and WebP are written losslessly, so the quality setting
//! only affects JPEG output (and the JPEG images embedded in PDFs).

pub mod config;
pub mod convert;
pub mod delivery;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod package;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
