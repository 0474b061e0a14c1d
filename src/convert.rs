//! Single-image conversion and batch orchestration.
//!
//! ## Single image
//!
//! [`convert`] decodes one input, re-encodes it at its natural size in the
//! requested format and quality, and names the result after the source
//! (see [`naming::output_filename`]). The input is never modified.
//!
//! ## Batch
//!
//! [`convert_all`] converts a snapshot of inputs and returns the successes
//! in input order. Failures are logged, recorded and skipped; a partial
//! failure never aborts the run.
//!
//! Images are converted in parallel on the global rayon pool. After each
//! image completes (success or failure) a [`ProgressEvent`] is sent whose
//! `current` is the cumulative number of processed images, so progress is
//! monotonic and reaches `total` even when items fail.

use crate::imaging::{ConversionRequest, ImageCodec, ImagingError};
use crate::naming;
use crate::types::{ConvertedImage, InputImage};
use rayon::prelude::*;
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};

/// Progress notifications emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A batch of `total` images is about to be converted.
    BatchStarted { total: usize },
    /// One image converted successfully.
    ImageConverted {
        current: usize,
        total: usize,
        source: String,
        filename: String,
        bytes: usize,
    },
    /// One image failed and was skipped.
    ImageFailed {
        current: usize,
        total: usize,
        source: String,
        error: String,
    },
    /// One page of a document was laid out.
    PageAdded {
        current: usize,
        total: usize,
        source: String,
    },
}

/// An input that could not be converted.
#[derive(Debug)]
pub struct BatchFailure {
    pub original: InputImage,
    pub error: ImagingError,
}

/// Result of a batch run: ordered successes plus the skipped failures.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub converted: Vec<ConvertedImage>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn processed(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.converted.iter().map(|c| c.bytes.len()).sum()
    }
}

/// Convert one image.
pub fn convert(
    codec: &impl ImageCodec,
    input: &InputImage,
    request: ConversionRequest,
) -> Result<ConvertedImage, ImagingError> {
    let raster = codec.decode(input.bytes())?;
    let bytes = codec.encode(&raster, request.format, request.quality)?;

    Ok(ConvertedImage {
        bytes,
        filename: naming::output_filename(input.name(), request.format),
        format: request.format,
        original: input.clone(),
    })
}

/// Convert every image in `images`, skipping failures.
///
/// An empty input returns immediately without emitting any progress.
pub fn convert_all(
    codec: &impl ImageCodec,
    images: &[InputImage],
    request: ConversionRequest,
    progress: Option<Sender<ProgressEvent>>,
) -> BatchOutcome {
    if images.is_empty() {
        return BatchOutcome::default();
    }

    let total = images.len();
    tracing::info!(
        "converting {} image(s) to {} at {}",
        total,
        request.format,
        request.quality
    );
    send(&progress, ProgressEvent::BatchStarted { total });

    // Counter and send share one lock so events leave in cumulative order
    let completed = Mutex::new(0usize);

    let results: Vec<Result<ConvertedImage, BatchFailure>> = images
        .par_iter()
        .map(|input| {
            let result = convert(codec, input, request);

            let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
            *done += 1;
            let event = match &result {
                Ok(converted) => ProgressEvent::ImageConverted {
                    current: *done,
                    total,
                    source: input.name().to_string(),
                    filename: converted.filename.clone(),
                    bytes: converted.bytes.len(),
                },
                Err(e) => {
                    tracing::warn!("skipping {}: {}", input.name(), e);
                    ProgressEvent::ImageFailed {
                        current: *done,
                        total,
                        source: input.name().to_string(),
                        error: e.to_string(),
                    }
                }
            };
            send(&progress, event);
            drop(done);

            result.map_err(|error| BatchFailure {
                original: input.clone(),
                error,
            })
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok(converted) => outcome.converted.push(converted),
            Err(failure) => outcome.failures.push(failure),
        }
    }

    tracing::info!(
        "converted {} of {} image(s), {} failed",
        outcome.converted.len(),
        total,
        outcome.failures.len()
    );
    outcome
}

/// Send an event if anyone is listening. A dropped receiver is not an error.
pub(crate) fn send(progress: &Option<Sender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(tx) = progress {
        let _ = tx.send(event);
    }
}
