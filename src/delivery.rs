//! Delivery of produced files.
//!
//! A [`Delivery`] takes a finished byte blob and a filename and hands it to
//! the user. [`DirectoryDelivery`] saves into an output directory: the bytes
//! are written to a hidden `.part` file which is renamed into place once
//! complete, so a reader never sees a half-written file. The temporary file
//! is removed if anything fails. One attempt, no retries.

use crate::naming::EntryNames;
use crate::types::ConvertedImage;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid output filename: {0:?}")]
    InvalidFilename(String),
}

pub trait Delivery {
    /// Save `bytes` under `filename`, returning where they ended up.
    fn deliver(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, DeliveryError>;
}

/// Saves files into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Keep only the final path component, rejecting names that have none.
fn sanitize_filename(filename: &str) -> Result<&str, DeliveryError> {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DeliveryError::InvalidFilename(filename.to_string()))
}

impl Delivery for DirectoryDelivery {
    fn deliver(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, DeliveryError> {
        let name = sanitize_filename(filename)?;
        fs::create_dir_all(&self.dir)?;

        let target = self.dir.join(name);
        let part = self.dir.join(format!(".{name}.part"));

        let written = fs::File::create(&part).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        // The handle is closed here, before the rename
        if let Err(e) = written.and_then(|()| fs::rename(&part, &target)) {
            let _ = fs::remove_file(&part);
            return Err(e.into());
        }

        tracing::debug!("delivered {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }
}

/// Deliver every converted image as its own file, in order.
///
/// Results that share a filename (`a.png` and `a.jpg` both converted to
/// WebP) are saved as `a.webp`, `a-1.webp`, … so none overwrites another.
pub fn deliver_each(
    delivery: &impl Delivery,
    results: &[ConvertedImage],
) -> Result<Vec<PathBuf>, DeliveryError> {
    let mut names = EntryNames::new();
    results
        .iter()
        .map(|result| delivery.deliver(&result.bytes, &names.claim(&result.filename)))
        .collect()
}
