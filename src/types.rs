//! Shared types used across the conversion pipeline.
//!
//! [`InputImage`] is what the user hands in, [`ConvertedImage`] is what a
//! conversion run hands back. Both are immutable once built; cloning an
//! input shares its byte buffer.

use crate::imaging::OutputFormat;
use crate::naming;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Not a file name: {0}")]
    InvalidName(PathBuf),
}

/// Identity of an input within one session: `(name, size, last_modified)`.
///
/// Two inputs with the same key are the same file as far as selection and
/// deduplication are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImageKey {
    pub name: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub last_modified: u64,
}

/// A fully-buffered input file.
#[derive(Debug, Clone)]
pub struct InputImage {
    name: String,
    bytes: Arc<[u8]>,
    last_modified: u64,
    mime_type: Option<&'static str>,
}

/// MIME type implied by a filename's extension, for the accepted image types.
///
/// - `"a.jpg"`, `"a.JPEG"` → `Some("image/jpeg")`
/// - `"a.tiff"`, `"noext"` → `None`
pub fn mime_type_for_name(name: &str) -> Option<&'static str> {
    let ext = naming::split_extension(name).1?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

impl InputImage {
    /// Build an input from an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>, last_modified: u64) -> Self {
        let name = name.into();
        let mime_type = mime_type_for_name(&name);
        Self {
            name,
            bytes: bytes.into(),
            last_modified,
            mime_type,
        }
    }

    /// Read a file from disk, taking its name and modification time.
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| InputError::InvalidName(path.to_path_buf()))?;
        let io_err = |source| InputError::Io {
            path: path.to_path_buf(),
            source,
        };
        let bytes = std::fs::read(path).map_err(io_err)?;
        let modified = modified_millis(std::fs::metadata(path).and_then(|m| m.modified()));
        Ok(Self::from_bytes(name, bytes, modified))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn last_modified(&self) -> u64 {
        self.last_modified
    }

    pub fn mime_type(&self) -> Option<&'static str> {
        self.mime_type
    }

    pub fn key(&self) -> ImageKey {
        ImageKey {
            name: self.name.clone(),
            size: self.size(),
            last_modified: self.last_modified,
        }
    }
}

/// Milliseconds since the epoch, or `0` when the platform cannot tell.
fn modified_millis(modified: std::io::Result<SystemTime>) -> u64 {
    modified
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The product of converting one [`InputImage`].
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub format: OutputFormat,
    pub original: InputImage,
}

impl ConvertedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}
