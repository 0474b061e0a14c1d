//! Centralized filename handling for converted outputs.
//!
//! Every converted image is named after its source: the stem (everything
//! before the *final* dot) plus the target format's extension. The original
//! extension never survives, and only the last extension is replaced:
//! - `photo.jpeg` → `photo.png`
//! - `archive.tar.gz` → `archive.tar.jpg`
//! - `noext` → `noext.webp` (a name without a dot is its own stem)
//!
//! Archive entries must be distinct, so [`EntryNames`] hands out
//! `stem-1.ext`, `stem-2.ext`, … for repeated names.

use crate::imaging::OutputFormat;
use std::collections::HashSet;

/// Split a filename into `(stem, extension)` at the final dot.
///
/// - `"photo.jpeg"` → `("photo", Some("jpeg"))`
/// - `"archive.tar.gz"` → `("archive.tar", Some("gz"))`
/// - `"noext"` → `("noext", None)`
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], Some(&name[pos + 1..])),
        None => (name, None),
    }
}

/// Stem of a filename: everything before the final dot, or the whole name.
pub fn stem(name: &str) -> &str {
    split_extension(name).0
}

/// Output filename for `name` converted to `format`.
pub fn output_filename(name: &str, format: OutputFormat) -> String {
    format!("{}.{}", stem(name), format.extension())
}

/// Hands out unique entry names for one archive.
///
/// The first occurrence of a name is used verbatim; later ones get a
/// numeric suffix on the stem.
#[derive(Debug, Default)]
pub struct EntryNames {
    taken: HashSet<String>,
}

impl EntryNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let (stem, ext) = split_extension(name);
        let mut n = 1;
        loop {
            let candidate = match ext {
                Some(ext) => format!("{stem}-{n}.{ext}"),
                None => format!("{stem}-{n}"),
            };
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
