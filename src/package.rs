//! Packaging of conversion results: zip archives and PDF documents.
//!
//! ## Archive
//!
//! [`pack_archive`] stores each converted image as a top-level entry named
//! after its `filename`, using the `zip` crate's default options. Repeated
//! filenames get a numeric suffix (see [`naming::EntryNames`]).
//!
//! ## Document
//!
//! [`pack_document`] is an independent pipeline over the *original* inputs,
//! not over converted results. Pages are portrait A4; each image is decoded,
//! scaled to fit ([`fit_to_page`]), centred and embedded as a JPEG at
//! [`DOCUMENT_QUALITY`], whatever format the user picked for conversion.
//!
//! Unlike batch conversion, a document is all-or-nothing: the first image
//! that fails to decode aborts the whole document.
//!
//! ```text
//! Catalog ─ Pages ─┬─ Page 1 ─ Contents: q w 0 0 h x y cm /Im0 Do Q
//!                  │           Resources/XObject/Im0 → JPEG (DCTDecode)
//!                  └─ Page 2 ─ …
//! ```

use crate::convert::{ProgressEvent, send};
use crate::imaging::{
    Dimensions, ImageCodec, ImagingError, OutputFormat, PageSize, Quality, fit_to_page,
    mm_to_points,
};
use crate::naming::EntryNames;
use crate::types::{ConvertedImage, InputImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::{Cursor, Write};
use std::sync::mpsc::Sender;
use thiserror::Error;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Filename for the zip of all converted images.
pub const ARCHIVE_NAME: &str = "converted-images.zip";
/// Filename for the PDF of the selected originals.
pub const DOCUMENT_NAME: &str = "converted-images.pdf";
/// JPEG quality of images embedded in documents.
pub const DOCUMENT_QUALITY: u32 = 80;

#[derive(Error, Debug)]
pub enum PackagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Document error: {0}")]
    Document(String),
    #[error("{filename}: {source}")]
    Image {
        filename: String,
        source: ImagingError,
    },
    #[error("Nothing to package")]
    Empty,
}

/// Bundle converted images into a single zip blob.
pub fn pack_archive(images: &[ConvertedImage]) -> Result<Vec<u8>, PackagingError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut names = EntryNames::new();

    for image in images {
        let entry = names.claim(&image.filename);
        zip.start_file(entry.as_str(), options)?;
        zip.write_all(&image.bytes)?;
    }

    let bytes = zip.finish()?.into_inner();
    tracing::info!(
        "packed {} image(s) into a {} byte archive",
        images.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Lay out the original images one per page into a PDF blob.
pub fn pack_document(
    codec: &impl ImageCodec,
    originals: &[InputImage],
    progress: Option<Sender<ProgressEvent>>,
) -> Result<Vec<u8>, PackagingError> {
    if originals.is_empty() {
        return Err(PackagingError::Empty);
    }

    let page = PageSize::A4_PORTRAIT;
    let (page_w_pt, page_h_pt) = page.to_points();
    let total = originals.len();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(total);

    for (index, original) in originals.iter().enumerate() {
        let image_error = |source| PackagingError::Image {
            filename: original.name().to_string(),
            source,
        };
        let raster = codec.decode(original.bytes()).map_err(image_error)?;
        let dims = Dimensions::of(&raster);
        if dims.is_empty() {
            return Err(image_error(ImagingError::Decode(format!(
                "image has no pixels ({}x{})",
                dims.width, dims.height
            ))));
        }
        let jpeg = codec
            .encode(
                &raster,
                OutputFormat::Jpg,
                Quality::new(DOCUMENT_QUALITY),
            )
            .map_err(image_error)?;

        let placement = fit_to_page(page, (dims.width, dims.height));
        tracing::debug!(
            "page {}: {} at {:.1}x{:.1}mm, offset ({:.1}, {:.1})",
            index + 1,
            original.name(),
            placement.width,
            placement.height,
            placement.x,
            placement.y
        );

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => dims.width as i64,
                "Height" => dims.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        // PDF space has its origin bottom-left; layout is top-left
        let width_pt = mm_to_points(placement.width);
        let height_pt = mm_to_points(placement.height);
        let x_pt = mm_to_points(placement.x);
        let y_pt = page_h_pt - mm_to_points(placement.y) - height_pt;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        (width_pt as f32).into(),
                        0.into(),
                        0.into(),
                        (height_pt as f32).into(),
                        (x_pt as f32).into(),
                        (y_pt as f32).into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| PackagingError::Document(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::from(0),
                Object::from(0),
                Object::from(page_w_pt as f32),
                Object::from(page_h_pt as f32),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        kids.push(page_id.into());

        send(
            &progress,
            ProgressEvent::PageAdded {
                current: index + 1,
                total,
                source: original.name().to_string(),
            },
        );
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PackagingError::Document(e.to_string()))?;
    tracing::info!("laid out {} page(s), {} bytes", total, bytes.len());
    Ok(bytes)
}
