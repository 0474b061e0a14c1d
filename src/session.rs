//! One user's working set: loaded inputs, the selection, and the results of
//! the last conversion run.
//!
//! Every change goes through a method on [`Session`], so the selection can
//! never reference an image that is not loaded. Runs work on a snapshot of
//! the selection taken when they start.
//!
//! ## Drops
//!
//! Files arrive in batches ("drops") via [`Session::add_drop`]. Each drop is
//! filtered against [`InputConfig`]: files whose type is not accepted are
//! discarded, then the drop is capped at `max_files`. Files already loaded
//! (same [`ImageKey`]) are ignored. Everything that survives is appended in
//! drop order and selected.

use crate::config::InputConfig;
use crate::convert::{self, BatchOutcome, ProgressEvent};
use crate::imaging::{ConversionRequest, ImageCodec};
use crate::package::{self, PackagingError};
use crate::types::{ConvertedImage, ImageKey, InputImage};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::mpsc::Sender;

/// What happened to each file of a drop.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DropReport {
    /// Keys of the images that were loaded and selected.
    pub added: Vec<ImageKey>,
    /// Already loaded; ignored.
    pub duplicates: Vec<String>,
    /// Type not in the accepted list.
    pub rejected_type: Vec<String>,
    /// Beyond the per-drop file limit.
    pub over_limit: Vec<String>,
}

impl DropReport {
    pub fn discarded(&self) -> usize {
        self.duplicates.len() + self.rejected_type.len() + self.over_limit.len()
    }
}

#[derive(Debug, Default)]
pub struct Session {
    images: Vec<InputImage>,
    selected: HashSet<ImageKey>,
    last_run: BatchOutcome,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a drop of files, auto-selecting the new ones.
    pub fn add_drop(&mut self, files: Vec<InputImage>, limits: &InputConfig) -> DropReport {
        let mut report = DropReport::default();

        let accepted = files.into_iter().filter(|file| {
            let ok = file.mime_type().is_some_and(|m| limits.accepts(m));
            if !ok {
                report.rejected_type.push(file.name().to_string());
            }
            ok
        });
        let accepted: Vec<_> = accepted.collect();

        for (i, file) in accepted.into_iter().enumerate() {
            if i >= limits.max_files {
                report.over_limit.push(file.name().to_string());
                continue;
            }
            let key = file.key();
            if self.contains(&key) {
                report.duplicates.push(file.name().to_string());
                continue;
            }
            self.selected.insert(key.clone());
            self.images.push(file);
            report.added.push(key);
        }

        if report.discarded() > 0 {
            tracing::info!(
                "drop: {} added, {} discarded",
                report.added.len(),
                report.discarded()
            );
        }
        report
    }

    pub fn contains(&self, key: &ImageKey) -> bool {
        self.images.iter().any(|img| img.key() == *key)
    }

    /// Loaded images in load order.
    pub fn images(&self) -> &[InputImage] {
        &self.images
    }

    pub fn is_selected(&self, key: &ImageKey) -> bool {
        self.selected.contains(key)
    }

    /// Flip the selection of a loaded image. Unknown keys are ignored.
    pub fn toggle(&mut self, key: &ImageKey) {
        if !self.selected.remove(key) && self.contains(key) {
            self.selected.insert(key.clone());
        }
    }

    pub fn select(&mut self, key: &ImageKey) {
        if self.contains(key) {
            self.selected.insert(key.clone());
        }
    }

    pub fn deselect(&mut self, key: &ImageKey) {
        self.selected.remove(key);
    }

    /// Unload an image, dropping it from the selection too. Results of
    /// earlier runs are kept.
    pub fn remove(&mut self, key: &ImageKey) -> bool {
        let before = self.images.len();
        self.images.retain(|img| img.key() != *key);
        self.selected.remove(key);
        self.images.len() != before
    }

    /// Unload everything and forget the last run.
    pub fn clear(&mut self) {
        self.images.clear();
        self.selected.clear();
        self.last_run = BatchOutcome::default();
    }

    /// Snapshot of the selected images, in load order.
    pub fn selected_images(&self) -> Vec<InputImage> {
        self.images
            .iter()
            .filter(|img| self.selected.contains(&img.key()))
            .cloned()
            .collect()
    }

    /// Convert the current selection, replacing the previous results.
    pub fn convert_selected(
        &mut self,
        codec: &impl ImageCodec,
        request: ConversionRequest,
        progress: Option<Sender<ProgressEvent>>,
    ) -> &BatchOutcome {
        let snapshot = self.selected_images();
        self.last_run = convert::convert_all(codec, &snapshot, request, progress);
        &self.last_run
    }

    /// Successful results of the last run, in input order.
    pub fn results(&self) -> &[ConvertedImage] {
        &self.last_run.converted
    }

    pub fn last_run(&self) -> &BatchOutcome {
        &self.last_run
    }

    /// Zip of the last run's results.
    pub fn pack_results_archive(&self) -> Result<Vec<u8>, PackagingError> {
        package::pack_archive(self.results())
    }

    /// PDF of the selected originals, one per page.
    pub fn pack_selected_document(
        &self,
        codec: &impl ImageCodec,
        progress: Option<Sender<ProgressEvent>>,
    ) -> Result<Vec<u8>, PackagingError> {
        package::pack_document(codec, &self.selected_images(), progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockCodec, RecordedOp};
    use crate::imaging::{OutputFormat, Quality};

    fn file(name: &str) -> InputImage {
        InputImage::from_bytes(name, name.as_bytes().to_vec(), 1_000)
    }

    fn limits(max_files: usize) -> InputConfig {
        InputConfig {
            max_files,
            ..InputConfig::default()
        }
    }

    fn loaded(names: &[&str]) -> Session {
        let mut session = Session::new();
        session.add_drop(names.iter().map(|n| file(n)).collect(), &limits(100));
        session
    }

    fn names(images: &[InputImage]) -> Vec<&str> {
        images.iter().map(|i| i.name()).collect()
    }

    fn request() -> ConversionRequest {
        ConversionRequest::new(OutputFormat::Png, Quality::default())
    }

    // =========================================================================
    // Drops
    // =========================================================================

    #[test]
    fn drop_adds_and_selects_in_order() {
        let session = loaded(&["b.png", "a.jpg", "c.gif"]);
        assert_eq!(names(session.images()), vec!["b.png", "a.jpg", "c.gif"]);
        assert_eq!(names(&session.selected_images()), vec!["b.png", "a.jpg", "c.gif"]);
    }

    #[test]
    fn drop_discards_unaccepted_types() {
        let mut session = Session::new();
        let report = session.add_drop(
            vec![file("a.png"), file("notes.txt"), file("scan.tiff"), file("noext")],
            &limits(10),
        );
        assert_eq!(report.added.len(), 1);
        assert_eq!(report.rejected_type, vec!["notes.txt", "scan.tiff", "noext"]);
        assert_eq!(names(session.images()), vec!["a.png"]);
    }

    #[test]
    fn drop_honours_configured_types() {
        let mut session = Session::new();
        let only_png = InputConfig {
            accepted_types: vec!["image/png".into()],
            max_files: 10,
        };
        let report = session.add_drop(vec![file("a.png"), file("b.jpg")], &only_png);
        assert_eq!(report.rejected_type, vec!["b.jpg"]);
    }

    #[test]
    fn drop_is_capped_after_filtering() {
        let mut session = Session::new();
        let report = session.add_drop(
            vec![file("x.txt"), file("1.png"), file("2.png"), file("3.png")],
            &limits(2),
        );
        assert_eq!(names(session.images()), vec!["1.png", "2.png"]);
        assert_eq!(report.over_limit, vec!["3.png"]);
        assert_eq!(report.discarded(), 2);
    }

    #[test]
    fn limit_applies_per_drop() {
        let mut session = Session::new();
        session.add_drop(vec![file("1.png"), file("2.png")], &limits(2));
        session.add_drop(vec![file("3.png"), file("4.png")], &limits(2));
        assert_eq!(session.images().len(), 4);
    }

    #[test]
    fn duplicate_keys_are_ignored() {
        let mut session = loaded(&["a.png"]);
        let report = session.add_drop(vec![file("a.png"), file("b.png")], &limits(10));
        assert_eq!(report.duplicates, vec!["a.png"]);
        assert_eq!(names(session.images()), vec!["a.png", "b.png"]);
    }

    #[test]
    fn same_name_different_mtime_is_a_new_image() {
        let mut session = loaded(&["a.png"]);
        let newer = InputImage::from_bytes("a.png", b"a.png".to_vec(), 2_000);
        let report = session.add_drop(vec![newer], &limits(10));
        assert_eq!(report.added.len(), 1);
        assert_eq!(session.images().len(), 2);
    }

    #[test]
    fn redropping_a_deselected_image_keeps_it_deselected() {
        let mut session = loaded(&["a.png"]);
        let key = file("a.png").key();
        session.deselect(&key);
        session.add_drop(vec![file("a.png")], &limits(10));
        assert!(!session.is_selected(&key));
    }

    // =========================================================================
    // Selection
    // =========================================================================

    #[test]
    fn toggle_flips_selection() {
        let mut session = loaded(&["a.png", "b.png"]);
        let a = file("a.png").key();

        session.toggle(&a);
        assert!(!session.is_selected(&a));
        assert_eq!(names(&session.selected_images()), vec!["b.png"]);

        session.toggle(&a);
        assert!(session.is_selected(&a));
        assert_eq!(names(&session.selected_images()), vec!["a.png", "b.png"]);
    }

    #[test]
    fn unknown_keys_cannot_be_selected() {
        let mut session = loaded(&["a.png"]);
        let ghost = file("ghost.png").key();
        session.toggle(&ghost);
        session.select(&ghost);
        assert!(!session.is_selected(&ghost));
    }

    #[test]
    fn remove_unloads_and_deselects() {
        let mut session = loaded(&["a.png", "b.png"]);
        let a = file("a.png").key();

        assert!(session.remove(&a));
        assert!(!session.contains(&a));
        assert!(!session.is_selected(&a));
        assert!(!session.remove(&a));

        // Re-adding after removal selects again
        session.add_drop(vec![file("a.png")], &limits(10));
        assert!(session.is_selected(&a));
    }

    #[test]
    fn clear_forgets_everything() {
        let codec = MockCodec::new();
        let mut session = loaded(&["a.png"]);
        session.convert_selected(&codec, request(), None);
        assert_eq!(session.results().len(), 1);

        session.clear();
        assert!(session.images().is_empty());
        assert!(session.selected_images().is_empty());
        assert!(session.results().is_empty());
    }

    // =========================================================================
    // Runs
    // =========================================================================

    #[test]
    fn convert_selected_only_converts_selection() {
        let codec = MockCodec::new();
        let mut session = loaded(&["a.png", "b.jpg", "c.gif"]);
        session.toggle(&file("b.jpg").key());

        let outcome = session.convert_selected(&codec, request(), None);
        let filenames: Vec<_> = outcome.converted.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(filenames, vec!["a.png", "c.png"]);
        assert_eq!(codec.encode_ops().len(), 2);
    }

    #[test]
    fn each_run_replaces_previous_results() {
        let codec = MockCodec::new();
        let mut session = loaded(&["a.png", "b.png"]);
        session.convert_selected(&codec, request(), None);
        assert_eq!(session.results().len(), 2);

        session.deselect(&file("a.png").key());
        session.convert_selected(&codec, request(), None);
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].original.name(), "b.png");
    }

    #[test]
    fn results_reference_loaded_inputs() {
        let codec = MockCodec::new();
        let mut session = loaded(&["a.png", "b.png"]);
        session.convert_selected(&codec, request(), None);
        for result in session.results() {
            assert!(session.contains(&result.original.key()));
        }
    }

    #[test]
    fn empty_selection_converts_nothing() {
        let codec = MockCodec::new();
        let mut session = loaded(&["a.png"]);
        session.deselect(&file("a.png").key());

        let outcome = session.convert_selected(&codec, request(), None);
        assert!(outcome.converted.is_empty());
        assert!(codec.get_operations().is_empty());
    }

    #[test]
    fn failed_items_are_reported_in_last_run() {
        let codec = MockCodec::failing_on([b"b.png"]);
        let mut session = loaded(&["a.png", "b.png"]);
        session.convert_selected(&codec, request(), None);

        assert_eq!(session.results().len(), 1);
        assert_eq!(session.last_run().failures.len(), 1);
        assert_eq!(session.last_run().failures[0].original.name(), "b.png");
    }

    #[test]
    fn document_uses_selected_originals() {
        let codec = MockCodec::new();
        let mut session = loaded(&["a.png", "b.png", "c.png"]);
        session.deselect(&file("b.png").key());

        session.pack_selected_document(&codec, None).unwrap();
        let decodes: Vec<_> = codec
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Decode(_)))
            .collect();
        assert_eq!(decodes.len(), 2);
    }

    #[test]
    fn document_of_empty_selection_is_rejected() {
        let codec = MockCodec::new();
        let session = Session::new();
        assert!(matches!(
            session.pack_selected_document(&codec, None),
            Err(PackagingError::Empty)
        ));
    }

    #[test]
    fn archive_contains_last_results() {
        let codec = MockCodec::new();
        let mut session = loaded(&["a.png", "b.png"]);
        session.convert_selected(&codec, request(), None);
        let zip = session.pack_results_archive().unwrap();
        assert!(!zip.is_empty());
    }
}
