//! Deletion half of the reconciler.

use crate::db::images::ImageIndex;
use crate::media::MediaLayout;
use crate::types::{StepImage, Task};
use serde::Serialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use tracing::{debug, info, warn};

/// Outcome of applying a batch of deletion keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub deleted_count: usize,
    pub failed_to_delete: usize,
    pub remaining_count: usize,
}

/// Deletion keys plus the candidate names derived from them.
#[derive(Debug, Clone)]
pub struct DeletionMatcher<'a> {
    keys: &'a [String],
    candidates: HashSet<&'a str>,
}

impl<'a> DeletionMatcher<'a> {
    /// Build the candidate set.
    ///
    /// Every raw key is a candidate. A key with at least one `_` also
    /// contributes the text after its first `_`, when that text contains `.`.
    pub fn new(keys: &'a [String]) -> Self {
        let mut candidates = HashSet::new();
        for key in keys {
            if let Some((_, rest)) = key.split_once('_')
                && rest.contains('.')
            {
                candidates.insert(rest);
            }
            candidates.insert(key.as_str());
        }
        Self { keys, candidates }
    }

    /// Whether `image` is selected for deletion.
    ///
    /// Exact tier: the stored name or `<step>_<name>` is a candidate.
    /// Fuzzy tier: the stored name and some raw key contain one another.
    /// The fuzzy tier over-matches (an empty name matches every key, a short
    /// key matches every name containing it); callers rely on that.
    pub fn should_delete(&self, image: &StepImage) -> bool {
        let name = image.stored_name();
        if self.candidates.contains(name) || self.candidates.contains(image.identity().as_str()) {
            return true;
        }
        self.keys
            .iter()
            .any(|key| key.contains(name) || name.contains(key.as_str()))
    }
}

/// Remove the images selected by `keys` from `task`, their files from disk
/// and their rows from the index.
///
/// A file already missing from disk is not a failure; any other removal
/// error is counted but the image still leaves the list and its index rows
/// are still dropped. Index failures are logged only.
pub fn apply_deletions(
    task: &mut Task,
    keys: &[String],
    media: &MediaLayout,
    index: &dyn ImageIndex,
) -> DeletionReport {
    if keys.is_empty() {
        return DeletionReport {
            remaining_count: task.step_images.len(),
            ..Default::default()
        };
    }

    let matcher = DeletionMatcher::new(keys);
    let dir = media.step_images_dir();
    let mut report = DeletionReport::default();
    let mut removed_names = Vec::new();

    let (doomed, kept): (Vec<StepImage>, Vec<StepImage>) = task
        .step_images
        .drain(..)
        .partition(|img| matcher.should_delete(img));
    task.step_images = kept;

    for image in doomed {
        let name = image.stored_name().to_string();
        report.deleted_count += 1;

        let path = dir.join(&name);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Removed step image file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Step image file already gone")
            }
            Err(e) => {
                report.failed_to_delete += 1;
                warn!(path = %path.display(), error = %e, "Failed to remove step image file");
            }
        }
        removed_names.push(name);
    }

    for name in &removed_names {
        if let Err(e) = index.delete_images_matching(task.id, name) {
            warn!(task_id = task.id, file_name = %name, error = %e, "Failed to drop image index rows");
        }
    }

    report.remaining_count = task.step_images.len();
    info!(
        task_id = task.id,
        deleted = report.deleted_count,
        failed = report.failed_to_delete,
        remaining = report.remaining_count,
        "Applied image deletions"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(step: i64, name: &str) -> StepImage {
        StepImage::new(step, name, format!("/media/task_step_images/{}", name), String::new())
    }

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identity_key_matches_exactly() {
        let k = keys(&["2_photo.png"]);
        let matcher = DeletionMatcher::new(&k);
        assert!(matcher.should_delete(&image(2, "photo.png")));
    }

    #[test]
    fn suffix_after_first_underscore_is_a_candidate() {
        let k = keys(&["9_task_1_step_2_0_a.png"]);
        let matcher = DeletionMatcher::new(&k);
        assert!(matcher.should_delete(&image(2, "task_1_step_2_0_a.png")));
    }

    #[test]
    fn fuzzy_tier_matches_substrings_both_ways() {
        let k = keys(&["step2photo.png"]);
        let matcher = DeletionMatcher::new(&k);
        assert!(matcher.should_delete(&image(2, "photo.png")));

        let k = keys(&["photo"]);
        let matcher = DeletionMatcher::new(&k);
        assert!(matcher.should_delete(&image(1, "task_5_step_1_0_photo.png")));
        assert!(!matcher.should_delete(&image(1, "diagram.png")));
    }

    #[test]
    fn nameless_image_matches_any_key() {
        let k = keys(&["anything"]);
        let matcher = DeletionMatcher::new(&k);
        let legacy: StepImage = serde_json::from_str(r#"{"step": 1}"#).unwrap();
        assert!(matcher.should_delete(&legacy));
    }
}
