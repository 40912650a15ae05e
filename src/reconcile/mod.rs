//! Step image reconciliation.
//!
//! A task's step images live in two places: embedded in the task document
//! and mirrored as rows of the image index. A reconcile pass applies a batch
//! of deletion keys first, then an upload batch, against both.

pub mod delete;
pub mod upload;

use crate::db::images::ImageIndex;
use crate::form::FormData;
use crate::media::MediaLayout;
use crate::types::Task;
use serde::Serialize;

pub use delete::{DeletionMatcher, DeletionReport, apply_deletions};
pub use upload::{
    SingleUpload, UploadReport, apply_uploads, edit_image_name, step_image_name,
    store_single_image,
};

/// Form field carrying deletion keys (repeated).
pub const DELETE_FIELD: &str = "delete_step_image[]";

/// Combined outcome of a reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub success: bool,
    #[serde(flatten)]
    pub deletion: DeletionReport,
    #[serde(flatten)]
    pub upload: UploadReport,
    pub total_processed: usize,
}

/// Apply the deletions and uploads carried by `form` to `task`.
pub fn reconcile_task_images(
    task: &mut Task,
    form: &FormData,
    media: &MediaLayout,
    index: &dyn ImageIndex,
) -> ReconcileReport {
    let keys: Vec<String> = form
        .get_all(DELETE_FIELD)
        .into_iter()
        .map(str::to_string)
        .collect();

    let deletion = apply_deletions(task, &keys, media, index);
    let upload = apply_uploads(task, form, media, index);
    let total_processed = deletion.deleted_count + upload.uploaded_count;

    ReconcileReport {
        success: true,
        deletion,
        upload,
        total_processed,
    }
}
