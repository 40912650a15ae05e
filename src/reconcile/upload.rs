//! Upload half of the reconciler, plus the single-image upload path.

use crate::db::images::ImageIndex;
use crate::error::{AppError, AppResult};
use crate::form::{FormData, UploadedFile};
use crate::media::{MediaLayout, STEP_IMAGES_DIR, TASK_IMAGES_DIR, client_basename, split_extension};
use crate::types::{MAX_IMAGES_PER_STEP, StepImage, Task};
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Field-name prefix of step image uploads: `step_image_<step>_<index>`.
pub const STEP_IMAGE_FIELD_PREFIX: &str = "step_image_";

/// Extensions accepted by the single-image upload path.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

/// Outcome of applying an upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub uploaded_count: usize,
    pub final_image_count: usize,
    /// Every step that had files in the batch, in first-seen order.
    pub uploaded_steps: Vec<i64>,
}

/// Step number encoded in an upload field name, if any.
pub fn step_of_field(field: &str) -> Option<i64> {
    if !field.starts_with(STEP_IMAGE_FIELD_PREFIX) {
        return None;
    }
    field.split('_').nth(2)?.parse().ok()
}

/// Group step uploads by step number, keeping first-seen step order.
/// Fields that look like step uploads but carry no integer step are dropped.
pub fn group_by_step<'a>(files: &[&'a UploadedFile]) -> Vec<(i64, Vec<&'a UploadedFile>)> {
    let mut groups: Vec<(i64, Vec<&UploadedFile>)> = Vec::new();
    for &file in files {
        if !file.field.starts_with(STEP_IMAGE_FIELD_PREFIX) {
            continue;
        }
        let Some(step) = step_of_field(&file.field) else {
            warn!(field = %file.field, "Ignoring upload with no step number");
            continue;
        };
        match groups.iter_mut().find(|(s, _)| *s == step) {
            Some((_, group)) => group.push(file),
            None => groups.push((step, vec![file])),
        }
    }
    groups
}

/// Stored name of a step image: `task_<id>_step_<step>_<i>_<base><ext>`.
///
/// Spaces in the base name become `_`; the extension is lower-cased.
pub fn step_image_name(task_id: i64, step: i64, position: usize, client_name: &str) -> String {
    let (base, ext) = split_extension(client_basename(client_name));
    format!(
        "task_{}_step_{}_{}_{}{}",
        task_id,
        step,
        position,
        base.replace(' ', "_"),
        ext.to_lowercase()
    )
}

fn step_description(form: &FormData, step: i64, position: usize) -> String {
    form.get(&format!("step_description_{}_{}", step, position))
        .filter(|d| !d.is_empty())
        .or_else(|| form.get(&format!("step_description_{}", step)))
        .unwrap_or("")
        .to_string()
}

/// Store the step images posted in `form` and append them to `task`.
///
/// Each step accepts at most enough files to reach three images, counted
/// against the task's current list; the rest of the batch is dropped.
/// Per-file failures are logged and skipped.
pub fn apply_uploads(
    task: &mut Task,
    form: &FormData,
    media: &MediaLayout,
    index: &dyn ImageIndex,
) -> UploadReport {
    let files = form.files();
    let groups = group_by_step(&files);
    let dir = media.step_images_dir();
    let mut report = UploadReport::default();

    for (step, batch) in groups {
        report.uploaded_steps.push(step);

        let existing = task.images_for_step(step);
        let remaining = MAX_IMAGES_PER_STEP.saturating_sub(existing);
        if batch.len() > remaining {
            warn!(
                task_id = task.id,
                step,
                existing,
                offered = batch.len(),
                accepted = remaining,
                "Step image limit reached; dropping extra files"
            );
        }

        for (position, file) in batch.into_iter().take(remaining).enumerate() {
            let name = step_image_name(task.id, step, position, &file.file_name);
            let path = dir.join(&name);

            let written = std::fs::create_dir_all(&dir).and_then(|()| std::fs::write(&path, &file.bytes));
            if let Err(e) = written {
                warn!(path = %path.display(), error = %e, "Failed to store step image");
                continue;
            }

            let description = step_description(form, step, position);
            let mut image = StepImage::new(step, &name, media.step_image_url(&name), description);

            let relative = format!("{}/{}", STEP_IMAGES_DIR, name);
            match index.insert_image(task.id, &relative, Some(image.description.as_str())) {
                Ok(id) => image.id = Some(id),
                Err(e) => warn!(task_id = task.id, file_name = %name, error = %e, "Failed to index step image"),
            }

            debug!(task_id = task.id, step, file_name = %name, "Stored step image");
            task.step_images.push(image);
            report.uploaded_count += 1;
        }
    }

    report.final_image_count = task.step_images.len();
    info!(
        task_id = task.id,
        uploaded = report.uploaded_count,
        total = report.final_image_count,
        "Applied image uploads"
    );
    report
}

/// Result of the single-image upload path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleUpload {
    pub image_id: i64,
    pub image_url: String,
    pub file_name: String,
}

/// Stored name of a single uploaded image: `task_<id>_<YYYYmmdd_HHMMSS>.<ext>`.
pub fn task_image_name(task_id: i64, client_name: &str, at: DateTime<Local>) -> String {
    let (_, ext) = split_extension(client_basename(client_name));
    format!(
        "task_{}_{}.{}",
        task_id,
        at.format("%Y%m%d_%H%M%S"),
        ext.trim_start_matches('.')
    )
}

/// Stored name of the image attached through the edit form.
pub fn edit_image_name(task_id: i64, client_name: &str) -> String {
    format!(
        "task_{}_img_{}",
        task_id,
        client_basename(client_name).replace(' ', "_")
    )
}

/// Store one task image under `task_images/` and index it.
pub fn store_single_image(
    task_id: i64,
    file: &UploadedFile,
    description: &str,
    media: &MediaLayout,
    index: &dyn ImageIndex,
) -> AppResult<SingleUpload> {
    let (_, ext) = split_extension(client_basename(&file.file_name));
    let ext = ext.to_lowercase();
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::invalid_value("image", "Unsupported file type"));
    }

    let name = task_image_name(task_id, &file.file_name, Local::now());
    let dir = media.task_images_dir();
    std::fs::create_dir_all(&dir).map_err(AppError::internal)?;
    std::fs::write(dir.join(&name), &file.bytes).map_err(AppError::internal)?;

    let relative = format!("{}/{}", TASK_IMAGES_DIR, name);
    let image_id = index
        .insert_image(task_id, &relative, Some(description))
        .map_err(AppError::database)?;

    info!(task_id, file_name = %name, image_id, "Stored task image");
    Ok(SingleUpload {
        image_id,
        image_url: media.url_for(&relative),
        file_name: name,
    })
}
