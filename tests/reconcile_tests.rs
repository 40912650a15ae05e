//! Integration tests for step image reconciliation.
//!
//! Media lives in a temporary directory and the image index is an
//! in-memory SQLite database.

use task_portfolio::db::Database;
use task_portfolio::db::images::ImageIndex;
use task_portfolio::form::FormData;
use task_portfolio::media::MediaLayout;
use task_portfolio::reconcile::{DELETE_FIELD, reconcile_task_images, step_image_name};
use task_portfolio::store::seed_document;
use task_portfolio::types::{ImageRecord, StepImage, Task};
use tempfile::TempDir;

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn setup_media() -> (TempDir, MediaLayout) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let media = MediaLayout::new(temp.path(), "/media");
    media.ensure_dirs().expect("Failed to create media dirs");
    (temp, media)
}

fn seed_task() -> Task {
    let mut task = seed_document().projects[0].tasks[0].clone();
    task.step_images.clear();
    task
}

/// Index that rejects every write.
struct OfflineIndex;

impl ImageIndex for OfflineIndex {
    fn insert_image(&self, _task_id: i64, _image: &str, _description: Option<&str>) -> anyhow::Result<i64> {
        Err(anyhow::anyhow!("image index offline"))
    }

    fn delete_images_matching(&self, _task_id: i64, _file_name: &str) -> anyhow::Result<usize> {
        Err(anyhow::anyhow!("image index offline"))
    }

    fn list_images(&self, _task_id: i64) -> anyhow::Result<Vec<ImageRecord>> {
        Ok(Vec::new())
    }
}

/// Put an image on disk, in the task and in the index.
fn add_image(task: &mut Task, step: i64, name: &str, media: &MediaLayout, db: &Database) {
    std::fs::write(media.step_images_dir().join(name), b"img").unwrap();
    let mut image = StepImage::new(step, name, media.step_image_url(name), String::new());
    image.id = Some(
        db.insert_image(task.id, &format!("task_step_images/{}", name), None)
            .unwrap(),
    );
    task.step_images.push(image);
}

mod deletion_tests {
    use super::*;

    #[test]
    fn exact_key_removes_file_list_entry_and_index_row() {
        let (_temp, media) = setup_media();
        let db = setup_db();
        let mut task = seed_task();
        add_image(&mut task, 2, "photo.png", &media, &db);
        add_image(&mut task, 1, "keep.png", &media, &db);

        let form = FormData::new().with_field(DELETE_FIELD, "2_photo.png");
        let report = reconcile_task_images(&mut task, &form, &media, &db);

        assert_eq!(report.deletion.deleted_count, 1);
        assert_eq!(report.deletion.failed_to_delete, 0);
        assert_eq!(report.deletion.remaining_count, 1);
        assert_eq!(task.step_images[0].stored_name(), "keep.png");
        assert!(!media.step_images_dir().join("photo.png").exists());
        assert!(media.step_images_dir().join("keep.png").exists());

        let rows = db.list_images(task.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].image.ends_with("keep.png"));
    }

    #[test]
    fn fuzzy_key_also_matches() {
        let (_temp, media) = setup_media();
        let db = setup_db();
        let mut task = seed_task();
        add_image(&mut task, 2, "photo.png", &media, &db);

        let form = FormData::new().with_field(DELETE_FIELD, "step2photo.png");
        let report = reconcile_task_images(&mut task, &form, &media, &db);

        assert_eq!(report.deletion.deleted_count, 1);
        assert!(task.step_images.is_empty());
    }

    #[test]
    fn missing_file_is_not_a_failure() {
        let (_temp, media) = setup_media();
        let db = setup_db();
        let mut task = seed_task();
        add_image(&mut task, 1, "gone.png", &media, &db);
        std::fs::remove_file(media.step_images_dir().join("gone.png")).unwrap();

        let form = FormData::new().with_field(DELETE_FIELD, "1_gone.png");
        let report = reconcile_task_images(&mut task, &form, &media, &db);

        assert_eq!(report.deletion.deleted_count, 1);
        assert_eq!(report.deletion.failed_to_delete, 0);
        assert!(db.list_images(task.id).unwrap().is_empty());
    }

    #[test]
    fn undeletable_file_is_counted_but_entry_and_row_still_go() {
        let (_temp, media) = setup_media();
        let db = setup_db();
        let mut task = seed_task();
        add_image(&mut task, 1, "stuck.png", &media, &db);
        // A non-empty directory where the file should be cannot be removed as a file.
        let path = media.step_images_dir().join("stuck.png");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("inner"), b"x").unwrap();

        let form = FormData::new().with_field(DELETE_FIELD, "1_stuck.png");
        let report = reconcile_task_images(&mut task, &form, &media, &db);

        assert_eq!(report.deletion.deleted_count, 1);
        assert_eq!(report.deletion.failed_to_delete, 1);
        assert_eq!(report.deletion.remaining_count, 0);
        assert!(report.success);
        assert!(task.step_images.is_empty());
        assert!(db.list_images(task.id).unwrap().is_empty());
    }

    #[test]
    fn index_failure_does_not_block_deletion() {
        let (_temp, media) = setup_media();
        let db = setup_db();
        let mut task = seed_task();
        add_image(&mut task, 2, "photo.png", &media, &db);

        let form = FormData::new().with_field(DELETE_FIELD, "2_photo.png");
        let report = reconcile_task_images(&mut task, &form, &media, &OfflineIndex);

        assert_eq!(report.deletion.deleted_count, 1);
        assert_eq!(report.deletion.failed_to_delete, 0);
        assert!(task.step_images.is_empty());
        assert!(!media.step_images_dir().join("photo.png").exists());
    }
}

mod upload_tests {
    use super::*;

    #[test]
    fn step_with_two_images_accepts_one_of_five() {
        let (_temp, media) = setup_media();
        let db = setup_db();
        let mut task = seed_task();
        add_image(&mut task, 1, "a.png", &media, &db);
        add_image(&mut task, 1, "b.png", &media, &db);

        let mut form = FormData::new();
        for i in 0..5 {
            form = form.with_file(&format!("step_image_1_{}", i), &format!("new {}.PNG", i), b"x");
        }
        let report = reconcile_task_images(&mut task, &form, &media, &db);

        assert_eq!(report.upload.uploaded_count, 1);
        assert_eq!(report.upload.final_image_count, 3);
        assert_eq!(report.upload.uploaded_steps, vec![1]);
        assert_eq!(task.images_for_step(1), 3);

        let stored = step_image_name(task.id, 1, 0, "new 0.PNG");
        assert_eq!(stored, format!("task_{}_step_1_0_new_0.png", task.id));
        assert!(media.step_images_dir().join(&stored).exists());
        assert_eq!(db.list_images(task.id).unwrap().len(), 3);
    }

    #[test]
    fn upload_to_empty_step_is_indexed() {
        let (_temp, media) = setup_media();
        let db = setup_db();
        let mut task = seed_task();

        let form = FormData::new()
            .with_file("step_image_3_0", "diagram.png", b"png")
            .with_field("step_description_3", "架构图");
        let report = reconcile_task_images(&mut task, &form, &media, &db);

        assert_eq!(report.upload.uploaded_count, 1);
        assert_eq!(report.total_processed, 1);

        let image = &task.step_images[0];
        assert_eq!(image.step, 3);
        assert!(image.stored_name().contains("_step_3_0_"));
        assert_eq!(image.description, "架构图");
        assert_eq!(image.url, media.step_image_url(image.stored_name()));

        let rows = db.list_images(task.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(image.id, Some(rows[0].id));
    }

    #[test]
    fn deletion_frees_a_slot_in_the_same_pass() {
        let (_temp, media) = setup_media();
        let db = setup_db();
        let mut task = seed_task();
        for name in ["a.png", "b.png", "c.png"] {
            add_image(&mut task, 2, name, &media, &db);
        }

        let form = FormData::new()
            .with_field(DELETE_FIELD, "2_a.png")
            .with_file("step_image_2_0", "d.png", b"d");
        let report = reconcile_task_images(&mut task, &form, &media, &db);

        assert_eq!(report.deletion.deleted_count, 1);
        assert_eq!(report.upload.uploaded_count, 1);
        assert_eq!(report.total_processed, 2);
        assert_eq!(task.images_for_step(2), 3);
    }

    #[test]
    fn index_failure_still_records_the_upload() {
        let (_temp, media) = setup_media();
        let mut task = seed_task();

        let form = FormData::new().with_file("step_image_1_0", "shot.png", b"png");
        let report = reconcile_task_images(&mut task, &form, &media, &OfflineIndex);

        assert!(report.success);
        assert_eq!(report.upload.uploaded_count, 1);
        assert_eq!(task.step_images.len(), 1);
        let image = &task.step_images[0];
        assert_eq!(image.id, None);
        assert!(media.step_images_dir().join(image.stored_name()).exists());
    }

    #[test]
    fn unwritable_step_images_dir_skips_the_upload() {
        let temp = TempDir::new().unwrap();
        let media = MediaLayout::new(temp.path(), "/media");
        let db = setup_db();
        let mut task = seed_task();
        // A regular file where the step image directory belongs.
        std::fs::write(media.step_images_dir(), b"not a dir").unwrap();

        let form = FormData::new().with_file("step_image_1_0", "shot.png", b"png");
        let report = reconcile_task_images(&mut task, &form, &media, &db);

        assert!(report.success);
        assert_eq!(report.upload.uploaded_count, 0);
        assert!(task.step_images.is_empty());
        assert!(db.list_images(task.id).unwrap().is_empty());
    }
}
