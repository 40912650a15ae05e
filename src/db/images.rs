//! Image record storage operations.

use super::{Database, now_ms};
use crate::types::{ImageRecord, Project};
use anyhow::Result;
use rusqlite::params;
use tracing::warn;

/// Relative path prefix of step images inside the media root.
pub const STEP_IMAGES_PREFIX: &str = "task_step_images/";

/// Secondary image index consumed by the reconciler.
///
/// Implementations are best-effort mirrors: callers log failures and carry on.
pub trait ImageIndex {
    /// Insert a record and return its generated id.
    fn insert_image(&self, task_id: i64, image: &str, description: Option<&str>) -> Result<i64>;

    /// Delete the task's records whose stored path contains `file_name`.
    /// An empty `file_name` deletes nothing.
    fn delete_images_matching(&self, task_id: i64, file_name: &str) -> Result<usize>;

    /// Records of a task, newest first.
    fn list_images(&self, task_id: i64) -> Result<Vec<ImageRecord>>;
}

impl ImageIndex for Database {
    fn insert_image(&self, task_id: i64, image: &str, description: Option<&str>) -> Result<i64> {
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO task_images (task_id, image, description, uploaded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![task_id, image, description, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn delete_images_matching(&self, task_id: i64, file_name: &str) -> Result<usize> {
        // instr(image, '') is 1 for every row
        if file_name.is_empty() {
            warn!(task_id, "Refusing to delete image rows for an empty file name");
            return Ok(0);
        }
        self.with_conn(|conn| {
            // instr() rather than LIKE: stored names are full of '_' wildcards
            let deleted = conn.execute(
                "DELETE FROM task_images WHERE task_id = ?1 AND instr(image, ?2) > 0",
                params![task_id, file_name],
            )?;
            Ok(deleted)
        })
    }

    fn list_images(&self, task_id: i64) -> Result<Vec<ImageRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, task_id, image, description, uploaded_at
                 FROM task_images WHERE task_id = ?1
                 ORDER BY uploaded_at DESC, id DESC",
            )?;

            let images = stmt
                .query_map(params![task_id], Self::map_image_record)?
                .filter_map(|r| r.ok())
                .collect();

            Ok(images)
        })
    }
}

impl Database {
    fn map_image_record(row: &rusqlite::Row) -> rusqlite::Result<ImageRecord> {
        Ok(ImageRecord {
            id: row.get(0)?,
            task_id: row.get(1)?,
            image: row.get(2)?,
            description: row.get(3)?,
            uploaded_at: row.get(4)?,
        })
    }

    /// Count all image records (all tasks).
    pub fn count_images(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM task_images", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    /// Rebuild the step-image rows from the store.
    ///
    /// Drops every `task_step_images/` row, inserts one row per step image in
    /// store order, and writes the new ids back onto the images. Rows from the
    /// single-image upload path are left alone. Returns the number of rows
    /// inserted.
    pub fn rebuild_step_image_index(&self, projects: &mut [Project]) -> Result<usize> {
        let now = now_ms();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "DELETE FROM task_images WHERE substr(image, 1, ?1) = ?2",
                params![STEP_IMAGES_PREFIX.len() as i64, STEP_IMAGES_PREFIX],
            )?;

            let mut inserted = 0;
            for task in projects.iter_mut().flat_map(|p| p.tasks.iter_mut()) {
                let task_id = task.id;
                for image in task.step_images.iter_mut() {
                    let path = format!("{}{}", STEP_IMAGES_PREFIX, image.stored_name());
                    tx.execute(
                        "INSERT INTO task_images (task_id, image, description, uploaded_at)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![task_id, path, image.description, now],
                    )?;
                    image.id = Some(tx.last_insert_rowid());
                    inserted += 1;
                }
            }

            tx.commit()?;
            Ok(inserted)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, StepImage, Task};
    use std::collections::BTreeMap;

    fn setup_db() -> Database {
        Database::open_in_memory().expect("Failed to create in-memory database")
    }

    #[test]
    fn insert_then_list_newest_first() {
        let db = setup_db();
        let first = db.insert_image(5, "task_images/a.png", Some("first")).unwrap();
        let second = db.insert_image(5, "task_images/b.png", None).unwrap();
        db.insert_image(6, "task_images/c.png", None).unwrap();

        let images = db.list_images(5).unwrap();
        assert_eq!(images.len(), 2);
        // Same millisecond is possible; id breaks the tie.
        assert_eq!(images[0].id, second);
        assert_eq!(images[1].id, first);
        assert_eq!(images[1].description.as_deref(), Some("first"));
    }

    #[test]
    fn delete_matching_is_scoped_to_task_and_substring() {
        let db = setup_db();
        db.insert_image(1, "task_step_images/task_1_step_2_0_photo.png", None)
            .unwrap();
        db.insert_image(1, "task_step_images/task_1_step_2_1_other.png", None)
            .unwrap();
        db.insert_image(2, "task_step_images/task_1_step_2_0_photo.png", None)
            .unwrap();

        let deleted = db.delete_images_matching(1, "photo.png").unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(db.list_images(1).unwrap().len(), 1);
        assert_eq!(db.list_images(2).unwrap().len(), 1);
    }

    #[test]
    fn empty_file_name_deletes_nothing() {
        let db = setup_db();
        db.insert_image(1, "task_step_images/a.png", None).unwrap();
        db.insert_image(1, "task_images/task_1_img_b.png", None).unwrap();

        assert_eq!(db.delete_images_matching(1, "").unwrap(), 0);
        assert_eq!(db.list_images(1).unwrap().len(), 2);
    }

    #[test]
    fn underscores_are_not_wildcards() {
        let db = setup_db();
        db.insert_image(1, "task_step_images/aXb.png", None).unwrap();
        assert_eq!(db.delete_images_matching(1, "a_b.png").unwrap(), 0);
    }

    #[test]
    fn rebuild_replaces_step_rows_and_assigns_ids() {
        let db = setup_db();
        db.insert_image(10, "task_step_images/stale.png", None).unwrap();
        db.insert_image(10, "task_images/task_10_20240101_000000.png", None)
            .unwrap();

        let mut projects = vec![Project {
            id: 1,
            name: "p".into(),
            description: String::new(),
            tasks: vec![Task {
                id: 10,
                project_id: 1,
                title: "t".into(),
                category: Category::Uat,
                workshop: 1,
                description: String::new(),
                pain_points: String::new(),
                process: vec![],
                results: String::new(),
                progress: 0,
                step_images: vec![StepImage::new(
                    1,
                    "fresh.png",
                    "/media/task_step_images/fresh.png".into(),
                    "d".into(),
                )],
                images: BTreeMap::new(),
            }],
        }];

        let inserted = db.rebuild_step_image_index(&mut projects).unwrap();
        assert_eq!(inserted, 1);

        let rows = db.list_images(10).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.image.contains("stale")));
        let fresh = rows.iter().find(|r| r.image.ends_with("fresh.png")).unwrap();
        assert_eq!(projects[0].tasks[0].step_images[0].id, Some(fresh.id));
    }
}
