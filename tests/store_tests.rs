//! Integration tests for the JSON task store.
//!
//! These tests exercise load/save against a temporary directory and the
//! task mutations the web handlers perform.

use task_portfolio::error::ErrorCode;
use task_portfolio::store::tasks::TaskForm;
use task_portfolio::store::{TaskStore, seed_document, sibling_path};
use task_portfolio::types::{Category, StepImage};
use tempfile::TempDir;

fn temp_store() -> (TempDir, TaskStore) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = TaskStore::load(temp.path().join("nested").join("data.json"));
    (temp, store)
}

fn form(title: &str, category: &str, workshop: &str, process: &str) -> TaskForm {
    TaskForm {
        title: Some(title.to_string()),
        category: Some(category.to_string()),
        workshop: Some(workshop.to_string()),
        process: Some(process.to_string()),
        ..Default::default()
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn save_then_reload_yields_identical_document() {
        let (_temp, mut store) = temp_store();
        let task = store.find_task_mut(1, 101).unwrap();
        task.step_images.push(StepImage::new(
            2,
            "task_101_step_2_0_shot.png",
            "/media/task_step_images/task_101_step_2_0_shot.png".into(),
            "截图".into(),
        ));
        task.images
            .insert("task_101_img_a.png".into(), "media/task_images/task_101_img_a.png".into());

        assert!(store.save());

        let reloaded = TaskStore::load(store.path());
        assert_eq!(reloaded.document(), store.document());
        let ids: Vec<i64> = reloaded.all_tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![101, 102, 103, 104]);
    }

    #[test]
    fn saved_json_keeps_chinese_text_unescaped() {
        let (_temp, store) = temp_store();
        store.try_save().unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("数据平台建设"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn counter_is_repaired_from_existing_ids() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        let mut doc = seed_document();
        doc.next_task_id = 3;
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

        let mut store = TaskStore::load(&path);
        assert_eq!(store.next_task_id(), 105);
        assert_eq!(store.next_task_id(), 106);
    }

    #[test]
    fn hand_edited_document_survives_load_and_save() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        let raw = r#"{
            "projects": [{
                "id": 7,
                "name": "Mine",
                "tasks": [
                    {"id": 1, "title": "a", "category": "R&D", "workshop": 1},
                    {"id": 2, "title": "b", "category": "Design", "workshop": "2",
                     "step_images": [{"step": "2", "file_name": "x.png", "url": "/media/x.png"}]}
                ]
            }],
            "next_task_id": 3
        }"#;
        std::fs::write(&path, raw).unwrap();

        let mut store = TaskStore::load(&path);
        assert_ne!(store.document(), &seed_document());
        let task = store.find_task(7, 2).unwrap();
        assert_eq!(task.category, Category::Other("Design".into()));
        assert_eq!(task.workshop, 2);
        assert_eq!(task.step_images[0].step, 2);

        store.next_task_id();
        store.try_save().unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["projects"][0]["id"], 7);
        assert_eq!(saved["projects"][0]["tasks"][1]["category"], "Design");
        assert_eq!(saved["projects"][0]["tasks"][1]["step_images"][0]["step"], 2);
    }

    #[test]
    fn malformed_document_is_kept_aside_before_seed_is_saved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        let raw = r#"{"projects": [{"id": 7, "name": "Mine", "tasks": [{"id": 1}]}]}"#;
        std::fs::write(&path, raw).unwrap();

        let store = TaskStore::load(&path);
        assert_eq!(store.document(), &seed_document());
        store.try_save().unwrap();

        let backup = sibling_path(&path, ".corrupt");
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), raw);
        assert!(std::fs::read_to_string(&path).unwrap().contains("数据平台建设"));
    }
}

mod mutation_tests {
    use super::*;

    #[test]
    fn created_task_survives_reload() {
        let (_temp, mut store) = temp_store();
        let new_task = form("接口压测", "UAT", "3", "准备脚本\n\n执行压测\n").to_new_task().unwrap();
        let id = store.create_task(2, new_task).unwrap();
        store.try_save().unwrap();

        let reloaded = TaskStore::load(store.path());
        let task = reloaded.find_task(2, id).unwrap();
        assert_eq!(task.category, Category::Uat);
        assert_eq!(task.workshop, 3);
        assert_eq!(task.progress, 0);
        let titles: Vec<&str> = task.process.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["准备脚本", "执行压测"]);
    }

    #[test]
    fn deleting_every_task_keeps_the_project() {
        let (_temp, mut store) = temp_store();
        store.delete_task(1, 101).unwrap();
        store.delete_task(1, 102).unwrap();

        let project = store.find_project(1).unwrap();
        assert!(project.tasks.is_empty());
        assert_eq!(store.projects().len(), 2);
    }

    #[test]
    fn deleting_unknown_task_is_not_found() {
        let (_temp, mut store) = temp_store();
        let err = store.delete_task(2, 101).unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskNotFound);
    }

    #[test]
    fn content_update_keeps_steps_beyond_the_text() {
        let (_temp, mut store) = temp_store();
        let count = store.update_process_content(1, 102, "only the first").unwrap();
        assert_eq!(count, 3);

        let task = store.find_task(1, 102).unwrap();
        assert_eq!(task.process[0].content, "only the first");
        assert!(!task.process[2].title.is_empty());
    }

    #[test]
    fn missing_title_is_rejected_before_any_change() {
        let (_temp, mut store) = temp_store();
        let before = store.document().clone();
        let err = form("", "R&D", "1", "").to_new_task().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(store.document(), &before);
        assert_eq!(store.next_task_id(), 105);
    }
}
