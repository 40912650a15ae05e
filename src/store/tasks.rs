//! Task CRUD on the store.
//!
//! Mutators only touch memory; callers persist with [`TaskStore::try_save`]
//! inside the same `write` closure.

use super::TaskStore;
use super::process::{parse_new_steps, retitle_steps, rewrite_step_contents};
use crate::error::{AppError, AppResult};
use crate::media::TASK_IMAGES_DIR;
use crate::types::{Category, NewTask, Project, Task, TaskEdit};
use std::collections::BTreeMap;
use tracing::info;

/// Raw add/edit form fields, as submitted.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub workshop: Option<String>,
    pub description: Option<String>,
    pub pain_points: Option<String>,
    pub process: Option<String>,
    pub results: Option<String>,
    pub progress: Option<String>,
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_string()
}

fn parse_int(field: &str, value: &Option<String>, default: Option<i64>) -> AppResult<i64> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse()
            .map_err(|_| AppError::invalid_value(field, &format!("{} must be an integer", field))),
        None => default.ok_or_else(|| AppError::missing_field(field)),
    }
}

fn parse_category(value: &Option<String>) -> AppResult<Category> {
    let raw = trimmed(value);
    if raw.is_empty() {
        return Err(AppError::missing_field("category"));
    }
    raw.parse()
        .map_err(|e: String| AppError::invalid_value("category", &e))
}

/// Edits may resubmit a key that only exists in the stored document.
fn parse_edited_category(value: &Option<String>) -> AppResult<Category> {
    let raw = trimmed(value);
    if raw.is_empty() {
        return Err(AppError::missing_field("category"));
    }
    Ok(Category::from_key(&raw))
}

impl TaskForm {
    /// Project id chosen in the form, overriding the one in the URL.
    pub fn target_project(&self, url_project_id: i64) -> AppResult<i64> {
        parse_int("project_id", &self.project_id, Some(url_project_id))
    }

    /// Validate the fields of the create form.
    pub fn to_new_task(&self) -> AppResult<NewTask> {
        let title = trimmed(&self.title);
        if title.is_empty() {
            return Err(AppError::missing_field("title"));
        }
        Ok(NewTask {
            title,
            category: parse_category(&self.category)?,
            workshop: parse_int("workshop", &self.workshop, None)?,
            description: trimmed(&self.description),
            pain_points: trimmed(&self.pain_points),
            process: trimmed(&self.process),
            results: trimmed(&self.results),
            progress: parse_int("progress", &self.progress, Some(0))?,
        })
    }

    /// Validate the fields of the edit form.
    pub fn to_task_edit(&self) -> AppResult<TaskEdit> {
        let title = trimmed(&self.title);
        if title.is_empty() {
            return Err(AppError::missing_field("title"));
        }
        Ok(TaskEdit {
            title,
            category: parse_edited_category(&self.category)?,
            workshop: parse_int("workshop", &self.workshop, Some(1))?,
            progress: parse_int("progress", &self.progress, Some(0))?,
            description: trimmed(&self.description),
            pain_points: trimmed(&self.pain_points),
            process: trimmed(&self.process),
        })
    }

    /// Form prefilled from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let process = task
            .process
            .iter()
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            project_id: Some(task.project_id.to_string()),
            title: Some(task.title.clone()),
            category: Some(task.category.as_str().to_string()),
            workshop: Some(task.workshop.to_string()),
            description: Some(task.description.clone()),
            pain_points: Some(task.pain_points.clone()),
            process: Some(process),
            results: Some(task.results.clone()),
            progress: Some(task.progress.to_string()),
        }
    }
}

impl TaskStore {
    /// Project by id, or `ProjectNotFound`.
    pub fn project(&self, project_id: i64) -> AppResult<&Project> {
        self.find_project(project_id)
            .ok_or_else(|| AppError::project_not_found(project_id))
    }

    /// Task by id within a project, or the matching not-found error.
    pub fn task(&self, project_id: i64, task_id: i64) -> AppResult<&Task> {
        self.project(project_id)?
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::task_not_found(task_id))
    }

    pub fn task_mut(&mut self, project_id: i64, task_id: i64) -> AppResult<&mut Task> {
        let project = self
            .find_project_mut(project_id)
            .ok_or_else(|| AppError::project_not_found(project_id))?;
        project
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::task_not_found(task_id))
    }

    /// Every task, in project order.
    pub fn all_tasks(&self) -> Vec<&Task> {
        self.projects().iter().flat_map(|p| p.tasks.iter()).collect()
    }

    /// Append a new task to a project and return its id.
    pub fn create_task(&mut self, project_id: i64, new: NewTask) -> AppResult<i64> {
        if self.find_project(project_id).is_none() {
            return Err(AppError::project_not_found(project_id));
        }
        let id = self.next_task_id();
        let task = Task {
            id,
            project_id,
            title: new.title,
            category: new.category,
            workshop: new.workshop,
            description: new.description,
            pain_points: new.pain_points,
            process: parse_new_steps(&new.process),
            results: new.results,
            progress: new.progress,
            step_images: Vec::new(),
            images: BTreeMap::new(),
        };
        if let Some(project) = self.find_project_mut(project_id) {
            project.tasks.push(task);
        }
        info!(project_id, task_id = id, "Created task");
        Ok(id)
    }

    /// Overwrite a task's editable fields.
    ///
    /// Blank lines in the process text are skipped; each remaining title
    /// keeps the content of the step that held its position before.
    pub fn edit_task(&mut self, project_id: i64, task_id: i64, edit: TaskEdit) -> AppResult<()> {
        let task = self.task_mut(project_id, task_id)?;
        task.title = edit.title;
        task.category = edit.category;
        task.workshop = edit.workshop;
        task.progress = edit.progress;
        task.description = edit.description;
        task.pain_points = edit.pain_points;

        let mut steps = parse_new_steps(&edit.process);
        for (step, old) in steps.iter_mut().zip(task.process.iter()) {
            step.content = old.content.clone();
        }
        task.process = steps;

        info!(project_id, task_id, "Edited task");
        Ok(())
    }

    /// Record a task-level image stored under `task_images/`.
    pub fn attach_task_image(
        &mut self,
        project_id: i64,
        task_id: i64,
        file_name: &str,
    ) -> AppResult<()> {
        let task = self.task_mut(project_id, task_id)?;
        task.images.insert(
            file_name.to_string(),
            format!("media/{}/{}", TASK_IMAGES_DIR, file_name),
        );
        Ok(())
    }

    /// Remove a task from its project, returning it. Image files stay on disk.
    pub fn delete_task(&mut self, project_id: i64, task_id: i64) -> AppResult<Task> {
        let project = self
            .find_project_mut(project_id)
            .ok_or_else(|| AppError::project_not_found(project_id))?;
        let pos = project
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| AppError::task_not_found(task_id))?;
        let removed = project.tasks.remove(pos);
        info!(project_id, task_id, "Deleted task");
        Ok(removed)
    }

    /// Replace step titles from multi-line text. Returns the new step count.
    pub fn update_process_titles(
        &mut self,
        project_id: i64,
        task_id: i64,
        raw: &str,
    ) -> AppResult<usize> {
        let task = self.task_mut(project_id, task_id)?;
        task.process = retitle_steps(&task.process, raw);
        Ok(task.process.len())
    }

    /// Replace step contents from multi-line text. Returns the new step count.
    pub fn update_process_content(
        &mut self,
        project_id: i64,
        task_id: i64,
        raw: &str,
    ) -> AppResult<usize> {
        let task = self.task_mut(project_id, task_id)?;
        task.process = rewrite_step_contents(&task.process, raw);
        Ok(task.process.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::store::seed_document;

    fn store() -> TaskStore {
        TaskStore::from_document("unused.json", seed_document())
    }

    fn form(title: &str, category: &str, workshop: &str) -> TaskForm {
        TaskForm {
            title: Some(title.into()),
            category: Some(category.into()),
            workshop: Some(workshop.into()),
            ..Default::default()
        }
    }

    #[test]
    fn create_assigns_counter_id_and_parses_steps() {
        let mut store = store();
        let expected = store.document().next_task_id;
        let mut f = form("  New task ", "UAT", "3");
        f.process = Some("one\n\n two \n".into());

        let id = store.create_task(1, f.to_new_task().unwrap()).unwrap();
        assert_eq!(id, expected);

        let task = store.task(1, id).unwrap();
        assert_eq!(task.title, "New task");
        assert_eq!(task.project_id, 1);
        assert_eq!(task.progress, 0);
        let titles: Vec<_> = task.process.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["one", "two"]);
    }

    #[test]
    fn create_requires_title_and_category() {
        let err = form(" ", "UAT", "1").to_new_task().unwrap_err();
        assert_eq!(err.field.as_deref(), Some("title"));

        let err = form("t", "", "1").to_new_task().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);

        let err = form("t", "Marketing", "1").to_new_task().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFieldValue);

        let err = form("t", "UAT", "two").to_new_task().unwrap_err();
        assert_eq!(err.field.as_deref(), Some("workshop"));
    }

    #[test]
    fn edit_keeps_a_stored_custom_category() {
        let edit = form("t", "Design", "2").to_task_edit().unwrap();
        assert_eq!(edit.category, Category::Other("Design".into()));

        let err = form("t", " ", "2").to_task_edit().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn create_in_unknown_project_is_not_found() {
        let mut store = store();
        let err = store
            .create_task(99, form("t", "UAT", "1").to_new_task().unwrap())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProjectNotFound);
    }

    #[test]
    fn edit_defaults_and_keeps_content_by_position() {
        let mut store = store();
        let mut f = form("Renamed", "Support", "");
        f.process = Some("first\n\nsecond\nthird".into());
        let edit = f.to_task_edit().unwrap();
        assert_eq!(edit.workshop, 1);
        assert_eq!(edit.progress, 0);

        store.edit_task(1, 101, edit).unwrap();
        let task = store.task(1, 101).unwrap();
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.category, Category::Support);
        assert_eq!(task.process.len(), 3);
        assert_eq!(task.process[0].content, "访谈业务方，整理现有采集脚本。");
        assert_eq!(task.process[1].title, "second");
        assert_eq!(task.process[2].content, "");
    }

    #[test]
    fn edit_with_blank_process_clears_steps() {
        let mut store = store();
        let edit = form("t", "UAT", "2").to_task_edit().unwrap();
        store.edit_task(1, 102, edit).unwrap();
        assert!(store.task(1, 102).unwrap().process.is_empty());
    }

    #[test]
    fn delete_leaves_project_in_place() {
        let mut store = store();
        store.delete_task(1, 101).unwrap();
        store.delete_task(1, 102).unwrap();

        let project = store.project(1).unwrap();
        assert!(project.tasks.is_empty());

        let err = store.delete_task(1, 101).unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskNotFound);
    }

    #[test]
    fn task_image_is_recorded_under_media_path() {
        let mut store = store();
        store
            .attach_task_image(2, 103, "task_103_img_shot.png")
            .unwrap();
        let task = store.task(2, 103).unwrap();
        assert_eq!(
            task.images.get("task_103_img_shot.png").map(String::as_str),
            Some("media/task_images/task_103_img_shot.png")
        );
    }

    #[test]
    fn form_round_trips_through_existing_task() {
        let store = store();
        let task = store.task(1, 101).unwrap();
        let edit = TaskForm::from_task(task).to_task_edit().unwrap();
        assert_eq!(edit.title, task.title);
        assert_eq!(edit.process, "现状调研\n方案设计");
    }
}
