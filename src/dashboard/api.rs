//! JSON endpoints used by the task detail page.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use super::forms::Submitted;
use super::server::AppState;
use crate::db::images::ImageIndex;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::reconcile::{reconcile_task_images, store_single_image};
use crate::stats::workshop_stats;
use crate::types::{Task, workshop_text};

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Format an index timestamp (ms since epoch) in local time.
pub(super) fn format_uploaded_at(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Replace step titles from the `process` field.
pub async fn update_process(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(i64, i64)>,
    Submitted(form): Submitted,
) -> AppResult<Json<Value>> {
    let raw = form.get("process").unwrap_or("");
    let steps_count = state.store().write(|store| {
        let count = store.update_process_titles(project_id, task_id, raw)?;
        store.try_save().map_err(AppError::persistence)?;
        Ok::<_, AppError>(count)
    })?;

    info!(project_id, task_id, steps_count, "Updated process titles");
    Ok(Json(json!({
        "status": "success",
        "message": "实现过程更新成功",
        "steps_count": steps_count,
    })))
}

/// Replace step contents from `process_content`, then reconcile step images.
pub async fn update_process_content(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(i64, i64)>,
    Submitted(form): Submitted,
) -> AppResult<Json<Value>> {
    let raw = form.get("process_content").unwrap_or("");
    let media = state.media();
    let index: &dyn ImageIndex = state.db();

    let (steps_count, remaining_images, report) = state.store().write(|store| {
        let steps_count = store.update_process_content(project_id, task_id, raw)?;
        let task = store.task_mut(project_id, task_id)?;
        let report = reconcile_task_images(task, &form, media, index);
        let remaining_images = task.step_images.len();

        store.try_save().map_err(|e| {
            AppError::persistence(&e).with_details(format!(
                "{}; deleted {}, uploaded {}",
                e, report.deletion.deleted_count, report.upload.uploaded_count
            ))
        })?;
        Ok::<_, AppError>((steps_count, remaining_images, report))
    })?;

    Ok(Json(json!({
        "status": "success",
        "message": format!(
            "实现过程内容和图片更新成功，成功上传 {} 张图片",
            report.upload.uploaded_count
        ),
        "steps_count": steps_count,
        "remaining_images": remaining_images,
        "report": report,
    })))
}

/// Store a single task image from the `image` field.
pub async fn upload_image(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(i64, i64)>,
    Submitted(form): Submitted,
) -> AppResult<Json<Value>> {
    state
        .store()
        .read(|store| store.task(project_id, task_id).map(|_| ()))?;

    let file = form
        .file("image")
        .ok_or_else(|| AppError::missing_field("image"))?;
    let description = form.get("description").unwrap_or("");

    let upload = store_single_image(task_id, file, description, state.media(), state.db())?;
    Ok(Json(json!({
        "status": "success",
        "message": "图片上传成功",
        "image_url": upload.image_url,
        "image_id": upload.image_id,
        "file_name": upload.file_name,
    })))
}

/// Image index rows of a task, newest first.
pub async fn task_images(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    state
        .store()
        .read(|store| store.task(project_id, task_id).map(|_| ()))?;

    let records = state.db().list_images(task_id).map_err(AppError::database)?;
    let images: Vec<Value> = records
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "url": state.media().url_for(&r.image),
                "description": r.description.clone().unwrap_or_default(),
                "uploaded_at": format_uploaded_at(r.uploaded_at),
            })
        })
        .collect();

    Ok(Json(json!({
        "status": "success",
        "images": images,
    })))
}

/// Workshop table of the first project.
pub async fn project_workshop_stats(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let (name, tasks) = state.store().read(|store| {
        let Some(project) = store.projects().first() else {
            warn!("Workshop stats requested with no projects");
            return Err(AppError::new(ErrorCode::ProjectNotFound, "No projects found"));
        };
        Ok((project.name.clone(), project.tasks.clone()))
    })?;

    let refs: Vec<&Task> = tasks.iter().collect();
    let table: Map<String, Value> = workshop_stats(&refs)
        .into_iter()
        .map(|row| {
            (
                row.workshop.to_string(),
                json!({
                    "label": workshop_text(row.workshop),
                    "total_tasks": row.total_tasks,
                    "completed_tasks": row.completed_tasks,
                    "completion_rate": row.completion_rate,
                }),
            )
        })
        .collect();

    Ok(Json(json!({
        "status": "success",
        "project": name,
        "workshop_stats": table,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_time_uses_second_precision() {
        let formatted = format_uploaded_at(1_700_000_000_123);
        assert_eq!(formatted.len(), "2023-11-14 22:13:20".len());
        assert!(!formatted.contains('.'));
    }
}
