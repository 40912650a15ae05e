//! HTML page handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

use super::forms::{Submitted, task_form};
use super::render::{
    category_badge, error_banner, fill, html_escape, options, page, progress_bar,
    render_with_images,
};
use super::server::AppState;
use super::templates;
use crate::db::images::ImageIndex;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::media::{MediaLayout, client_basename};
use crate::reconcile::{DELETE_FIELD, edit_image_name};
use crate::stats::{StatsSummary, TaskFilter, group_by_project, workshop_stats};
use crate::store::tasks::TaskForm;
use crate::types::{
    Category, ImageRecord, MAX_IMAGES_PER_STEP, Project, StepImage, Task, WORKSHOP_RANGE,
    workshop_numeral, workshop_text,
};

/// Render a page result, mapping errors to an error page.
fn html_result(result: AppResult<String>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(e),
    }
}

/// Full error page with the error's status code.
pub fn error_page(err: AppError) -> Response {
    if !err.is_not_found() && !err.is_validation() {
        warn!(code = ?err.code, error = %err, "Request failed");
    }
    let body = fill(
        templates::ERROR_TEMPLATE,
        &[
            ("status", err.status().as_u16().to_string()),
            ("message", html_escape(&err.message)),
        ],
    );
    (err.status(), Html(page("出错了", &body))).into_response()
}

fn task_url(project_id: i64, task_id: i64) -> String {
    format!("/projects/{}/tasks/{}/", project_id, task_id)
}

fn task_card(project_id: i64, task: &Task) -> String {
    format!(
        r#"<a class="task-card" href="{url}">
  <div class="task-card-head">{badge}<span class="workshop">{workshop}</span></div>
  <h4>{title}</h4>
  {progress}
</a>"#,
        url = task_url(project_id, task.id),
        badge = category_badge(&task.category),
        workshop = workshop_text(task.workshop),
        title = html_escape(&task.title),
        progress = progress_bar(task.progress),
    )
}

fn task_cards<'a>(project_id: i64, tasks: impl IntoIterator<Item = &'a Task>) -> String {
    let cards: String = tasks.into_iter().map(|t| task_card(project_id, t)).collect();
    if cards.is_empty() {
        r#"<p class="empty">暂无任务</p>"#.to_string()
    } else {
        cards
    }
}

fn workshop_rows(tasks: &[&Task]) -> String {
    workshop_stats(tasks)
        .into_iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                workshop_text(row.workshop),
                row.total_tasks,
                row.completed_tasks,
                progress_bar(row.completion_rate)
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Home and projects
// ---------------------------------------------------------------------------

pub fn render_home(projects: &[Project], summary: &StatsSummary) -> String {
    let category_cards: String = Category::ALL
        .iter()
        .map(|c| {
            format!(
                r#"<div class="stat-card">{}<strong>{}</strong><span>{}</span></div>"#,
                category_badge(c),
                summary.by_category.get(c.as_str()).copied().unwrap_or(0),
                c.label()
            )
        })
        .collect();

    let project_cards: String = projects
        .iter()
        .map(|p| {
            let refs: Vec<&Task> = p.tasks.iter().collect();
            let stats = StatsSummary::from_tasks(&refs);
            format!(
                r#"<a class="project-card" href="/projects/{}/">
  <h3>{}</h3>
  <p>{}</p>
  <div class="project-meta">{} 个任务 · 已完成 {} · 完成率 {}%</div>
</a>"#,
                p.id,
                html_escape(&p.name),
                html_escape(&p.description),
                stats.total_tasks,
                stats.completed_tasks,
                stats.completion_rate
            )
        })
        .collect();

    let body = fill(
        templates::HOME_TEMPLATE,
        &[
            ("total_tasks", summary.total_tasks.to_string()),
            ("completed_tasks", summary.completed_tasks.to_string()),
            ("completion_rate", summary.completion_rate.to_string()),
            ("category_cards", category_cards),
            ("project_cards", project_cards),
        ],
    );
    page("作品集", &body)
}

pub async fn home(State(state): State<AppState>) -> Response {
    html_result(state.store().read(|store| {
        let tasks = store.all_tasks();
        let summary = StatsSummary::from_tasks(&tasks);
        Ok(render_home(store.projects(), &summary))
    }))
}

pub async fn project_list(State(state): State<AppState>) -> Response {
    html_result(state.store().read(|store| {
        let rows: String = store
            .projects()
            .iter()
            .map(|p| {
                let by_category: String = Category::ALL
                    .iter()
                    .map(|c| {
                        let n = p.tasks.iter().filter(|t| t.category == *c).count();
                        format!("<td>{}</td>", n)
                    })
                    .collect();
                format!(
                    r#"<tr><td><a href="/projects/{id}/">{name}</a></td><td>{total}</td>{by_category}<td><a href="/projects/{id}/tasks/">任务列表</a></td></tr>"#,
                    id = p.id,
                    name = html_escape(&p.name),
                    total = p.tasks.len(),
                    by_category = by_category,
                )
            })
            .collect();
        let body = fill(templates::PROJECTS_TEMPLATE, &[("project_rows", rows)]);
        Ok(page("项目列表", &body))
    }))
}

pub async fn project_detail(State(state): State<AppState>, Path(project_id): Path<i64>) -> Response {
    html_result(state.store().read(|store| {
        let project = store.project(project_id)?;
        let refs: Vec<&Task> = project.tasks.iter().collect();

        let sections: String = tasks_by_category(&project.tasks)
            .into_iter()
            .map(|(category, tasks)| {
                format!(
                    r#"<section class="category-section"><h3>{} <small>{}</small> <a class="chip" href="/projects/{}/tasks/?category={}">筛选</a></h3><div class="task-grid">{}</div></section>"#,
                    category_badge(&category),
                    html_escape(category.label()),
                    project.id,
                    urlencoding::encode(category.as_str()),
                    task_cards(project.id, tasks)
                )
            })
            .collect();

        let body = fill(
            templates::PROJECT_DETAIL_TEMPLATE,
            &[
                ("project_id", project.id.to_string()),
                ("project_name", html_escape(&project.name)),
                ("project_description", html_escape(&project.description)),
                ("category_sections", sections),
                ("workshop_rows", workshop_rows(&refs)),
            ],
        );
        Ok(page(&project.name, &body))
    }))
}

// ---------------------------------------------------------------------------
// Task list
// ---------------------------------------------------------------------------

/// Query parameters for the task list.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    category: Option<String>,
    workshop: Option<String>,
}

fn render_task_list(
    projects: &[Project],
    scope: Option<&Project>,
    params: &TaskListParams,
) -> AppResult<String> {
    let filter = TaskFilter::parse(params.category.as_deref(), params.workshop.as_deref())?;
    let candidates: Vec<&Task> = match scope {
        Some(project) => project.tasks.iter().collect(),
        None => projects.iter().flat_map(|p| p.tasks.iter()).collect(),
    };
    let filtered = filter.apply(candidates);
    let groups = group_by_project(projects, &filtered);

    let category_options = options(
        std::iter::once(("all".to_string(), "全部分类".to_string())).chain(
            Category::ALL
                .iter()
                .map(|c| (c.as_str().to_string(), format!("{} {}", c.as_str(), c.label()))),
        ),
        Some(filter.category.as_deref().unwrap_or("all")),
    );
    let selected_workshop = filter.workshop.map(|w| w.to_string());
    let workshop_options = options(
        std::iter::once(("all".to_string(), "全部workshop".to_string())).chain(
            WORKSHOP_RANGE.map(|w| (w.to_string(), format!("第{}次", workshop_numeral(w)))),
        ),
        Some(selected_workshop.as_deref().unwrap_or("all")),
    );

    let project_links: String = std::iter::once(format!(
        r#"<a class="chip{}" href="/tasks/">全部项目</a>"#,
        if scope.is_none() { " active" } else { "" }
    ))
    .chain(projects.iter().map(|p| {
        format!(
            r#"<a class="chip{}" href="/projects/{}/tasks/">{}</a>"#,
            if scope.is_some_and(|s| s.id == p.id) { " active" } else { "" },
            p.id,
            html_escape(&p.name)
        )
    }))
    .collect();

    let group_html: String = groups
        .iter()
        .map(|g| {
            format!(
                r#"<section class="project-group"><h3><a href="/projects/{}/">{}</a></h3><div class="task-grid">{}</div></section>"#,
                g.project.id,
                html_escape(&g.project.name),
                task_cards(g.project.id, g.tasks.iter().copied())
            )
        })
        .collect();
    let group_html = if group_html.is_empty() {
        r#"<p class="empty">没有符合条件的任务</p>"#.to_string()
    } else {
        group_html
    };

    let action = match scope {
        Some(p) => format!("/projects/{}/tasks/", p.id),
        None => "/tasks/".to_string(),
    };
    let heading = match scope {
        Some(p) => format!("{} · 任务列表", p.name),
        None => "全部任务".to_string(),
    };

    let body = fill(
        templates::TASK_LIST_TEMPLATE,
        &[
            ("heading", html_escape(&heading)),
            ("action", action),
            ("category_options", category_options),
            ("workshop_options", workshop_options),
            ("project_links", project_links),
            ("task_count", filtered.len().to_string()),
            ("project_groups", group_html),
        ],
    );
    Ok(page(&heading, &body))
}

pub async fn task_list(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> Response {
    html_result(
        state
            .store()
            .read(|store| render_task_list(store.projects(), None, &params)),
    )
}

pub async fn project_task_list(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(params): Query<TaskListParams>,
) -> Response {
    html_result(state.store().read(|store| {
        let project = store.project(project_id)?;
        render_task_list(store.projects(), Some(project), &params)
    }))
}

// ---------------------------------------------------------------------------
// Task detail
// ---------------------------------------------------------------------------

/// Step images to display.
///
/// A task whose document has no step images but which has index rows shows
/// those rows under step 1. The document is not changed.
pub fn display_step_images(task: &Task, records: &[ImageRecord], media: &MediaLayout) -> Vec<StepImage> {
    if !task.step_images.is_empty() || records.is_empty() {
        return task.step_images.clone();
    }
    records
        .iter()
        .map(|r| StepImage {
            step: 1,
            url: media.url_for(&r.image),
            file_name: Some(client_basename(&r.image).to_string()),
            filename: None,
            description: r.description.clone().unwrap_or_default(),
            id: Some(r.id),
        })
        .collect()
}

fn image_figure(image: &StepImage) -> String {
    format!(
        r#"<figure class="step-image"><img src="{}" alt="{}"><figcaption>{}</figcaption></figure>"#,
        html_escape(&image.url),
        html_escape(image.stored_name()),
        html_escape(&image.description)
    )
}

fn process_steps_html(task: &Task, images: &[StepImage], media: &MediaLayout) -> String {
    if task.process.is_empty() {
        return r#"<p class="empty">尚未填写实现过程</p>"#.to_string();
    }
    task.process
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let number = i as i64 + 1;
            let figures: String = images
                .iter()
                .filter(|img| img.step == number)
                .map(image_figure)
                .collect();
            format!(
                r#"<li class="process-step"><h4><span class="step-no">{}</span>{}</h4><div class="rich-text">{}</div><div class="step-images">{}</div></li>"#,
                number,
                html_escape(&step.title),
                render_with_images(&step.content, media),
                figures
            )
        })
        .collect()
}

/// Per-step delete checkboxes and upload slots for the content form.
fn step_upload_fields(task: &Task) -> String {
    (1..=task.process.len() as i64)
        .map(|step| {
            let existing: Vec<&StepImage> =
                task.step_images.iter().filter(|img| img.step == step).collect();
            let deletes: String = existing
                .iter()
                .map(|img| {
                    format!(
                        r#"<label class="delete-image"><input type="checkbox" name="{}" value="{}"> 删除 {}</label>"#,
                        DELETE_FIELD,
                        html_escape(&img.identity()),
                        html_escape(img.stored_name())
                    )
                })
                .collect();
            let free = MAX_IMAGES_PER_STEP.saturating_sub(existing.len());
            let slots: String = (0..free)
                .map(|i| {
                    format!(
                        r#"<div class="upload-slot"><input type="file" accept="image/*" name="step_image_{step}_{i}"><input type="text" name="step_description_{step}_{i}" placeholder="图片描述"></div>"#,
                    )
                })
                .collect();
            format!(
                r#"<fieldset class="step-upload"><legend>步骤 {} 图片 ({}/{})</legend>{}{}</fieldset>"#,
                step,
                existing.len(),
                MAX_IMAGES_PER_STEP,
                deletes,
                slots
            )
        })
        .collect()
}

fn db_images_html(records: &[ImageRecord], media: &MediaLayout) -> String {
    if records.is_empty() {
        return r#"<p class="empty">暂无图片</p>"#.to_string();
    }
    records
        .iter()
        .map(|r| {
            format!(
                r#"<figure class="db-image"><img src="{}" alt=""><figcaption>{} <time>{}</time></figcaption></figure>"#,
                html_escape(&media.url_for(&r.image)),
                html_escape(r.description.as_deref().unwrap_or("")),
                super::api::format_uploaded_at(r.uploaded_at)
            )
        })
        .collect()
}

pub fn render_task_detail(
    project: &Project,
    task: &Task,
    records: &[ImageRecord],
    media: &MediaLayout,
) -> String {
    let images = display_step_images(task, records, media);
    let titles = task
        .process
        .iter()
        .map(|s| s.title.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let contents = task
        .process
        .iter()
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let related: Vec<&Task> = project.tasks.iter().filter(|t| t.id != task.id).collect();

    let body = fill(
        templates::TASK_DETAIL_TEMPLATE,
        &[
            ("project_id", project.id.to_string()),
            ("project_name", html_escape(&project.name)),
            ("task_id", task.id.to_string()),
            ("title", html_escape(&task.title)),
            ("category_badge", category_badge(&task.category)),
            ("workshop_text", workshop_text(task.workshop)),
            ("progress_bar", progress_bar(task.progress)),
            ("description", render_with_images(&task.description, media)),
            ("pain_points", render_with_images(&task.pain_points, media)),
            ("results", render_with_images(&task.results, media)),
            ("process_steps", process_steps_html(task, &images, media)),
            ("process_titles", html_escape(&titles)),
            ("process_contents", html_escape(&contents)),
            ("step_upload_fields", step_upload_fields(task)),
            ("db_images", db_images_html(records, media)),
            ("related_tasks", task_cards(project.id, related)),
        ],
    );
    page(&task.title, &body)
}

pub async fn task_detail(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(i64, i64)>,
) -> Response {
    let snapshot = state.store().read(|store| {
        let project = store.project(project_id)?.clone();
        store.task(project_id, task_id)?;
        Ok::<_, AppError>(project)
    });
    let project = match snapshot {
        Ok(project) => project,
        Err(e) => return error_page(e),
    };

    let records = state.db().list_images(task_id).unwrap_or_else(|e| {
        warn!(task_id, error = %e, "Failed to list task images");
        Vec::new()
    });

    match project.tasks.iter().find(|t| t.id == task_id) {
        Some(task) => Html(render_task_detail(&project, task, &records, state.media())).into_response(),
        None => error_page(AppError::task_not_found(task_id)),
    }
}

// ---------------------------------------------------------------------------
// Add / edit / delete
// ---------------------------------------------------------------------------

struct FormView<'a> {
    heading: String,
    action: String,
    projects: &'a [Project],
    values: &'a TaskForm,
    error: Option<&'a str>,
    with_image: bool,
    with_results: bool,
    cancel: String,
}

fn render_task_form(view: FormView<'_>) -> String {
    let v = view.values;
    let text = |value: &Option<String>| html_escape(value.as_deref().unwrap_or(""));

    let project_options = options(
        view.projects
            .iter()
            .map(|p| (p.id.to_string(), p.name.clone())),
        v.project_id.as_deref(),
    );
    // A custom key from the stored document stays selectable on edit.
    let custom = v
        .category
        .as_deref()
        .map(Category::from_key)
        .filter(|c| matches!(c, Category::Other(_)));
    let category_options = options(
        Category::ALL
            .iter()
            .chain(custom.as_ref())
            .map(|c| (c.as_str().to_string(), format!("{} {}", c.as_str(), c.label()))),
        v.category.as_deref(),
    );
    let workshop_options = options(
        WORKSHOP_RANGE.map(|w| (w.to_string(), workshop_text(w))),
        Some(v.workshop.as_deref().unwrap_or("1")),
    );

    let results_field = if view.with_results {
        format!(
            r#"<label>成果<textarea name="results" rows="3">{}</textarea></label>"#,
            text(&v.results)
        )
    } else {
        String::new()
    };
    let image_field = if view.with_image {
        r#"<label>任务图片<input type="file" name="image" accept="image/*"></label>"#.to_string()
    } else {
        String::new()
    };

    let body = fill(
        templates::TASK_FORM_TEMPLATE,
        &[
            ("heading", html_escape(&view.heading)),
            ("action", view.action.clone()),
            ("error", error_banner(view.error)),
            ("project_options", project_options),
            ("title_value", text(&v.title)),
            ("category_options", category_options),
            ("workshop_options", workshop_options),
            ("progress_value", html_escape(v.progress.as_deref().unwrap_or("0"))),
            ("description_value", text(&v.description)),
            ("pain_points_value", text(&v.pain_points)),
            ("process_value", text(&v.process)),
            ("results_field", results_field),
            ("image_field", image_field),
            ("cancel", view.cancel.clone()),
        ],
    );
    page(&view.heading, &body)
}

fn add_form(projects: &[Project], project_id: i64, values: &TaskForm, error: Option<&str>) -> String {
    render_task_form(FormView {
        heading: "新增任务".to_string(),
        action: format!("/projects/{}/add_task/", project_id),
        projects,
        values,
        error,
        with_image: false,
        with_results: true,
        cancel: format!("/projects/{}/", project_id),
    })
}

fn edit_form(projects: &[Project], project_id: i64, task_id: i64, values: &TaskForm, error: Option<&str>) -> String {
    render_task_form(FormView {
        heading: "编辑任务".to_string(),
        action: format!("/projects/{}/tasks/{}/edit/", project_id, task_id),
        projects,
        values,
        error,
        with_image: true,
        with_results: false,
        cancel: task_url(project_id, task_id),
    })
}

pub async fn add_task_page(State(state): State<AppState>, Path(project_id): Path<i64>) -> Response {
    html_result(state.store().read(|store| {
        store.project(project_id)?;
        let values = TaskForm {
            project_id: Some(project_id.to_string()),
            ..Default::default()
        };
        Ok(add_form(store.projects(), project_id, &values, None))
    }))
}

pub async fn add_task_submit(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Submitted(form): Submitted,
) -> Response {
    let values = task_form(&form);
    let result = state.store().write(|store| {
        let target = values.target_project(project_id)?;
        if store.find_project(target).is_none() {
            return Err(AppError::invalid_value("project_id", "Please choose a valid project"));
        }
        let new_task = values.to_new_task()?;
        let id = store.create_task(target, new_task)?;
        store.try_save().map_err(AppError::persistence)?;
        Ok((target, id))
    });

    match result {
        Ok((target, id)) => Redirect::to(&task_url(target, id)).into_response(),
        Err(e) if e.is_validation() || e.code == ErrorCode::PersistenceFailed => {
            let status = if e.is_validation() {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            html_result(state.store().read(|store| {
                Ok(add_form(store.projects(), project_id, &values, Some(&e.message)))
            }))
            .map_status(status)
        }
        Err(e) => error_page(e),
    }
}

pub async fn edit_task_page(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(i64, i64)>,
) -> Response {
    html_result(state.store().read(|store| {
        let task = store.task(project_id, task_id)?;
        let values = TaskForm::from_task(task);
        Ok(edit_form(store.projects(), project_id, task_id, &values, None))
    }))
}

pub async fn edit_task_submit(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(i64, i64)>,
    Submitted(form): Submitted,
) -> Response {
    let values = task_form(&form);
    let image = form.file("image");
    let media = state.media();

    let result = state.store().write(|store| {
        store.task(project_id, task_id)?;
        let edit = values.to_task_edit()?;

        if let Some(file) = image {
            let name = edit_image_name(task_id, &file.file_name);
            let dir = media.task_images_dir();
            std::fs::create_dir_all(&dir)
                .and_then(|()| std::fs::write(dir.join(&name), &file.bytes))
                .map_err(AppError::internal)?;
            store.attach_task_image(project_id, task_id, &name)?;
        }

        store.edit_task(project_id, task_id, edit)?;
        store.try_save().map_err(AppError::persistence)?;
        Ok::<_, AppError>(())
    });

    match result {
        Ok(()) => Redirect::to(&task_url(project_id, task_id)).into_response(),
        Err(e) if e.is_not_found() => error_page(e),
        Err(e) => {
            let status = if e.is_validation() {
                StatusCode::OK
            } else {
                e.status()
            };
            html_result(state.store().read(|store| {
                Ok(edit_form(store.projects(), project_id, task_id, &values, Some(&e.message)))
            }))
            .map_status(status)
        }
    }
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(i64, i64)>,
) -> Response {
    let result = state.store().write(|store| {
        store.delete_task(project_id, task_id)?;
        store.try_save().map_err(AppError::persistence)?;
        Ok::<_, AppError>(())
    });
    match result {
        Ok(()) => Redirect::to(&format!("/projects/{}/", project_id)).into_response(),
        Err(e) => error_page(e),
    }
}

pub async fn about() -> Html<String> {
    Html(page("关于我", templates::ABOUT_TEMPLATE))
}

/// Override the status of an already-built response.
trait MapStatus {
    fn map_status(self, status: StatusCode) -> Response;
}

impl MapStatus for Response {
    fn map_status(mut self, status: StatusCode) -> Response {
        if self.status().is_success() {
            *self.status_mut() = status;
        }
        self
    }
}

/// Group a task slice by category key, every category present.
pub fn tasks_by_category<'a>(tasks: &'a [Task]) -> BTreeMap<Category, Vec<&'a Task>> {
    let mut groups: BTreeMap<Category, Vec<&Task>> =
        Category::ALL.iter().map(|c| (c.clone(), Vec::new())).collect();
    for task in tasks {
        groups.entry(task.category.clone()).or_default().push(task);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed_document;

    fn media() -> MediaLayout {
        MediaLayout::new("media", "/media")
    }

    #[test]
    fn db_rows_fill_in_for_missing_step_images() {
        let doc = seed_document();
        let task = &doc.projects[0].tasks[0];
        let records = vec![ImageRecord {
            id: 9,
            task_id: task.id,
            image: "task_images/task_101_20240101_000000.png".into(),
            description: None,
            uploaded_at: 0,
        }];

        let images = display_step_images(task, &records, &media());
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].step, 1);
        assert_eq!(images[0].url, "/media/task_images/task_101_20240101_000000.png");
        assert_eq!(images[0].stored_name(), "task_101_20240101_000000.png");
        assert!(task.step_images.is_empty());
    }

    #[test]
    fn detail_page_offers_upload_slots_per_step() {
        let doc = seed_document();
        let project = &doc.projects[0];
        let html = render_task_detail(project, &project.tasks[0], &[], &media());
        assert!(html.contains(r#"name="step_image_1_0""#));
        assert!(html.contains(r#"name="step_image_2_2""#));
        assert!(!html.contains(r#"name="step_image_3_0""#));
        assert!(html.contains(&project.tasks[1].title));
    }

    #[test]
    fn task_list_rejects_non_integer_workshop() {
        let doc = seed_document();
        let params = TaskListParams {
            category: None,
            workshop: Some("second".into()),
        };
        let err = render_task_list(&doc.projects, None, &params).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn every_category_has_a_group() {
        let doc = seed_document();
        let groups = tasks_by_category(&doc.projects[1].tasks);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&Category::Support].len(), 2);
        assert!(groups[&Category::RnD].is_empty());
    }
}
