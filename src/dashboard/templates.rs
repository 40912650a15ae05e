//! HTML templates for the web app.
//!
//! Templates are embedded at compile time using `include_str!` and filled
//! with `{{placeholder}}` substitution.

/// The base HTML template with navigation and layout.
pub const BASE_TEMPLATE: &str = include_str!("templates/base.html");

/// Home page with global statistics and project cards.
pub const HOME_TEMPLATE: &str = include_str!("templates/home.html");

pub const PROJECTS_TEMPLATE: &str = include_str!("templates/projects.html");

/// Project detail: tasks by category and the workshop table.
pub const PROJECT_DETAIL_TEMPLATE: &str = include_str!("templates/project_detail.html");

/// Filterable task list, grouped by project.
pub const TASK_LIST_TEMPLATE: &str = include_str!("templates/task_list.html");

/// Task detail with the process editors and image forms.
pub const TASK_DETAIL_TEMPLATE: &str = include_str!("templates/task_detail.html");

/// Shared add/edit task form.
pub const TASK_FORM_TEMPLATE: &str = include_str!("templates/task_form.html");

pub const ABOUT_TEMPLATE: &str = include_str!("templates/about.html");

pub const ERROR_TEMPLATE: &str = include_str!("templates/error.html");
