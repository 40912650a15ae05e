//! Web app: HTML pages, JSON endpoints and media serving.

mod api;
mod forms;
mod pages;
pub mod render;
mod server;
pub mod templates;

pub use forms::{Submitted, task_form};
pub use pages::{display_step_images, error_page};
pub use server::{AppState, build_router, serve};
