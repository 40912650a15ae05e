//! HTTP server for the portfolio web app.
//!
//! Routes keep their trailing slashes; the JSON endpoints live beside the
//! pages they serve.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::{api, pages};
use crate::db::Database;
use crate::media::MediaLayout;
use crate::store::SharedStore;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    db: Database,
    media: Arc<MediaLayout>,
}

impl AppState {
    pub fn new(store: SharedStore, db: Database, media: MediaLayout) -> Self {
        Self {
            store,
            db,
            media: Arc::new(media),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// The image index.
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn media(&self) -> &MediaLayout {
        &self.media
    }
}

/// Build the router with all routes.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let media_files = ServeDir::new(state.media().root());
    let media_prefix = state.media().url_prefix().to_string();

    let router = Router::new()
        // Pages
        .route("/", get(pages::home))
        .route("/about/", get(pages::about))
        .route("/projects/", get(pages::project_list))
        .route("/projects/{pid}/", get(pages::project_detail))
        .route("/tasks/", get(pages::task_list))
        .route("/projects/{pid}/tasks/", get(pages::project_task_list))
        .route(
            "/projects/{pid}/add_task/",
            get(pages::add_task_page).post(pages::add_task_submit),
        )
        .route("/projects/{pid}/tasks/{tid}/", get(pages::task_detail))
        .route(
            "/projects/{pid}/tasks/{tid}/edit/",
            get(pages::edit_task_page).post(pages::edit_task_submit),
        )
        .route(
            "/projects/{pid}/tasks/{tid}/delete/",
            post(pages::delete_task),
        )
        // JSON
        .route(
            "/projects/{pid}/tasks/{tid}/update-process/",
            post(api::update_process),
        )
        .route(
            "/projects/{pid}/tasks/{tid}/update-process-content/",
            post(api::update_process_content),
        )
        .route(
            "/projects/{pid}/tasks/{tid}/upload-image/",
            post(api::upload_image),
        )
        .route("/projects/{pid}/tasks/{tid}/images/", get(api::task_images))
        .route("/workshop-stats/", get(api::project_workshop_stats))
        .route("/api/health", get(api::health));

    // Nesting at the root is not allowed; an empty prefix serves media as the fallback.
    let router = if media_prefix.is_empty() {
        router.fallback_service(media_files)
    } else {
        router.nest_service(&media_prefix, media_files)
    };

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: &str, max_upload_bytes: usize) -> anyhow::Result<()> {
    let app = build_router(state, max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr: SocketAddr = listener.local_addr()?;
    info!("Portfolio server listening on http://{}", bound_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Portfolio server shutting down");
}
