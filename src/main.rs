//! task-portfolio
//!
//! Portfolio tracker for workshop projects and tasks: a JSON task store,
//! step image management mirrored into a SQLite index, and a web UI.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::Path;
use task_portfolio::cli::{Cli, Command};
use task_portfolio::config::{Config, ConfigLoader};
use task_portfolio::dashboard::{self, AppState};
use task_portfolio::db::Database;
use task_portfolio::logging::{self, LogTarget};
use task_portfolio::media::MediaLayout;
use task_portfolio::stats::StatsSummary;
use task_portfolio::store::{SharedStore, TaskStore};
use task_portfolio::types::Task;
use tracing::{info, warn};

/// Apply command-line overrides on top of the loaded configuration.
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    let server = &mut config.server;
    if let Some(path) = &cli.data_file {
        server.data_file = path.into();
    }
    if let Some(dir) = &cli.media_dir {
        server.media_dir = dir.into();
    }
    if let Some(path) = &cli.database {
        server.db_path = path.into();
    }
    if let Some(host) = &cli.host {
        server.host = host.clone();
    }
    if let Some(port) = cli.port {
        server.port = port;
    }
}

async fn run_server(config: &Config) -> Result<()> {
    let server = &config.server;

    let store = TaskStore::load(&server.data_file);
    let db = Database::open(&server.db_path)?;
    let media = MediaLayout::new(&server.media_dir, &server.media_url);
    if let Err(e) = media.ensure_dirs() {
        warn!(dir = %server.media_dir.display(), error = %e, "Could not create media directories");
    }

    let state = AppState::new(SharedStore::new(store), db, media);
    dashboard::serve(state, &config.bind_address(), server.max_upload_bytes).await
}

fn print_stats(config: &Config, project: Option<i64>) -> Result<()> {
    let store = TaskStore::load(&config.server.data_file);
    let tasks: Vec<&Task> = match project {
        Some(id) => store
            .find_project(id)
            .ok_or_else(|| anyhow!("Project not found: {}", id))?
            .tasks
            .iter()
            .collect(),
        None => store.all_tasks(),
    };
    let summary = StatsSummary::from_tasks(&tasks);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn reindex(config: &Config) -> Result<()> {
    let mut store = TaskStore::load(&config.server.data_file);
    let db = Database::open(&config.server.db_path)?;
    let inserted = db.rebuild_step_image_index(store.projects_mut())?;
    store.try_save()?;
    info!(inserted, total = db.count_images()?, "Rebuilt step image index");
    println!("Indexed {} step images", inserted);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let loader = ConfigLoader::load_from(cli.config.as_deref().map(Path::new))?;
    if let Some(path) = loader.config_path() {
        info!(path = %path.display(), "Using configuration file");
    }
    let mut config = loader.into_config();
    apply_cli_overrides(&mut config, &cli);

    match cli.command {
        None | Some(Command::Serve) => run_server(&config).await,
        Some(Command::Stats { project }) => print_stats(&config, project),
        Some(Command::Reindex) => reindex(&config),
    }
}
