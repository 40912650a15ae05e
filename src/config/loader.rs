//! Configuration loader with tier-based merging.

use super::merge::{merge_layers, read_layer};
use super::types::Config;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Explicit config file; bypasses tier merging.
pub const ENV_CONFIG_PATH: &str = "PORTFOLIO_CONFIG_PATH";
pub const ENV_DATA_FILE: &str = "PORTFOLIO_DATA_FILE";
pub const ENV_MEDIA_DIR: &str = "PORTFOLIO_MEDIA_DIR";
pub const ENV_DB_PATH: &str = "PORTFOLIO_DB_PATH";
pub const ENV_PORT: &str = "PORTFOLIO_PORT";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    /// `./portfolio/config.yaml`
    Project = 1,
    /// `~/.task-portfolio/config.yaml`
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Project dir `./portfolio`, user dir `~/.task-portfolio`.
    pub fn discover() -> Self {
        Self {
            project_dir: Some(PathBuf::from("portfolio")),
            user_dir: dirs::home_dir().map(|h| h.join(".task-portfolio")),
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn tier_files(&self) -> Vec<(ConfigTier, PathBuf)> {
        let mut files = Vec::new();
        if let Some(dir) = &self.project_dir {
            files.push((ConfigTier::Project, dir.join(CONFIG_FILE)));
        }
        if let Some(dir) = &self.user_dir {
            files.push((ConfigTier::User, dir.join(CONFIG_FILE)));
        }
        files
    }
}

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-priority file that contributed, if any.
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration, with `explicit` (e.g. `--config`) taking
    /// precedence over `PORTFOLIO_CONFIG_PATH`.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(ConfigPaths::discover(), explicit.map(Path::to_path_buf))
    }

    /// Load configuration with explicit tier directories.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with(paths, None)
    }

    fn load_with(paths: ConfigPaths, explicit: Option<PathBuf>) -> Result<Self> {
        let explicit = explicit.or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from));
        if let Some(path) = explicit {
            let mut config = Config::load(&path)?;
            apply_env_overrides(&mut config);
            return Ok(Self {
                paths,
                config,
                config_path: Some(path),
            });
        }

        let mut layers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut config_path = None;
        for (tier, file) in paths.tier_files() {
            if let Some(layer) = read_layer(&file) {
                debug!(%tier, path = %file.display(), "Loaded config tier");
                layers.push(layer);
                config_path = Some(file);
            }
        }

        let mut config: Config = serde_json::from_value(merge_layers(layers))?;
        apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(data_file) = std::env::var(ENV_DATA_FILE) {
        config.server.data_file = PathBuf::from(data_file);
    }
    if let Ok(media_dir) = std::env::var(ENV_MEDIA_DIR) {
        config.server.media_dir = PathBuf::from(media_dir);
    }
    if let Ok(db_path) = std::env::var(ENV_DB_PATH) {
        config.server.db_path = PathBuf::from(db_path);
    }
    if let Ok(port) = std::env::var(ENV_PORT) {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "Ignoring invalid {}", ENV_PORT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        assert_eq!(loader.config().server.media_url, "/media");
        assert!(loader.config_path().is_none());
    }

    #[test]
    fn explicit_file_bypasses_tiers() {
        let temp = TempDir::new().unwrap();
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join("config.yaml"), "server:\n  host: 10.0.0.1\n").unwrap();
        let explicit = temp.path().join("custom.yaml");
        std::fs::write(&explicit, "server:\n  media_url: /assets\n").unwrap();

        let paths = ConfigPaths::with_dirs(None, Some(user_dir));
        let loader = ConfigLoader::load_with(paths, Some(explicit.clone())).unwrap();

        assert_eq!(loader.config().server.media_url, "/assets");
        assert_eq!(loader.config().server.host, Config::default().server.host);
        assert_eq!(loader.config_path(), Some(explicit.as_path()));
    }

    #[test]
    fn user_tier_overrides_project_tier() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("portfolio");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join("config.yaml"),
            "server:\n  media_url: /files\n  host: 0.0.0.0\n",
        )
        .unwrap();
        std::fs::write(user_dir.join("config.yaml"), "server:\n  host: 10.0.0.1\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir.clone()));
        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let server = &loader.config().server;

        assert_eq!(server.host, "10.0.0.1");
        assert_eq!(server.media_url, "/files");
        assert_eq!(server.data_file, PathBuf::from("portfolio/data.json"));
        assert_eq!(loader.config_path(), Some(user_dir.join("config.yaml").as_path()));
    }
}
