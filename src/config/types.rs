//! Configuration types.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// Web server and storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// JSON document holding projects and tasks.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Root directory of uploaded media.
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// URL prefix media is served under.
    #[serde(default = "default_media_url")]
    pub media_url: String,

    /// SQLite file holding the image index.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request body limit for multipart uploads, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            media_dir: default_media_dir(),
            media_url: default_media_url(),
            db_path: default_db_path(),
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("portfolio/data.json")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("media")
}

fn default_media_url() -> String {
    "/media".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("portfolio/images.db")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Config {
    /// Load a single configuration file, without tier merging.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        // Empty or comment-only YAML parses as null
        let config: Option<Config> = serde_yaml::from_str(&content)?;
        Ok(config.unwrap_or_default())
    }

    /// `host:port` the web server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: Config = serde_yaml::from_str("server:\n  port: 9100\n").unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.media_url, "/media");
        assert_eq!(config.bind_address(), "127.0.0.1:9100");
    }

    #[test]
    fn empty_file_loads_defaults() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "# nothing here\n").unwrap();
        assert_eq!(Config::load(temp.path()).unwrap(), Config::default());
    }
}
