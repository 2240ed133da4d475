use anyhow::{Context, Result, bail};
use bytesize::ByteSize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;
pub mod size_serde;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path prefix under which every route is mounted, e.g. "/gribouillis"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Directory holding the drawing client. An empty path disables it.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_image_path")]
    pub image_path: PathBuf,
    /// Cumulative size limit for stored images
    #[serde(default = "default_max_size", with = "size_serde")]
    pub max_size: ByteSize,
    /// Maximum number of stored images
    #[serde(default = "default_max_count")]
    pub max_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Largest accepted upload body
    #[serde(default = "default_max_image_size", with = "size_serde")]
    pub max_image_size: ByteSize,
    /// Minimum interval between two admitted uploads, server-wide
    #[serde(default = "default_min_delay", with = "duration_serde::duration")]
    pub min_delay: Duration,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_static_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STATIC_DIR)
}
fn default_image_path() -> PathBuf {
    PathBuf::from(DEFAULT_IMAGE_PATH)
}
fn default_max_size() -> ByteSize {
    ByteSize::b(DEFAULT_MAX_SIZE)
}
fn default_max_count() -> usize {
    DEFAULT_MAX_COUNT
}
fn default_max_image_size() -> ByteSize {
    ByteSize::b(DEFAULT_MAX_IMAGE_SIZE)
}
fn default_min_delay() -> Duration {
    Duration::from_secs(DEFAULT_MIN_DELAY_SECS)
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            image_path: default_image_path(),
            max_size: default_max_size(),
            max_count: default_max_count(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_image_size: default_max_image_size(),
            min_delay: default_min_delay(),
        }
    }
}

impl WebConfig {
    /// The configured prefix with a leading slash and no trailing slash.
    /// Returns an empty string when routes live at the root.
    pub fn base_path(&self) -> String {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }

    /// Public URL prefix that saved image names are appended to.
    pub fn saved_path(&self) -> String {
        format!("{}/saved/", self.base_path())
    }

    pub fn static_dir(&self) -> Option<&Path> {
        if self.static_dir.as_os_str().is_empty() {
            None
        } else {
            Some(&self.static_dir)
        }
    }
}

impl Config {
    pub fn load_from_file(config_file: &Path) -> Result<Self> {
        if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)
                .with_context(|| format!("reading {}", config_file.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("parsing {}", config_file.display()))
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)
                .with_context(|| format!("writing {}", config_file.display()))?;
            info!("Created default config file: {}", config_file.display());
            Ok(default_config)
        }
    }

    /// Address string handed to the listener, e.g. "localhost:5001".
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.web.host, self.web.port)
    }

    /// Override host and port from a "host:port" string.
    pub fn set_listen_addr(&mut self, addr: &str) -> Result<()> {
        let Some((host, port)) = addr.rsplit_once(':') else {
            bail!("listen address '{addr}' must look like host:port");
        };
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid port in listen address '{addr}'"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        self.web.host = if host.is_empty() {
            "0.0.0.0".to_string()
        } else {
            host.to_string()
        };
        self.web.port = port;
        Ok(())
    }
}
