//! Process configuration
//!
//! Read once at start-up and handed to the client explicitly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use grabber_jd2::ClientConfig;

use crate::error::CoreError;
use crate::Result;

pub const ENV_JD2_URL: &str = "GRABBER_JD2_URL";
pub const ENV_JD2_DEST_DIR: &str = "GRABBER_JD2_DEST_DIR";
pub const ENV_JD2_TIMEOUT: &str = "GRABBER_JD2_TIMEOUT";
pub const ENV_DATABASE_PATH: &str = "GRABBER_DATABASE_PATH";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// JD2 remote API root, e.g. `http://localhost:3128`
    pub jd2_url: Option<String>,
    /// Folder JD2 downloads into
    pub jd2_dest_dir: Option<PathBuf>,
    /// Per-request timeout in seconds
    pub jd2_timeout_secs: u64,
    /// Path to the record store
    pub database_path: PathBuf,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            jd2_url: None,
            jd2_dest_dir: None,
            jd2_timeout_secs: DEFAULT_TIMEOUT_SECS,
            database_path: data_dir.join("grabber.db"),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("grabber"))
            .unwrap_or_else(|| PathBuf::from(".grabber"))
    }

    /// Defaults overlaid with `GRABBER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = value(ENV_JD2_URL) {
            config.jd2_url = Some(url);
        }
        if let Some(dir) = value(ENV_JD2_DEST_DIR) {
            config.jd2_dest_dir = Some(PathBuf::from(dir));
        }
        if let Some(timeout) = value(ENV_JD2_TIMEOUT) {
            config.jd2_timeout_secs = timeout.trim().parse().map_err(|_| {
                CoreError::Config(format!("{ENV_JD2_TIMEOUT} must be whole seconds, got {timeout:?}"))
            })?;
        }
        if let Some(path) = value(ENV_DATABASE_PATH) {
            config.database_path = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.jd2_url.clone(),
            destination_dir: self.jd2_dest_dir.clone(),
            timeout: Duration::from_secs(self.jd2_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
