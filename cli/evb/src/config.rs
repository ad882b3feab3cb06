//! Configuration and credential storage.
//!
//! Both live as JSON files in the platform config directory. Environment
//! variables override what is on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use eventboard_sync::DEFAULT_REQUEST_TIMEOUT;
use serde::{Deserialize, Serialize};

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

const DEFAULT_API_URL: &str = "http://localhost:4000";

fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "eventboard", "evb")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// API endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load config from disk (or defaults), then apply `EVB_*` overrides.
    pub fn load() -> Result<Self> {
        let mut config = read_json::<Self>(&config_dir()?.join(CONFIG_FILE))?.unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("EVB_API_URL").filter(|u| !u.is_empty()) {
            self.api_url = url;
        }
        if let Some(secs) = var("EVB_TIMEOUT_SECS").filter(|s| !s.is_empty()) {
            let secs = secs
                .parse()
                .with_context(|| format!("EVB_TIMEOUT_SECS must be a number of seconds, got {secs:?}"))?;
            self.request_timeout_secs = Some(secs);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }
}

/// Stored credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token.
    pub token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Credentials {
    pub fn new(token: String) -> Self {
        Self {
            token,
            user_id: None,
            username: None,
        }
    }

    /// Load credentials; `EVB_TOKEN` takes precedence over the stored file.
    pub fn load() -> Result<Option<Self>> {
        if let Some(token) = std::env::var("EVB_TOKEN").ok().filter(|t| !t.is_empty()) {
            return Ok(Some(Self::new(token)));
        }
        read_json(&config_dir()?.join(CREDENTIALS_FILE))
    }

    pub fn save(&self) -> Result<()> {
        write_private(CREDENTIALS_FILE, &serde_json::to_string_pretty(self)?)
    }

    pub fn delete() -> Result<()> {
        let path = config_dir()?.join(CREDENTIALS_FILE);

        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete credentials at {:?}", path))?;
        }

        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {:?}", path))?;
    Ok(Some(value))
}

/// Write a file readable only by the current user.
fn write_private(file_name: &str, contents: &str) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let path = dir.join(file_name);

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&path)
            .with_context(|| format!("Failed to write {:?}", path))?;
        file.write_all(contents.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    }

    Ok(())
}
