use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RotateError;

/// Integer key the remote service uses to reference an avatar image
pub type AvatarId = u64;

const APP_NAME: &str = "avatar-rotate";

/// Order in which configured avatars are used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum UsageOrder {
    /// Walk the list in order, wrapping at the end
    Sequential,
    /// Pick uniformly at random each run
    #[default]
    Random,
}

impl From<String> for UsageOrder {
    // Anything that isn't exactly SEQUENTIAL falls back to random
    fn from(value: String) -> Self {
        match value.as_str() {
            "SEQUENTIAL" => UsageOrder::Sequential,
            _ => UsageOrder::Random,
        }
    }
}

impl From<UsageOrder> for String {
    fn from(order: UsageOrder) -> Self {
        match order {
            UsageOrder::Sequential => "SEQUENTIAL".to_string(),
            UsageOrder::Random => "RANDOM".to_string(),
        }
    }
}

impl std::fmt::Display for UsageOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from(*self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Rotation configuration, loaded once per run and never mutated
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Bearer credential for the avatar service
    pub access_token: String,
    pub username: String,
    /// Root address of the service, e.g. https://jira.example.com
    pub base_url: String,
    /// Caller-ordered list of avatar ids, never sorted
    pub avatar_ids: Vec<AvatarId>,
    #[serde(default)]
    pub usage_order: UsageOrder,
    /// Where the last applied id is recorded between runs
    #[serde(default = "default_state_file", alias = "data_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_state_file() -> PathBuf {
    app_data_dir().join("last_avatar_id")
}

fn default_timeout_secs() -> u64 {
    30
}

/// Per-user data directory for state and logs
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_NAME)
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path must load, no silent fallback
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let mut candidates = Vec::new();
        if let Ok(env_path) = std::env::var("AVATAR_ROTATE_CONFIG") {
            candidates.push(PathBuf::from(env_path));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(APP_NAME).join(format!("{}.yaml", APP_NAME)));
        }
        // Legacy location next to the binary's working directory
        candidates.push(PathBuf::from("env.json"));

        for path in candidates {
            if path.exists() {
                return Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()));
            }
            log::debug!("No config at {}", path.display());
        }

        eyre::bail!("No config file found; pass --config or set AVATAR_ROTATE_CONFIG")
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values that parse but cannot drive a run
    pub fn validate(&self) -> Result<(), RotateError> {
        if self.timeout_secs == 0 {
            return Err(RotateError::Configuration("timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// State file with `~` and env vars expanded
    pub fn state_path(&self) -> PathBuf {
        Self::expand_path(&self.state_file)
    }

    /// Base URL without trailing slashes
    pub fn api_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
pub(crate) fn test_config(ids: &[AvatarId], order: UsageOrder) -> Config {
    Config {
        access_token: "secret-token".to_string(),
        username: "jdoe".to_string(),
        base_url: "http://127.0.0.1:1".to_string(),
        avatar_ids: ids.to_vec(),
        usage_order: order,
        state_file: PathBuf::from("/nonexistent/last_avatar_id"),
        timeout_secs: 5,
        log_level: LogLevel::Off,
    }
}
