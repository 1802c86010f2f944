use crate::logger::LogLevel;
use crate::retry::{ErrorKind, RetryOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_retries: u32,
    /// Base delay in milliseconds between attempts.
    pub delay_ms: u64,
    /// Double the delay after each failed attempt.
    #[serde(default = "default_backoff")]
    pub backoff: bool,
    /// Error kinds that are retried; defaults to network, timeout and server.
    #[serde(default = "default_retryable_kinds")]
    pub retryable_kinds: Vec<ErrorKind>,
    /// Optional ceiling on a single delay, in milliseconds.
    #[serde(default)]
    pub max_delay_ms: Option<u64>,
}

fn default_backoff() -> bool {
    true
}

fn default_retryable_kinds() -> Vec<ErrorKind> {
    ErrorKind::DEFAULT_RETRYABLE.to_vec()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 1000,
            backoff: true,
            retryable_kinds: default_retryable_kinds(),
            max_delay_ms: None,
        }
    }
}

impl From<&RetryConfig> for RetryOptions {
    fn from(cfg: &RetryConfig) -> Self {
        let opts = RetryOptions::new(cfg.max_retries)
            .with_delay(Duration::from_millis(cfg.delay_ms))
            .with_backoff(cfg.backoff)
            .with_retryable_kinds(cfg.retryable_kinds.iter().copied());
        match cfg.max_delay_ms {
            Some(ms) => opts.with_max_delay(Duration::from_millis(ms)),
            None => opts,
        }
    }
}

/// Global configuration loaded from `~/.config/leasehub/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeasehubConfig {
    /// Base URL of the CRM backend API.
    pub api_base_url: String,
    /// Bearer token sent with every request, if set.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Minimum level for the application logger.
    pub log_level: LogLevel,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for LeasehubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_token: None,
            request_timeout_secs: 30,
            log_level: LogLevel::Info,
            retry: None,
        }
    }
}

impl LeasehubConfig {
    /// Retry options from the `[retry]` section, or the defaults.
    pub fn retry_options(&self) -> RetryOptions {
        self.retry
            .as_ref()
            .map(RetryOptions::from)
            .unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("leasehub")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LeasehubConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] but at an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<LeasehubConfig> {
    if !path.exists() {
        let default_cfg = LeasehubConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let cfg: LeasehubConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
