use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://swapi.info/api";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://picsum.photos";

/// Runtime settings. Defaults, then an optional TOML file, then `HOLOCRON_*` env vars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub image_base_url: String,
    /// Extra attempts after the first failed GET.
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub cache_enabled: bool,
    pub page_size: usize,
    /// Cap on URLs followed by list-type related blocks; `0` follows every URL.
    pub related_limit: usize,
    pub draft_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            retry_attempts: 3,
            retry_delay_ms: 200,
            request_timeout_secs: 15,
            user_agent: concat!("holocron/", env!("CARGO_PKG_VERSION")).to_string(),
            cache_enabled: true,
            page_size: 12,
            related_limit: 5,
            draft_delay_ms: 900,
        }
    }
}

impl Config {
    /// Resolve the full layering. An explicit path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        Ok(cfg.with_env_overrides())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config: {}", path.display()))
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = non_blank_env("HOLOCRON_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = non_blank_env("HOLOCRON_IMAGE_BASE_URL") {
            self.image_base_url = v;
        }
        self.retry_attempts = parsed_env("HOLOCRON_RETRY_ATTEMPTS").unwrap_or(self.retry_attempts);
        self.retry_delay_ms = parsed_env("HOLOCRON_RETRY_DELAY_MS").unwrap_or(self.retry_delay_ms);
        self.page_size = parsed_env("HOLOCRON_PAGE_SIZE").unwrap_or(self.page_size);
        self
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn draft_delay(&self) -> Duration {
        Duration::from_millis(self.draft_delay_ms)
    }
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "holocron", "holocron")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|p| p.config_dir().join("config.toml"))
}

/// `<data dir>/preferences.toml`, creating the directory on the way.
pub fn default_preferences_path() -> Result<PathBuf> {
    let proj = project_dirs().context("unable to determine data directory for preferences")?;
    let dir = proj.data_dir().to_path_buf();
    std::fs::create_dir_all(&dir).with_context(|| format!("creating data dir: {}", dir.display()))?;
    Ok(dir.join("preferences.toml"))
}
