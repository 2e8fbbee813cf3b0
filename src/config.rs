//! Layered configuration: defaults → TOML file → environment → CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::search::fallback::FallbackDialect;
use crate::search::pipeline::{PipelineSettings, Surface};
use crate::ui::shortcuts::{FocusRetry, KeyCombo};

/// Per-surface pipeline tuning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceConfig {
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub limit: usize,
    /// Relevance floor sent with filtered searches; quick search has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
    pub fallback: FallbackDialect,
}

impl SurfaceConfig {
    fn instant() -> Self {
        Self {
            debounce_ms: 50,
            min_query_len: 2,
            limit: 10,
            min_score: None,
            fallback: FallbackDialect::CannedSample,
        }
    }

    fn full() -> Self {
        Self {
            debounce_ms: 300,
            min_query_len: 1,
            limit: 20,
            min_score: Some(0.1),
            fallback: FallbackDialect::Advisory,
        }
    }
}

/// A `[instant]`/`[full]` table; absent keys keep that surface's defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SurfaceOverrides {
    debounce_ms: Option<u64>,
    min_query_len: Option<usize>,
    limit: Option<usize>,
    min_score: Option<f32>,
    fallback: Option<FallbackDialect>,
}

impl SurfaceOverrides {
    fn apply(self, base: SurfaceConfig) -> SurfaceConfig {
        SurfaceConfig {
            debounce_ms: self.debounce_ms.unwrap_or(base.debounce_ms),
            min_query_len: self.min_query_len.unwrap_or(base.min_query_len),
            limit: self.limit.unwrap_or(base.limit),
            min_score: self.min_score.or(base.min_score),
            fallback: self.fallback.unwrap_or(base.fallback),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    api_url: Option<String>,
    console_url: Option<String>,
    request_timeout_ms: Option<u64>,
    open_browser: Option<bool>,
    shortcut: Option<String>,
    focus_retry_ms: Option<u64>,
    focus_retry_attempts: Option<u32>,
    instant: SurfaceOverrides,
    full: SurfaceOverrides,
}

impl TryFrom<RawConfig> for Config {
    type Error = String;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        if raw.instant.min_score.is_some() {
            return Err("min_score is only supported in [full]; quick search has no score threshold".into());
        }
        let defaults = Config::default();
        Ok(Self {
            api_url: raw.api_url.unwrap_or(defaults.api_url),
            console_url: raw.console_url.or(defaults.console_url),
            request_timeout_ms: raw.request_timeout_ms.filter(|ms| *ms > 0),
            open_browser: raw.open_browser.unwrap_or(defaults.open_browser),
            shortcut: raw.shortcut.unwrap_or(defaults.shortcut),
            focus_retry_ms: raw.focus_retry_ms.unwrap_or(defaults.focus_retry_ms),
            focus_retry_attempts: raw
                .focus_retry_attempts
                .unwrap_or(defaults.focus_retry_attempts),
            instant: raw.instant.apply(defaults.instant),
            full: raw.full.apply(defaults.full),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    /// Base URL of the console API (`/api/search` lives below it).
    pub api_url: String,
    /// Base URL of the web console, used to open committed routes.
    pub console_url: Option<String>,
    /// Forced reset for hung gateway calls; unset means wait until superseded.
    pub request_timeout_ms: Option<u64>,
    pub open_browser: bool,
    /// Global focus shortcut, e.g. `ctrl+k`.
    pub shortcut: String,
    pub focus_retry_ms: u64,
    pub focus_retry_attempts: u32,
    pub instant: SurfaceConfig,
    pub full: SurfaceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            console_url: Some("http://localhost:4200".to_string()),
            request_timeout_ms: None,
            open_browser: true,
            shortcut: "ctrl+k".to_string(),
            focus_retry_ms: 50,
            focus_retry_attempts: 20,
            instant: SurfaceConfig::instant(),
            full: SurfaceConfig::full(),
        }
    }
}

impl Config {
    /// Load from an explicit file, or the platform config file when present,
    /// then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut cfg = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&body).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Environment overrides (`.env` files are honoured through dotenvy).
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = dotenvy::var("HWSEARCH_API_URL") {
            self.api_url = url;
        }
        if let Ok(url) = dotenvy::var("HWSEARCH_CONSOLE_URL") {
            self.console_url = (!url.trim().is_empty()).then_some(url);
        }
        if let Some(ms) = env_millis("HWSEARCH_TIMEOUT_MS")? {
            self.request_timeout_ms = (ms > 0).then_some(ms);
        }
        if let Some(ms) = env_millis("HWSEARCH_INSTANT_DEBOUNCE_MS")? {
            self.instant.debounce_ms = ms;
        }
        if let Some(ms) = env_millis("HWSEARCH_FULL_DEBOUNCE_MS")? {
            self.full.debounce_ms = ms;
        }
        if let Ok(val) = dotenvy::var("HWSEARCH_FALLBACK") {
            self.instant.fallback = val.parse().map_err(anyhow::Error::msg)?;
        }
        if let Ok(val) = dotenvy::var("HWSEARCH_SHORTCUT") {
            self.shortcut = val;
        }
        if let Ok(val) = dotenvy::var("HWSEARCH_OPEN_BROWSER") {
            self.open_browser = val.eq_ignore_ascii_case("true") || val == "1";
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn shortcut_combo(&self) -> Result<KeyCombo> {
        self.shortcut
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid shortcut '{}'", self.shortcut))
    }

    pub fn focus_retry(&self) -> FocusRetry {
        let initial = Duration::from_millis(self.focus_retry_ms.max(1));
        FocusRetry {
            initial,
            max_delay: initial * 8,
            max_attempts: self.focus_retry_attempts,
        }
    }

    pub fn pipeline_settings(&self, surface: Surface) -> PipelineSettings {
        let section = match surface {
            Surface::Instant => &self.instant,
            Surface::Full => &self.full,
        };
        PipelineSettings {
            surface,
            debounce: Duration::from_millis(section.debounce_ms),
            min_query_len: section.min_query_len,
            limit: section.limit,
            fallback: section.fallback,
            request_timeout: self.request_timeout(),
        }
    }
}

fn env_millis(key: &str) -> Result<Option<u64>> {
    match dotenvy::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} must be milliseconds, got '{val}'")),
        Err(_) => Ok(None),
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "opena3xx", "hwsearch")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "opena3xx", "hwsearch").map_or_else(
        || PathBuf::from(".hwsearch"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}
