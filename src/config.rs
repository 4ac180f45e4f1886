use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub acoustid: AcoustIdConfig,
    #[serde(default)]
    pub lastfm: LastFmConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcoustIdConfig {
    pub api_key: Option<String>,
    /// Chromaprint `fpcalc` 실행 파일 경로.
    #[serde(default = "default_fpcalc")]
    pub fpcalc: String,
}

impl Default for AcoustIdConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            fpcalc: default_fpcalc(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LastFmConfig {
    pub api_key: Option<String>,
}

/// AcoustID 호출 제한. 기본값은 1.05초당 3회.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_calls")]
    pub max_calls: usize,
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: default_max_calls(),
            window_ms: default_window_ms(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

fn default_fpcalc() -> String {
    "fpcalc".to_string()
}

fn default_max_calls() -> usize {
    3
}

fn default_window_ms() -> u64 {
    1050
}

impl Config {
    pub fn is_configured(&self) -> bool {
        has_value(&self.acoustid.api_key) && has_value(&self.lastfm.api_key)
    }

    /// 환경 변수 `ACOUSTID_API_KEY`, `LASTFM_API_KEY`가 있으면 파일 값보다 우선한다.
    fn apply_env(mut self) -> Self {
        if let Ok(key) = std::env::var("ACOUSTID_API_KEY") {
            if !key.is_empty() {
                self.acoustid.api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("LASTFM_API_KEY") {
            if !key.is_empty() {
                self.lastfm.api_key = Some(key);
            }
        }
        self
    }
}

fn has_value(value: &Option<String>) -> bool {
    value.as_ref().is_some_and(|s| !s.is_empty())
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("mp3ident")
        .join("config.toml")
}

pub fn load_config() -> Config {
    load_config_from(&config_path()).apply_env()
}

/// 설정 파일을 읽는다. 파일이 없거나 파싱에 실패하면 기본값을 사용한다.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "config parse failed, using defaults");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &config_path())
}

fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
