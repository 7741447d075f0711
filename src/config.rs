use crate::engine::{PacingPolicy, TagGroup, TagSet};
use crate::error::RunError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub extra: ExtraConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// Overrides the built-in tag catalog. Keys are star ratings ("1".."5").
    pub tags: Option<BTreeMap<String, Vec<TagSet>>>,
}

/// Star ratings a run may hand out.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub stars: Vec<u8>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { stars: vec![3, 4] }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), RunError> {
        if self.stars.is_empty() || self.stars.len() > 5 {
            return Err(RunError::ConfigInvalid(
                "star level must hold 1 to 5 ratings".to_string(),
            ));
        }
        if let Some(bad) = self.stars.iter().find(|s| !(1..=5).contains(*s)) {
            return Err(RunError::ConfigInvalid(format!(
                "star level {} is outside 1-5",
                bad
            )));
        }
        let unique: HashSet<u8> = self.stars.iter().copied().collect();
        if unique.len() != self.stars.len() {
            return Err(RunError::ConfigInvalid("star level must be unique".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PacingConfig {
    #[serde(default = "default_pacing_min")]
    pub min_secs: u64,
    #[serde(default = "default_pacing_max")]
    pub max_secs: u64,
}

fn default_pacing_min() -> u64 { 15 }
fn default_pacing_max() -> u64 { 24 }

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_secs: default_pacing_min(),
            max_secs: default_pacing_max(),
        }
    }
}

impl PacingConfig {
    pub fn policy(&self) -> PacingPolicy {
        PacingPolicy::new(self.min_secs, self.max_secs)
    }
}

/// Bounds of the per-run extra quota, drawn once per run.
#[derive(Debug, Deserialize, Clone)]
pub struct ExtraConfig {
    #[serde(default = "default_quota_min")]
    pub quota_min: u32,
    #[serde(default = "default_quota_max")]
    pub quota_max: u32,
}

fn default_quota_min() -> u32 { 2 }
fn default_quota_max() -> u32 { 7 }

impl Default for ExtraConfig {
    fn default() -> Self {
        Self {
            quota_min: default_quota_min(),
            quota_max: default_quota_max(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_ms: u64,
    /// JSON session file. Read at startup, rewritten when the session is refreshed.
    pub cookie_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://interface.music.163.com".to_string()
}
fn default_timeout() -> u64 { 10_000 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_timeout(),
            cookie_file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Tag catalog in effect: the `[tags]` table if present, else the built-in one.
    pub fn tag_group(&self) -> Result<TagGroup, RunError> {
        match &self.tags {
            Some(table) => TagGroup::from_table(table),
            None => Ok(TagGroup::builtin()),
        }
    }

    /// Everything a run needs checked before the first request goes out.
    pub fn validate(&self, tags: &TagGroup) -> Result<(), RunError> {
        self.run.validate()?;
        if let Some(missing) = self.run.stars.iter().find(|s| !tags.contains(**s)) {
            return Err(RunError::ConfigInvalid(format!(
                "no tag group for star level {}",
                missing
            )));
        }
        if self.pacing.min_secs > self.pacing.max_secs {
            return Err(RunError::ConfigInvalid(format!(
                "pacing min_secs {} exceeds max_secs {}",
                self.pacing.min_secs, self.pacing.max_secs
            )));
        }
        if self.extra.quota_min == 0 || self.extra.quota_min > self.extra.quota_max {
            return Err(RunError::ConfigInvalid(format!(
                "extra quota range {}..={} is invalid",
                self.extra.quota_min, self.extra.quota_max
            )));
        }
        Ok(())
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for (key, value) in parse_env(content) {
            if std::env::var(&key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// Session cookie from the environment (`MUSIC_U`, optional `MUSIC_CSRF`).
    /// Missing values come back empty; the eligibility check reports them.
    pub fn session_from_env() -> (String, Option<String>) {
        let music_u = std::env::var("MUSIC_U")
            .map(|v| sanitize_key(&v))
            .unwrap_or_default();
        let csrf = std::env::var("MUSIC_CSRF")
            .ok()
            .map(|v| sanitize_key(&v))
            .filter(|v| !v.is_empty());
        (music_u, csrf)
    }
}

fn parse_env(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Strip carriage returns, BOM, and other invisible chars from a cookie value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
