//! Configuration and pipeline factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examprep_core::EngineConfig;

use crate::cache::PaperCache;
use crate::pipeline::AcquisitionPipeline;
use crate::remote::RemotePaperSource;

/// Remote scraping tier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Disable to run fully offline (cache and synthetic tiers only).
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the term-test index page, relative to `base_url`.
    #[serde(default = "default_index_path")]
    pub index_path: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Timeout for each HTML page request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for each document download.
    #[serde(default = "default_document_timeout")]
    pub document_timeout_secs: u64,
    /// Term pages visited per fetch.
    #[serde(default = "default_max_subpages")]
    pub max_subpages: usize,
    /// Documents downloaded per term page.
    #[serde(default = "default_max_documents")]
    pub max_documents_per_page: usize,
    /// Pages of text extracted per document.
    #[serde(default = "default_max_document_pages")]
    pub max_document_pages: usize,
    /// Term pages fetched concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Paper cache lifetimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_remote_ttl")]
    pub remote_ttl_secs: u64,
    #[serde(default = "default_synthetic_ttl")]
    pub synthetic_ttl_secs: u64,
}

/// Session registry settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Purge sessions idle for longer than this. Unset keeps them forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_ttl_secs: Option<u64>,
}

/// Top-level examprep configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamprepConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
}

fn default_true() -> bool {
    true
}
fn default_base_url() -> String {
    "https://pastpapers.wiki".to_string()
}
fn default_index_path() -> String {
    "/grade-09-term-test-papers-past-papers-short-notes-2/".to_string()
}
fn default_user_agent() -> String {
    concat!("examprep/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_request_timeout() -> u64 {
    20
}
fn default_document_timeout() -> u64 {
    35
}
fn default_max_subpages() -> usize {
    12
}
fn default_max_documents() -> usize {
    3
}
fn default_max_document_pages() -> usize {
    25
}
fn default_concurrency() -> usize {
    4
}
fn default_remote_ttl() -> u64 {
    6 * 60 * 60
}
fn default_synthetic_ttl() -> u64 {
    30 * 60
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_base_url(),
            index_path: default_index_path(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            document_timeout_secs: default_document_timeout(),
            max_subpages: default_max_subpages(),
            max_documents_per_page: default_max_documents(),
            max_document_pages: default_max_document_pages(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            remote_ttl_secs: default_remote_ttl(),
            synthetic_ttl_secs: default_synthetic_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn remote_ttl(&self) -> Duration {
        Duration::from_secs(self.remote_ttl_secs)
    }

    pub fn synthetic_ttl(&self) -> Duration {
        Duration::from_secs(self.synthetic_ttl_secs)
    }
}

impl ExamprepConfig {
    /// Engine settings derived from the `[sessions]` table.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            session_idle_ttl: self.sessions.idle_ttl_secs.map(Duration::from_secs),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `examprep.toml` in the current directory
/// 2. `~/.config/examprep/config.toml`
///
/// Environment overrides: `EXAMPREP_REMOTE_BASE_URL`, `EXAMPREP_OFFLINE`.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamprepConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examprep.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<ExamprepConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => ExamprepConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config.remote.base_url = resolve_env_vars(&config.remote.base_url);
    config.remote.index_path = resolve_env_vars(&config.remote.index_path);
    config.remote.user_agent = resolve_env_vars(&config.remote.user_agent);

    Ok(config)
}

fn apply_env_overrides(config: &mut ExamprepConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(url) = var("EXAMPREP_REMOTE_BASE_URL").filter(|u| !u.trim().is_empty()) {
        config.remote.base_url = url;
    }
    if let Some(flag) = var("EXAMPREP_OFFLINE") {
        if matches!(flag.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on") {
            config.remote.enabled = false;
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examprep"))
}

/// Build the acquisition pipeline described by `config`.
///
/// Tiers in order: cache probe, the remote scraper (when enabled), then the
/// synthetic generator.
pub fn create_pipeline(config: &ExamprepConfig) -> Result<AcquisitionPipeline> {
    let cache = Arc::new(PaperCache::new());
    let mut pipeline = AcquisitionPipeline::new(cache, config.cache.synthetic_ttl());
    if config.remote.enabled {
        let remote = RemotePaperSource::new(&config.remote)
            .with_context(|| format!("invalid remote configuration for {}", config.remote.base_url))?;
        pipeline = pipeline.with_tier(Arc::new(remote), config.cache.remote_ttl());
    } else {
        tracing::info!("remote tier disabled; using cache and synthetic papers only");
    }
    Ok(pipeline)
}
