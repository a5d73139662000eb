//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LINKVET_*)
//! 2. TOML config file (if LINKVET_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_PATH;

mod validation;

pub use validation::{ConfigError, MAX_AGE_DAYS_LIMIT, MIN_HOST_RPS};

/// Desktop browser identity used by the browser-identified strategy.
pub const DEFAULT_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LINKVET_*)
/// 2. TOML config file (if LINKVET_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the JSON link cache.
    ///
    /// Set via LINKVET_CACHE_PATH environment variable.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Freshness window for cached successes, in days.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,

    /// Per-check timeout in milliseconds.
    ///
    /// Set via LINKVET_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Concurrent checks for the request-based strategies.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Concurrent browser-engine navigations.
    #[serde(default = "default_playwright_concurrency")]
    pub playwright_concurrency: usize,

    /// Status code that counts as success.
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,

    /// Per-host request ceiling (requests per second).
    #[serde(default = "default_host_rps")]
    pub host_rps: f64,

    /// Hosts or parent domains exempt from per-host throttling.
    ///
    /// Set via LINKVET_THROTTLE_EXEMPT_HOSTS environment variable (e.g. `[github.com, example.org]`).
    #[serde(default = "default_throttle_exempt_hosts")]
    pub throttle_exempt_hosts: Vec<String>,

    /// The site's own domains; never cached, never treated as external.
    #[serde(default)]
    pub internal_domains: Vec<String>,

    /// User-Agent for the plain request strategy.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// User-Agent for the browser-identified strategy and the headless browser.
    #[serde(default = "default_browser_user_agent")]
    pub browser_user_agent: String,

    /// Whether the browser-engine strategy may launch a headless browser.
    ///
    /// Set via LINKVET_RENDER_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub render_enabled: bool,

    /// Explicit browser binary; auto-detected when unset.
    #[serde(default)]
    pub browser_executable: Option<PathBuf>,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_PATH)
}

fn default_max_age_days() -> i64 {
    30
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_concurrency() -> usize {
    10
}

fn default_playwright_concurrency() -> usize {
    2
}

fn default_expected_status() -> u16 {
    200
}

fn default_host_rps() -> f64 {
    2.0
}

fn default_throttle_exempt_hosts() -> Vec<String> {
    ["github.com", "githubusercontent.com", "wikipedia.org", "developer.mozilla.org"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_user_agent() -> String {
    "linkvet/0.1".into()
}

fn default_browser_user_agent() -> String {
    DEFAULT_BROWSER_USER_AGENT.into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            max_age_days: default_max_age_days(),
            timeout_ms: default_timeout_ms(),
            concurrency: default_concurrency(),
            playwright_concurrency: default_playwright_concurrency(),
            expected_status: default_expected_status(),
            host_rps: default_host_rps(),
            throttle_exempt_hosts: default_throttle_exempt_hosts(),
            internal_domains: Vec::new(),
            user_agent: default_user_agent(),
            browser_user_agent: default_browser_user_agent(),
            render_enabled: true,
            browser_executable: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Freshness window as a chrono duration.
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::days(self.max_age_days)
    }

    /// Minimum spacing between requests to one throttled host.
    pub fn host_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.host_rps)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LINKVET_`
    /// 2. TOML file from `LINKVET_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("LINKVET_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("LINKVET_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cache_path, PathBuf::from(".cache/validation/external-links.json"));
        assert_eq!(config.max_age_days, 30);
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.playwright_concurrency, 2);
        assert_eq!(config.expected_status, 200);
        assert!(config.render_enabled);
        assert!(config.internal_domains.is_empty());
        assert!(config.throttle_exempt_hosts.iter().any(|h| h == "github.com"));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_host_interval_from_rps() {
        let config = AppConfig { host_rps: 4.0, ..Default::default() };
        assert_eq!(config.host_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_max_age() {
        let config = AppConfig { max_age_days: 7, ..Default::default() };
        assert_eq!(config.max_age(), chrono::Duration::days(7));
    }

    #[test]
    fn test_load_from_env_and_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "linkvet.toml",
                r#"
                    concurrency = 4
                    internal_domains = ["myblog.dev"]
                "#,
            )?;
            jail.set_env("LINKVET_CONFIG_FILE", "linkvet.toml");
            jail.set_env("LINKVET_TIMEOUT_MS", "2500");

            let config = AppConfig::load().expect("config loads");
            assert_eq!(config.concurrency, 4);
            assert_eq!(config.timeout_ms, 2500);
            assert_eq!(config.internal_domains, vec!["myblog.dev".to_string()]);
            Ok(())
        });
    }
}
