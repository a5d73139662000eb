//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Longest accepted freshness window (about a century).
pub const MAX_AGE_DAYS_LIMIT: i64 = 36_500;

/// Slowest accepted host pacing; one request per ~11.5 days.
pub const MIN_HOST_RPS: f64 = 1e-6;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `concurrency` or `playwright_concurrency` is 0
    /// - `max_age_days` is negative or above [`MAX_AGE_DAYS_LIMIT`]
    /// - `host_rps` is not finite or below [`MIN_HOST_RPS`]
    /// - `expected_status` is not a valid HTTP status
    /// - either user agent is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.concurrency == 0 {
            return Err(ConfigError::Invalid { field: "concurrency".into(), reason: "must be at least 1".into() });
        }
        if self.playwright_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "playwright_concurrency".into(),
                reason: "must be at least 1".into(),
            });
        }

        if self.max_age_days < 0 {
            return Err(ConfigError::Invalid { field: "max_age_days".into(), reason: "must not be negative".into() });
        }
        if self.max_age_days > MAX_AGE_DAYS_LIMIT {
            return Err(ConfigError::Invalid {
                field: "max_age_days".into(),
                reason: format!("must not exceed {MAX_AGE_DAYS_LIMIT} days"),
            });
        }

        if !self.host_rps.is_finite() || self.host_rps < MIN_HOST_RPS {
            return Err(ConfigError::Invalid {
                field: "host_rps".into(),
                reason: format!("must be a finite number of at least {MIN_HOST_RPS}"),
            });
        }

        if !(100..=599).contains(&self.expected_status) {
            return Err(ConfigError::Invalid {
                field: "expected_status".into(),
                reason: "must be an HTTP status code (100-599)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }
        if self.browser_user_agent.is_empty() {
            return Err(ConfigError::Invalid {
                field: "browser_user_agent".into(),
                reason: "must not be empty".into(),
            });
        }

        if self.internal_domains.is_empty() {
            tracing::debug!("no internal_domains configured; every scanned host is treated as external");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let config = AppConfig { concurrency: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "concurrency"));

        let config = AppConfig { playwright_concurrency: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "playwright_concurrency"));
    }

    #[test]
    fn test_validate_negative_max_age() {
        let config = AppConfig { max_age_days: -1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_age_days"));
    }

    #[test]
    fn test_validate_host_rps() {
        for rps in [0.0, -1.0, 1e-30, f64::NAN, f64::INFINITY] {
            let config = AppConfig { host_rps: rps, ..Default::default() };
            let result = config.validate();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "host_rps"));
        }
    }

    #[test]
    fn test_validate_max_age_upper_bound() {
        let config = AppConfig { max_age_days: 1_000_000_000_000_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_age_days"));

        let config = AppConfig { max_age_days: MAX_AGE_DAYS_LIMIT + 1, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { max_age_days: MAX_AGE_DAYS_LIMIT, ..Default::default() };
        assert!(config.validate().is_ok());
        assert_eq!(config.max_age(), chrono::Duration::days(MAX_AGE_DAYS_LIMIT));
    }

    #[test]
    fn test_validate_slowest_host_rps_converts() {
        let config = AppConfig { host_rps: MIN_HOST_RPS, ..Default::default() };
        assert!(config.validate().is_ok());
        assert!((999_999..=1_000_000).contains(&config.host_interval().as_secs()));
    }

    #[test]
    fn test_validate_expected_status() {
        let config = AppConfig { expected_status: 42, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "expected_status"));
    }

    #[test]
    fn test_validate_empty_user_agents() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));

        let config = AppConfig { browser_user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "browser_user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { timeout_ms: 100, max_age_days: 0, concurrency: 1, ..Default::default() };
        assert!(config.validate().is_ok());

        let config = AppConfig { timeout_ms: 300_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
