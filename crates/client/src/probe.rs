//! Uniform result shape and the probe seam shared by all live strategies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Outcome of one strategy against one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub url: String,
    pub ok: bool,
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    pub fn success(url: impl Into<String>, status: u16) -> Self {
        Self { url: url.into(), ok: true, status: Some(status), error: None }
    }

    pub fn failure(url: impl Into<String>, status: Option<u16>, error: impl Into<String>) -> Self {
        Self { url: url.into(), ok: false, status, error: Some(error.into()) }
    }

    /// Judge a received status against the expected one.
    pub fn from_status(url: impl Into<String>, status: u16, expected: u16) -> Self {
        if status == expected {
            Self::success(url, status)
        } else {
            Self::failure(url, Some(status), format!("HTTP {status}"))
        }
    }
}

/// A single live verification strategy.
///
/// Implementations report failures as `CheckResult { ok: false, .. }`; they
/// never return errors, since failures drive escalation rather than abort it.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self, url: &str) -> CheckResult;

    /// Release any resources held for the run.
    async fn shutdown(&self) {}
}

/// The three live strategies, in ladder order.
#[derive(Clone)]
pub struct ProbeSet {
    pub plain: Arc<dyn Probe>,
    pub browser_agent: Arc<dyn Probe>,
    pub engine: Arc<dyn Probe>,
}

impl ProbeSet {
    pub async fn shutdown(&self) {
        self.plain.shutdown().await;
        self.browser_agent.shutdown().await;
        self.engine.shutdown().await;
    }
}
