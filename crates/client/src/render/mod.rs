//! Headless browser navigation for bot-walled pages.
//!
//! One browser process is launched lazily on the first check and shared by
//! every check in the run; each check gets its own tab. A failed launch is
//! remembered, so later checks fail immediately instead of relaunching.
//! [`BrowserEngine::shutdown`] closes the browser (only if it was ever
//! launched) and resets the engine for a later run.

mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::probe::{CheckResult, Probe};
use session::Session;

/// Errors that can occur during browser navigation.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Timeout waiting for the page to load.
    #[error("navigation timeout after {0}ms")]
    Timeout(u64),

    /// Navigation finished without a main-document response.
    #[error("navigation produced no response")]
    NoResponse,

    /// Browser support is disabled in this build or configuration.
    #[error("render mode is disabled")]
    Disabled,
}

impl From<RenderError> for linkvet_core::Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Disabled => Self::RenderDisabled,
            other => Self::RenderFailed(other.to_string()),
        }
    }
}

/// Options for browser navigation.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Whether a browser may be launched at all.
    pub enabled: bool,

    /// Navigation timeout (default: 10s).
    pub timeout: Duration,

    /// User agent the browser presents.
    pub user_agent: String,

    /// Explicit Chrome/Chromium binary; autodetected when `None`.
    pub executable: Option<PathBuf>,

    /// Status code that counts as success (default: 200).
    pub expected_status: u16,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_millis(10_000),
            user_agent: linkvet_core::config::DEFAULT_BROWSER_USER_AGENT.to_string(),
            executable: None,
            expected_status: 200,
        }
    }
}

enum EngineState {
    Idle,
    Ready(Arc<Session>),
    Failed(RenderError),
}

/// Browser-engine strategy backed by one shared headless browser.
pub struct BrowserEngine {
    opts: RenderOptions,
    state: Mutex<EngineState>,
    launches: AtomicUsize,
}

impl BrowserEngine {
    pub fn new(opts: RenderOptions) -> Self {
        Self { opts, state: Mutex::new(EngineState::Idle), launches: AtomicUsize::new(0) }
    }

    /// Number of launch attempts made so far.
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::Relaxed)
    }

    /// Get the shared session, launching it on first use.
    ///
    /// The state lock is held across the launch, so concurrent first checks
    /// wait for one launch instead of racing several.
    async fn session(&self) -> Result<Arc<Session>, RenderError> {
        if !self.opts.enabled {
            return Err(RenderError::Disabled);
        }

        let mut state = self.state.lock().await;
        match &*state {
            EngineState::Ready(session) => return Ok(session.clone()),
            EngineState::Failed(err) => return Err(err.clone()),
            EngineState::Idle => {}
        }

        self.launches.fetch_add(1, Ordering::Relaxed);
        match Session::launch(&self.opts).await {
            Ok(session) => {
                tracing::info!("headless browser launched");
                let session = Arc::new(session);
                *state = EngineState::Ready(session.clone());
                Ok(session)
            }
            Err(err) => {
                tracing::warn!(error = %err, "headless browser unavailable for this run");
                *state = EngineState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Navigate to `url` and judge the main-document status.
    pub async fn navigate(&self, url: &str) -> CheckResult {
        let session = match self.session().await {
            Ok(session) => session,
            Err(err) => return CheckResult::failure(url, None, linkvet_core::Error::from(err).to_string()),
        };

        match session.navigate(url, &self.opts).await {
            Ok(status) => CheckResult::from_status(url, status, self.opts.expected_status),
            Err(err) => CheckResult::failure(url, None, linkvet_core::Error::from(err).to_string()),
        }
    }
}

#[async_trait::async_trait]
impl Probe for BrowserEngine {
    async fn check(&self, url: &str) -> CheckResult {
        self.navigate(url).await
    }

    async fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.state.lock().await, EngineState::Idle);
        if let EngineState::Ready(session) = previous {
            match Arc::try_unwrap(session) {
                Ok(session) => {
                    session.close().await;
                    tracing::debug!("headless browser closed");
                }
                Err(_) => tracing::warn!("headless browser still in use at shutdown; dropping handle"),
            }
        }
    }
}
