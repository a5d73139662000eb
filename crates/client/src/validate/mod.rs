//! Batch validation of external URLs.
//!
//! A run normalizes and dedupes its input, answers fresh URLs from the cache,
//! and escalates the rest concurrently under the shared per-host throttle and
//! concurrency limiters. Results come back in input order; the cache is written
//! once at the end, and only when something was actually checked.

mod progress;

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use linkvet_core::url::{is_internal, normalize_url_key};
use linkvet_core::{AppConfig, CacheEntry, CacheFile, Error, ManualState, Strategy};

use crate::escalation::{Escalation, Outcome};
use crate::fetch::{FetchClient, FetchConfig};
use crate::limiter::ConcurrencyLimiter;
use crate::probe::{CheckResult, ProbeSet};
use crate::render::{BrowserEngine, RenderOptions};
use crate::throttle::HostThrottle;

pub use progress::{Progress, ProgressFn};
use progress::ProgressTracker;

/// Options for one validation run.
#[derive(Clone)]
pub struct ValidateOptions {
    pub cache_path: PathBuf,
    /// Freshness window for cached successes.
    pub max_age: chrono::Duration,
    pub timeout: Duration,
    /// Concurrent checks for the request-based strategies.
    pub concurrency: usize,
    /// Concurrent browser-engine navigations.
    pub playwright_concurrency: usize,
    /// Ignore cache freshness, hints and manual state for this run.
    pub force_full_check: bool,
    pub expected_status: u16,
    /// Minimum spacing between requests to one throttled host.
    pub host_interval: Duration,
    pub throttle_exempt_hosts: Vec<String>,
    pub internal_domains: Vec<String>,
    pub user_agent: String,
    pub browser_user_agent: String,
    pub render_enabled: bool,
    pub browser_executable: Option<PathBuf>,
    pub on_progress: Option<ProgressFn>,
}

impl fmt::Debug for ValidateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateOptions")
            .field("cache_path", &self.cache_path)
            .field("max_age", &self.max_age)
            .field("timeout", &self.timeout)
            .field("concurrency", &self.concurrency)
            .field("playwright_concurrency", &self.playwright_concurrency)
            .field("force_full_check", &self.force_full_check)
            .field("expected_status", &self.expected_status)
            .field("host_interval", &self.host_interval)
            .field("render_enabled", &self.render_enabled)
            .finish_non_exhaustive()
    }
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ValidateOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            cache_path: config.cache_path.clone(),
            max_age: config.max_age(),
            timeout: config.timeout(),
            concurrency: config.concurrency,
            playwright_concurrency: config.playwright_concurrency,
            force_full_check: false,
            expected_status: config.expected_status,
            host_interval: config.host_interval(),
            throttle_exempt_hosts: config.throttle_exempt_hosts.clone(),
            internal_domains: config.internal_domains.clone(),
            user_agent: config.user_agent.clone(),
            browser_user_agent: config.browser_user_agent.clone(),
            render_enabled: config.render_enabled,
            browser_executable: config.browser_executable.clone(),
            on_progress: None,
        }
    }
}

impl ValidateOptions {
    fn validate(&self) -> Result<(), Error> {
        if self.concurrency == 0 {
            return Err(Error::InvalidInput("concurrency must be at least 1".into()));
        }
        if self.playwright_concurrency == 0 {
            return Err(Error::InvalidInput("playwright_concurrency must be at least 1".into()));
        }
        if self.max_age < chrono::Duration::zero() {
            return Err(Error::InvalidInput("max_age must not be negative".into()));
        }
        Ok(())
    }

    /// Build the real probes: two HTTP clients and a lazily launched browser.
    fn probes(&self) -> Result<ProbeSet, Error> {
        let plain = FetchClient::new(FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            expected_status: self.expected_status,
            ..Default::default()
        })?;
        let browser_agent = FetchClient::new(FetchConfig {
            timeout: self.timeout,
            expected_status: self.expected_status,
            ..FetchConfig::browser_agent(self.browser_user_agent.clone())
        })?;
        let engine = BrowserEngine::new(RenderOptions {
            enabled: self.render_enabled,
            timeout: self.timeout,
            user_agent: self.browser_user_agent.clone(),
            executable: self.browser_executable.clone(),
            expected_status: self.expected_status,
        });

        Ok(ProbeSet { plain: Arc::new(plain), browser_agent: Arc::new(browser_agent), engine: Arc::new(engine) })
    }
}

/// Final verdict for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalUrlCheckResult {
    pub url: String,
    pub ok: bool,
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub from_cache: bool,
    /// Strategy that produced the verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ExternalUrlCheckResult {
    fn from_cache(url: &str, entry: &CacheEntry) -> Self {
        Self {
            url: url.to_string(),
            ok: entry.ok,
            status: entry.status,
            error: entry.error.clone(),
            from_cache: true,
            hint: entry.hint,
            warning: None,
        }
    }

    fn from_outcome(outcome: Outcome) -> Self {
        let CheckResult { url, ok, status, error } = outcome.result;
        Self { url, ok, status, error, from_cache: false, hint: Some(outcome.hint), warning: outcome.warning }
    }

    fn lost(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ok: false,
            status: None,
            error: Some(Error::CheckPanicked("check task did not complete".into()).to_string()),
            from_cache: false,
            hint: Some(Strategy::Manual),
            warning: None,
        }
    }
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Unique URLs after normalization.
    pub total: usize,
    pub from_cache: usize,
    /// URLs that went through live escalation.
    pub checked: usize,
    pub warnings: usize,
    pub failed: usize,
}

/// Results of a run, in input order, plus summary counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub results: Vec<ExternalUrlCheckResult>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    pub fn failures(&self) -> impl Iterator<Item = &ExternalUrlCheckResult> {
        self.results.iter().filter(|r| !r.ok)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ExternalUrlCheckResult> {
        self.results.iter().filter(|r| r.warning.is_some())
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

/// Validates batches of external URLs against a shared cache.
pub struct Validator {
    options: ValidateOptions,
    probes: ProbeSet,
}

impl Validator {
    /// Create a validator with the real HTTP and browser probes.
    pub fn new(options: ValidateOptions) -> Result<Self, Error> {
        options.validate()?;
        let probes = options.probes()?;
        Ok(Self { options, probes })
    }

    /// Create a validator over caller-supplied probes.
    pub fn with_probes(options: ValidateOptions, probes: ProbeSet) -> Self {
        Self { options, probes }
    }

    pub fn options(&self) -> &ValidateOptions {
        &self.options
    }

    /// Validate `urls`, returning one result per unique normalized URL.
    ///
    /// Probes are shut down before returning, whatever the outcome.
    pub async fn run<I, S>(&self, urls: I) -> Result<ValidationReport, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let report = self.run_inner(urls).await;
        self.probes.shutdown().await;
        report
    }

    async fn run_inner<I, S>(&self, urls: I) -> Result<ValidationReport, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let opts = &self.options;
        opts.validate()?;

        let urls = dedupe(urls);
        let mut cache = CacheFile::load(&opts.cache_path).await;
        let tracker = Arc::new(ProgressTracker::new(urls.len(), opts.on_progress.clone()));

        let now = Utc::now();
        let mut results: HashMap<String, ExternalUrlCheckResult> = HashMap::with_capacity(urls.len());
        let mut pending: Vec<(String, Option<CacheEntry>)> = Vec::new();
        for url in &urls {
            let cached = cache.get(url);
            match cached {
                Some(entry) if !opts.force_full_check && entry.is_fresh(now, opts.max_age, opts.expected_status) => {
                    results.insert(url.clone(), ExternalUrlCheckResult::from_cache(url, entry));
                }
                _ => pending.push((url.clone(), cached.cloned())),
            }
        }
        let from_cache = results.len();
        tracker.cached(from_cache);

        tracing::info!(total = urls.len(), from_cache, to_check = pending.len(), "validating external links");

        let escalation = Arc::new(Escalation::new(
            self.probes.clone(),
            Arc::new(HostThrottle::new(opts.host_interval, opts.throttle_exempt_hosts.clone())),
            ConcurrencyLimiter::new("general", opts.concurrency),
            ConcurrencyLimiter::new("engine", opts.playwright_concurrency),
            opts.expected_status,
        ));

        let checked = pending.len();
        let mut outstanding: HashSet<String> = HashSet::with_capacity(checked);
        let mut join_set = JoinSet::new();
        for (url, cached) in pending {
            outstanding.insert(url.clone());
            let escalation = escalation.clone();
            let tracker = tracker.clone();
            let force = opts.force_full_check;

            join_set.spawn(async move {
                tracker.started();
                let outcome = AssertUnwindSafe(escalation.run(&url, cached.as_ref(), force))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| panicked(&url, payload));
                tracker.finished(outcome.result.ok);
                (url, outcome)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            let (url, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!(error = %e, "validation task failed");
                    continue;
                }
            };
            outstanding.remove(&url);

            if !is_internal(&url, &opts.internal_domains) {
                let manual = cache.get(&url).and_then(|entry| entry.manual);
                cache.record(url.clone(), cache_entry(&outcome, manual));
            }
            results.insert(url, ExternalUrlCheckResult::from_outcome(outcome));
        }

        for url in outstanding {
            tracker.lost();
            results.insert(url.clone(), ExternalUrlCheckResult::lost(&url));
        }

        if checked > 0
            && let Err(e) = cache.save(&opts.cache_path, &opts.internal_domains).await
        {
            tracing::warn!(path = %opts.cache_path.display(), error = %e, "failed to save link cache");
        }

        let results: Vec<_> = urls.iter().filter_map(|url| results.remove(url)).collect();
        let summary = ValidationSummary {
            total: results.len(),
            from_cache,
            checked,
            warnings: results.iter().filter(|r| r.warning.is_some()).count(),
            failed: results.iter().filter(|r| !r.ok).count(),
        };

        tracing::info!(
            total = summary.total,
            from_cache = summary.from_cache,
            checked = summary.checked,
            warnings = summary.warnings,
            failed = summary.failed,
            "external link validation complete"
        );

        Ok(ValidationReport { results, summary })
    }
}

/// One-shot validation with the real probes.
pub async fn validate_external_urls<I, S>(urls: I, options: ValidateOptions) -> Result<ValidationReport, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Validator::new(options)?.run(urls).await
}

/// Normalize keys and drop empties and duplicates, keeping first-seen order.
fn dedupe<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .map(|url| normalize_url_key(url.as_ref()))
        .filter(|url| !url.is_empty() && seen.insert(url.clone()))
        .collect()
}

fn cache_entry(outcome: &Outcome, manual: Option<ManualState>) -> CacheEntry {
    CacheEntry {
        status: outcome.result.status,
        ok: outcome.result.ok,
        last_checked: Utc::now(),
        error: outcome.result.error.clone(),
        hint: Some(outcome.hint),
        manual,
    }
}

fn panicked(url: &str, payload: Box<dyn Any + Send>) -> Outcome {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(url, panic = %message, "link check panicked");

    Outcome {
        result: CheckResult::failure(url, None, Error::CheckPanicked(message).to_string()),
        hint: Strategy::Manual,
        warning: None,
        attempts: Vec::new(),
    }
}
