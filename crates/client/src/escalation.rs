//! Strategy escalation for a single URL.
//!
//! The walk starts at the cached hint (or the cheapest strategy), moves
//! forward one rung per failure, and stops at the first success. If every
//! live strategy fails, the manual step decides from cached operator state.
//!
//! Every live attempt is wrapped as `limiter -> host throttle -> probe`.
//! Limiter permits are always taken before the host slot, so the two never
//! wait on each other in opposite order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use linkvet_core::{CacheEntry, ManualState, Strategy};

use crate::limiter::ConcurrencyLimiter;
use crate::probe::{CheckResult, Probe, ProbeSet};
use crate::throttle::HostThrottle;

/// Warning attached to soft-pass manual results.
pub const MANUAL_PENDING_WARNING: &str = "manual validation pending";

/// Final outcome of one escalation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub result: CheckResult,
    /// Strategy that produced `result`; persisted as the cache hint.
    pub hint: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Strategies attempted, in order.
    pub attempts: Vec<Strategy>,
}

/// Walks the strategy ladder for individual URLs.
pub struct Escalation {
    probes: ProbeSet,
    throttle: Arc<HostThrottle>,
    general: ConcurrencyLimiter,
    engine: ConcurrencyLimiter,
    expected_status: u16,
}

impl Escalation {
    pub fn new(
        probes: ProbeSet, throttle: Arc<HostThrottle>, general: ConcurrencyLimiter, engine: ConcurrencyLimiter,
        expected_status: u16,
    ) -> Self {
        Self { probes, throttle, general, engine, expected_status }
    }

    pub fn general_limiter(&self) -> &ConcurrencyLimiter {
        &self.general
    }

    pub fn engine_limiter(&self) -> &ConcurrencyLimiter {
        &self.engine
    }

    /// Verify `url`, resuming from `cached`'s hint unless `force_full_check` is set.
    ///
    /// With `force_full_check`, cached hint and manual state are ignored entirely.
    pub async fn run(&self, url: &str, cached: Option<&CacheEntry>, force_full_check: bool) -> Outcome {
        let cached = if force_full_check { None } else { cached };
        let mut current = Strategy::resume_from(cached.and_then(|c| c.hint));
        let mut attempts = Vec::new();
        let mut last_failure: Option<CheckResult> = None;

        while let Some((limiter, probe)) = self.lane(current) {
            attempts.push(current);
            let result = limiter.run(self.throttle.run(url, probe.check(url))).await;

            tracing::debug!(url, strategy = %current, ok = result.ok, status = ?result.status, "strategy attempted");

            if result.ok {
                return Outcome { result, hint: current, warning: None, attempts };
            }

            last_failure = Some(result);
            current = match current.next() {
                Some(next) => next,
                None => break,
            };
        }

        attempts.push(Strategy::Manual);
        let (result, warning) = evaluate_manual(url, cached, last_failure.as_ref(), self.expected_status);
        Outcome { result, hint: Strategy::Manual, warning, attempts }
    }

    /// Limiter and probe for a live strategy; `None` once only the manual step is left.
    fn lane(&self, strategy: Strategy) -> Option<(&ConcurrencyLimiter, &dyn Probe)> {
        match strategy {
            Strategy::PlainRequest => Some((&self.general, self.probes.plain.as_ref())),
            Strategy::BrowserAgent => Some((&self.general, self.probes.browser_agent.as_ref())),
            Strategy::BrowserEngine => Some((&self.engine, self.probes.engine.as_ref())),
            Strategy::Manual => None,
        }
    }
}

/// Decide a URL's outcome from operator state once live strategies are exhausted.
///
/// - `manual: false` fails, surfacing the last known status/error
/// - `manual: true` passes with the expected status
/// - absent or `"auto"` soft-passes with [`MANUAL_PENDING_WARNING`]
///
/// The last failure of this run takes precedence over the cached one when
/// surfacing status and error.
pub fn evaluate_manual(
    url: &str, cached: Option<&CacheEntry>, last_failure: Option<&CheckResult>, expected_status: u16,
) -> (CheckResult, Option<String>) {
    let (status, error) = match (last_failure, cached) {
        (Some(failure), _) => (failure.status, failure.error.clone()),
        (None, Some(entry)) => (entry.status, entry.error.clone()),
        (None, None) => (None, None),
    };

    match cached.and_then(|c| c.manual) {
        Some(ManualState::Fail) => {
            let error = error.unwrap_or_else(|| "marked unavailable by manual override".to_string());
            (CheckResult::failure(url, status, error), None)
        }
        Some(ManualState::Pass) => (CheckResult::success(url, expected_status), None),
        Some(ManualState::Auto) | None => {
            let result = CheckResult { url: url.to_string(), ok: true, status, error };
            (result, Some(MANUAL_PENDING_WARNING.to_string()))
        }
    }
}
