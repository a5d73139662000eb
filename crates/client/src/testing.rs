//! Scripted probes for exercising escalation and validation without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::probe::{CheckResult, Probe};

/// Probe answering with a fixed status per URL (`None` means a transport error).
pub(crate) struct Scripted {
    reply: Option<u16>,
    overrides: HashMap<String, Option<u16>>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Scripted {
    pub(crate) fn build(reply: Option<u16>, overrides: &[(&str, Option<u16>)], delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply,
            overrides: overrides.iter().map(|(url, status)| (url.to_string(), *status)).collect(),
            delay,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub(crate) fn always(reply: Option<u16>) -> Arc<Self> {
        Self::build(reply, &[], Duration::ZERO)
    }

    pub(crate) fn all_ok() -> (Arc<Self>, Arc<Self>, Arc<Self>) {
        (Self::always(Some(200)), Self::always(Some(200)), Self::always(Some(200)))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn called_with(&self, url: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == url)
    }

    /// Highest number of overlapping `check` calls seen.
    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Probe for Scripted {
    async fn check(&self, url: &str) -> CheckResult {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.overrides.get(url).copied().unwrap_or(self.reply) {
            Some(status) => CheckResult::from_status(url, status, 200),
            None => CheckResult::failure(url, None, "connection refused"),
        }
    }
}

/// Probe that panics on every check.
pub(crate) struct Panics;

#[async_trait::async_trait]
impl Probe for Panics {
    async fn check(&self, _url: &str) -> CheckResult {
        panic!("browser crashed");
    }
}
