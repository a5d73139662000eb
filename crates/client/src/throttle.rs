//! Per-host request pacing.
//!
//! Each throttled host owns a FIFO slot. A task for that host waits for the
//! slot, sleeps until the host's next permitted start time, pushes that time
//! forward by the configured interval, and runs while still holding the slot.
//! Requests to one host therefore never overlap and start at least one
//! interval apart, in arrival order. This is a queue, not a token bucket:
//! bursts are smoothed, never admitted.
//!
//! Hosts matching the exempt list (exact host or parent domain) and URLs
//! without a parseable host skip the queue entirely.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use linkvet_core::url::{host_matches, host_of};

/// Scheduling state for one host.
#[derive(Debug, Default)]
struct HostSlot {
    next_available: Option<Instant>,
}

/// Per-host throttle shared by every strategy in a run.
#[derive(Debug)]
pub struct HostThrottle {
    interval: Duration,
    exempt: Vec<String>,
    hosts: Mutex<HashMap<String, Arc<Mutex<HostSlot>>>>,
}

impl HostThrottle {
    pub fn new(interval: Duration, exempt: Vec<String>) -> Self {
        Self { interval, exempt, hosts: Mutex::new(HashMap::new()) }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_exempt(&self, host: &str) -> bool {
        self.exempt.iter().any(|domain| host_matches(host, domain))
    }

    async fn slot(&self, host: &str) -> Arc<Mutex<HostSlot>> {
        let mut hosts = self.hosts.lock().await;
        hosts.entry(host.to_string()).or_default().clone()
    }

    /// Run `task` under the pacing rules for `url`'s host.
    pub async fn run<F: Future>(&self, url: &str, task: F) -> F::Output {
        let Some(host) = host_of(url) else {
            return task.await;
        };
        if self.is_exempt(&host) {
            return task.await;
        }

        let slot = self.slot(&host).await;
        let mut slot = slot.lock().await;

        let now = Instant::now();
        if let Some(next) = slot.next_available
            && next > now
        {
            let wait = next - now;
            tracing::trace!(host = %host, wait_ms = wait.as_millis() as u64, "throttling host");
            tokio::time::sleep(wait).await;
        }
        slot.next_available = Some(Instant::now() + self.interval);

        task.await
    }

    /// Number of hosts that have been throttled so far.
    pub async fn tracked_hosts(&self) -> usize {
        self.hosts.lock().await.len()
    }
}
