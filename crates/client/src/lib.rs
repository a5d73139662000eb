//! Live verification of external links.
//!
//! This crate provides the strategy probes (plain HTTP, browser-identified
//! HTTP, headless browser), the per-host throttle and concurrency limiters,
//! the escalation walk, the batch driver and the content scanner used by the
//! CLI.

pub mod escalation;
pub mod extract;
pub mod fetch;
pub mod limiter;
pub mod probe;
pub mod render;
pub mod throttle;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use escalation::{Escalation, MANUAL_PENDING_WARNING, Outcome, evaluate_manual};
pub use extract::{ScanReport, extract_html_urls, extract_markdown_urls, scan_content_dir};
pub use fetch::{FetchClient, FetchConfig};
pub use limiter::ConcurrencyLimiter;
pub use probe::{CheckResult, Probe, ProbeSet};
pub use render::{BrowserEngine, RenderError, RenderOptions};
pub use throttle::HostThrottle;
pub use validate::{
    ExternalUrlCheckResult, Progress, ProgressFn, ValidateOptions, ValidationReport, ValidationSummary, Validator,
    validate_external_urls,
};
