//! `linkvet check`: scan content, validate external links, report.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use linkvet_client::{Progress, ProgressFn, ValidateOptions, ValidationReport, validate_external_urls};
use linkvet_core::AppConfig;

use crate::args::CheckArgs;
use crate::report;
use crate::scan::scan;

pub async fn run(args: CheckArgs) -> Result<ExitCode> {
    let mut config = AppConfig::load().context("failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let scanned = scan(args.scan_paths(), config.internal_domains.clone()).await?;
    let mut urls: Vec<String> = scanned.urls().map(String::from).collect();
    urls.extend(args.urls.iter().cloned());
    if args.stdin {
        urls.extend(read_stdin_urls().await?);
    }

    tracing::info!(files = scanned.files_scanned, urls = urls.len(), "collected external links");

    let mut options = ValidateOptions::from(&config);
    options.force_full_check = args.force_full_check;
    options.on_progress = Some(progress_logger());

    let report = validate_external_urls(urls, options).await.context("link validation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).context("failed to encode report")?);
    } else {
        print!("{}", report::render(&report, &scanned));
    }

    Ok(if should_fail(&report, args.strict) { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Any failure fails the run; warnings only under `--strict`.
fn should_fail(report: &ValidationReport, strict: bool) -> bool {
    report.has_failures() || (strict && report.summary.warnings > 0)
}

/// Non-empty, non-comment lines from stdin.
async fn read_stdin_urls() -> Result<Vec<String>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut urls = Vec::new();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            urls.push(line.to_string());
        }
    }
    Ok(urls)
}

/// Log once per completed check, ignoring in-progress transitions.
fn progress_logger() -> ProgressFn {
    let logged = Arc::new(AtomicUsize::new(0));
    Arc::new(move |p: Progress| {
        if p.checked > logged.fetch_max(p.checked, Ordering::SeqCst) {
            tracing::info!(
                checked = p.checked,
                total = p.total,
                success = p.success,
                failed = p.failed,
                in_progress = p.in_progress,
                "progress"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkvet_client::ValidationSummary;

    fn report(warnings: usize, failed: usize) -> ValidationReport {
        ValidationReport {
            results: Vec::new(),
            summary: ValidationSummary { total: 5, from_cache: 0, checked: 5, warnings, failed },
        }
    }

    #[test]
    fn test_failures_always_fail() {
        assert!(should_fail(&report(0, 1), false));
        assert!(should_fail(&report(0, 1), true));
    }

    #[test]
    fn test_warnings_fail_only_when_strict() {
        assert!(!should_fail(&report(2, 0), false));
        assert!(should_fail(&report(2, 0), true));
        assert!(!should_fail(&report(0, 0), true));
    }
}
