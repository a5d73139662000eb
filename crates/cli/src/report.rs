//! Human-readable rendering of a validation report.

use std::fmt::Write as _;

use linkvet_client::{ExternalUrlCheckResult, ScanReport, ValidationReport};

/// Render failures and warnings with their source files, then a summary line.
pub fn render(report: &ValidationReport, scan: &ScanReport) -> String {
    let mut out = String::new();

    for result in report.failures() {
        let _ = writeln!(out, "FAIL {}{}", result.url, detail(result));
        sources(&mut out, scan, &result.url);
    }
    for result in report.warnings().filter(|r| r.ok) {
        let warning = result.warning.as_deref().unwrap_or_default();
        let _ = writeln!(out, "WARN {} ({warning}){}", result.url, detail(result));
        sources(&mut out, scan, &result.url);
    }

    let s = &report.summary;
    let _ = writeln!(
        out,
        "{} links: {} from cache, {} checked, {} warnings, {} failed",
        s.total, s.from_cache, s.checked, s.warnings, s.failed
    );
    out
}

fn detail(result: &ExternalUrlCheckResult) -> String {
    let mut parts = Vec::new();
    if let Some(error) = &result.error {
        parts.push(error.clone());
    } else if let Some(status) = result.status {
        parts.push(format!("HTTP {status}"));
    }
    if let Some(hint) = result.hint {
        parts.push(format!("via {hint}"));
    }
    if parts.is_empty() { String::new() } else { format!(" [{}]", parts.join(", ")) }
}

fn sources(out: &mut String, scan: &ScanReport, url: &str) {
    for file in scan.sources(url) {
        let _ = writeln!(out, "     in {}", file.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkvet_client::ValidationSummary;
    use linkvet_core::Strategy;

    fn result(url: &str, ok: bool, error: Option<&str>, warning: Option<&str>) -> ExternalUrlCheckResult {
        ExternalUrlCheckResult {
            url: url.to_string(),
            ok,
            status: Some(if ok { 200 } else { 404 }),
            error: error.map(String::from),
            from_cache: false,
            hint: Some(Strategy::Manual),
            warning: warning.map(String::from),
        }
    }

    #[test]
    fn test_render_failures_warnings_and_summary() {
        let report = ValidationReport {
            results: vec![
                result("https://ok.example/", true, None, None),
                result("https://gone.example/", false, Some("HTTP 404"), None),
                result("https://walled.example/", true, Some("HTTP 403"), Some("manual validation pending")),
            ],
            summary: ValidationSummary { total: 3, from_cache: 1, checked: 2, warnings: 1, failed: 1 },
        };
        let text = render(&report, &ScanReport::default());

        assert!(text.contains("FAIL https://gone.example/ [HTTP 404, via manual]"));
        assert!(text.contains("WARN https://walled.example/ (manual validation pending)"));
        assert!(!text.contains("ok.example"));
        assert!(text.ends_with("3 links: 1 from cache, 2 checked, 1 warnings, 1 failed\n"));
    }
}
