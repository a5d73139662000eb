//! Content scanning shared by the subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};

use linkvet_client::{ScanReport, scan_content_dir};

/// Scan every path on a blocking thread and merge the results.
pub async fn scan(paths: Vec<PathBuf>, internal_domains: Vec<String>) -> Result<ScanReport> {
    tokio::task::spawn_blocking(move || -> Result<ScanReport> {
        let mut report = ScanReport::default();
        for path in &paths {
            let found = scan_content_dir(path, &internal_domains)
                .with_context(|| format!("failed to scan {}", path.display()))?;
            report.merge(found);
        }
        Ok(report)
    })
    .await
    .context("content scan task failed")?
}
