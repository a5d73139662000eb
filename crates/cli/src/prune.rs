//! `linkvet prune`: drop cache entries for links no longer in content.

use std::collections::HashSet;
use std::process::ExitCode;

use anyhow::{Context, Result};

use linkvet_core::{AppConfig, CacheFile};

use crate::args::PruneArgs;
use crate::scan::scan;

pub async fn run(args: PruneArgs) -> Result<ExitCode> {
    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(path) = &args.cache {
        config.cache_path = path.clone();
    }

    let report = scan(args.scan_paths(), config.internal_domains.clone()).await?;
    let live: HashSet<String> = report.urls().map(String::from).collect();

    let mut cache = CacheFile::load(&config.cache_path).await;
    let before = cache.len();
    let removed = cache.prune(&live);

    if args.dry_run {
        println!("would remove {removed} of {before} cache entries");
        return Ok(ExitCode::SUCCESS);
    }

    if removed > 0 {
        cache
            .save(&config.cache_path, &config.internal_domains)
            .await
            .with_context(|| format!("failed to save {}", config.cache_path.display()))?;
    }
    tracing::info!(removed, remaining = cache.len(), path = %config.cache_path.display(), "cache pruned");
    println!("removed {removed} of {before} cache entries");

    Ok(ExitCode::SUCCESS)
}
