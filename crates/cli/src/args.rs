//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use linkvet_core::AppConfig;

/// Content directory scanned when no paths or URLs are given.
pub const DEFAULT_CONTENT_DIR: &str = "content";

#[derive(Debug, Parser)]
#[command(name = "linkvet", version, about = "Validate external links in site content against a persistent cache")]
pub struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan content and verify every external link.
    Check(CheckArgs),
    /// Drop cache entries for URLs no longer referenced by content.
    Prune(PruneArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Content files or directories to scan (default: `content`).
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Extra URL to check; may be repeated.
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Read additional URLs from stdin, one per line.
    #[arg(long, default_value_t = false)]
    pub stdin: bool,

    /// Ignore cache freshness, hints and manual state for this run.
    #[arg(long, default_value_t = false)]
    pub force_full_check: bool,

    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    #[arg(long, value_name = "N")]
    pub max_age_days: Option<i64>,

    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    #[arg(long, value_name = "N")]
    pub playwright_concurrency: Option<usize>,

    /// Never launch a headless browser.
    #[arg(long, default_value_t = false)]
    pub no_render: bool,

    /// Print the full report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Treat manual-pending warnings as failures.
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

impl CheckArgs {
    /// Layer command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.cache {
            config.cache_path = path.clone();
        }
        if let Some(days) = self.max_age_days {
            config.max_age_days = days;
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        if let Some(n) = self.concurrency {
            config.concurrency = n;
        }
        if let Some(n) = self.playwright_concurrency {
            config.playwright_concurrency = n;
        }
        if self.no_render {
            config.render_enabled = false;
        }
    }

    /// Paths to scan, falling back to the default content directory when
    /// nothing else was asked for.
    pub fn scan_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() && self.urls.is_empty() && !self.stdin {
            vec![PathBuf::from(DEFAULT_CONTENT_DIR)]
        } else {
            self.paths.clone()
        }
    }
}

#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Content files or directories to scan (default: `content`).
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Report what would be removed without writing the cache.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl PruneArgs {
    pub fn scan_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() { vec![PathBuf::from(DEFAULT_CONTENT_DIR)] } else { self.paths.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(args: &[&str]) -> CheckArgs {
        let cli = Cli::try_parse_from(std::iter::once("linkvet").chain(args.iter().copied())).unwrap();
        match cli.command {
            Command::Check(args) => args,
            Command::Prune(_) => panic!("expected check"),
        }
    }

    #[test]
    fn test_check_overrides_apply() {
        let args = check(&["check", "docs", "--cache", "/tmp/c.json", "--timeout-ms", "500", "--no-render"]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.cache_path, PathBuf::from("/tmp/c.json"));
        assert_eq!(config.timeout_ms, 500);
        assert!(!config.render_enabled);
        assert_eq!(config.concurrency, 10);
        assert_eq!(args.scan_paths(), vec![PathBuf::from("docs")]);
    }

    #[test]
    fn test_out_of_range_override_fails_validation() {
        let args = check(&["check", "--max-age-days", "1000000000000000"]);
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_content_dir_only_without_other_input() {
        assert_eq!(check(&["check"]).scan_paths(), vec![PathBuf::from("content")]);
        assert!(check(&["check", "--url", "https://example.com/"]).scan_paths().is_empty());
        assert!(check(&["check", "--stdin"]).scan_paths().is_empty());
    }

    #[test]
    fn test_repeated_urls_and_global_flag() {
        let argv = ["linkvet", "check", "--url", "https://a.example/", "--url", "https://b.example/", "--log-json"];
        let cli = Cli::try_parse_from(argv).unwrap();
        assert!(cli.log_json);
        let Command::Check(args) = cli.command else { panic!("expected check") };
        assert_eq!(args.urls.len(), 2);
    }

    #[test]
    fn test_prune_args() {
        let cli = Cli::try_parse_from(["linkvet", "prune", "--dry-run"]).unwrap();
        let Command::Prune(args) = cli.command else { panic!("expected prune") };
        assert!(args.dry_run);
        assert_eq!(args.scan_paths(), vec![PathBuf::from("content")]);
    }
}
