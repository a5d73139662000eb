//! Link discovery in site content.
//!
//! Markdown and MDX sources go through a regex scanner, HTML through a real
//! parser; [`scan_content_dir`] walks a content tree with both and returns the
//! normalized external URLs together with the files that reference them.

pub mod links;
pub mod markdown;
pub mod scan;

pub use links::extract_html_urls;
pub use markdown::extract_markdown_urls;
pub use scan::{ScanReport, scan_content_dir};
