//! Content tree scanning: collect external URLs and where they are referenced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use linkvet_core::Error;
use linkvet_core::url::{is_internal, normalize_url_key, parse_http_url};

use super::links::extract_html_urls;
use super::markdown::extract_markdown_urls;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];
const SKIPPED_DIRS: &[&str] = &["node_modules"];

/// External URLs found under one or more content roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Normalized URL to the files referencing it, in scan order.
    pub urls: BTreeMap<String, Vec<PathBuf>>,
    pub files_scanned: usize,
}

impl ScanReport {
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URLs in sorted order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(String::as_str)
    }

    /// Files referencing `url`.
    pub fn sources(&self, url: &str) -> &[PathBuf] {
        self.urls.get(url).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn merge(&mut self, other: ScanReport) {
        self.files_scanned += other.files_scanned;
        for (url, files) in other.urls {
            let sources = self.urls.entry(url).or_default();
            for file in files {
                if !sources.contains(&file) {
                    sources.push(file);
                }
            }
        }
    }

    fn add(&mut self, url: String, file: &Path) {
        let sources = self.urls.entry(url).or_default();
        if !sources.iter().any(|f| f == file) {
            sources.push(file.to_path_buf());
        }
    }
}

/// Scan a content file or directory for external links.
///
/// Directories are walked recursively in sorted order, skipping hidden
/// directories and `node_modules`. Only Markdown and HTML files are read.
/// URLs whose host is one of `internal_domains` are left out.
///
/// # Errors
///
/// Returns [`Error::ContentIo`] if `root` or a directory under it cannot be
/// read. Individual files that cannot be read are skipped with a warning.
pub fn scan_content_dir(root: impl AsRef<Path>, internal_domains: &[String]) -> Result<ScanReport, Error> {
    let root = root.as_ref();
    let mut report = ScanReport::default();

    let meta = std::fs::metadata(root).map_err(|source| Error::ContentIo { path: root.to_path_buf(), source })?;
    if meta.is_file() {
        scan_file(root, internal_domains, &mut report);
    } else {
        walk(root, internal_domains, &mut report)?;
    }

    tracing::debug!(
        root = %root.display(),
        files = report.files_scanned,
        urls = report.len(),
        "content scan complete"
    );
    Ok(report)
}

fn walk(dir: &Path, internal_domains: &[String], report: &mut ScanReport) -> Result<(), Error> {
    let io_err = |source| Error::ContentIo { path: dir.to_path_buf(), source };

    let mut entries = std::fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_err)?;
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if file_type.is_dir() {
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()) {
                continue;
            }
            walk(&path, internal_domains, report)?;
        } else if file_type.is_file() {
            scan_file(&path, internal_domains, report);
        }
    }
    Ok(())
}

fn scan_file(path: &Path, internal_domains: &[String], report: &mut ScanReport) {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    let Some(ext) = ext else { return };

    let extractor: fn(&str) -> Vec<String> = if MARKDOWN_EXTENSIONS.contains(&ext.as_str()) {
        extract_markdown_urls
    } else if HTML_EXTENSIONS.contains(&ext.as_str()) {
        extract_html_urls
    } else {
        return;
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable content file");
            return;
        }
    };
    report.files_scanned += 1;

    for raw in extractor(&text) {
        let url = normalize_url_key(&raw);
        if parse_http_url(&url).is_err() || is_internal(&url, internal_domains) {
            continue;
        }
        report.add(url, path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_scans_markdown_and_html() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/a.md", "Read [docs](https://docs.example/guide).");
        write(dir.path(), "posts/b.mdx", "<Card href=\"https://docs.example/guide\" />");
        write(dir.path(), "pages/c.html", r#"<a href="https://other.example/?a=1&amp;b=2">x</a>"#);
        write(dir.path(), "notes.txt", "https://ignored.example/");

        let report = scan_content_dir(dir.path(), &[]).unwrap();

        assert_eq!(report.files_scanned, 3);
        let urls: Vec<_> = report.urls().collect();
        assert_eq!(urls, vec!["https://docs.example/guide", "https://other.example/?a=1&b=2"]);
        assert_eq!(report.sources("https://docs.example/guide").len(), 2);
    }

    #[test]
    fn test_skips_hidden_and_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".git/README.md", "https://hidden.example/");
        write(dir.path(), "node_modules/pkg/README.md", "https://dep.example/");
        write(dir.path(), "index.md", "https://visible.example/");

        let report = scan_content_dir(dir.path(), &[]).unwrap();
        assert_eq!(report.urls().collect::<Vec<_>>(), vec!["https://visible.example/"]);
    }

    #[test]
    fn test_internal_domains_excluded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "https://myblog.dev/about https://www.myblog.dev/x https://ext.example/");

        let report = scan_content_dir(dir.path(), &["myblog.dev".to_string()]).unwrap();
        assert_eq!(report.urls().collect::<Vec<_>>(), vec!["https://ext.example/"]);
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.md", "https://one.example/");

        let report = scan_content_dir(dir.path().join("one.md"), &[]).unwrap();
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_content_dir(dir.path().join("missing"), &[]).unwrap_err();
        assert_eq!(err.code(), "CONTENT_IO");
    }

    #[test]
    fn test_merge_unions_sources() {
        let mut a = ScanReport::default();
        a.add("https://x.example/".into(), Path::new("a.md"));
        a.files_scanned = 1;
        let mut b = ScanReport::default();
        b.add("https://x.example/".into(), Path::new("a.md"));
        b.add("https://x.example/".into(), Path::new("b.md"));
        b.files_scanned = 2;

        a.merge(b);
        assert_eq!(a.files_scanned, 3);
        assert_eq!(a.sources("https://x.example/"), &[PathBuf::from("a.md"), PathBuf::from("b.md")]);
    }
}
