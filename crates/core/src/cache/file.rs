//! The on-disk cache document: load, save, prune.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::entry::CacheEntry;
use crate::Error;
use crate::url::is_internal;

/// Current cache document version.
pub const CACHE_VERSION: u32 = 1;

/// Default cache location, relative to the project root.
pub const DEFAULT_CACHE_PATH: &str = ".cache/validation/external-links.json";

/// The whole cache document.
///
/// Entries live in a `BTreeMap` so serialization is always key-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheFile {
    pub version: u32,
    #[serde(default)]
    pub entries: BTreeMap<String, CacheEntry>,
}

impl Default for CacheFile {
    fn default() -> Self {
        Self { version: CACHE_VERSION, entries: BTreeMap::new() }
    }
}

impl CacheFile {
    /// Load the cache from `path`.
    ///
    /// Never fails: a missing, unreadable or malformed file yields an empty cache.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no link cache found, starting empty");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read link cache, starting empty");
                Self::default()
            }
        }
    }

    /// Parse a cache document, falling back to an empty cache on any error.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<CacheFile>(text) {
            Ok(cache) if cache.version == CACHE_VERSION => cache,
            Ok(cache) => {
                tracing::warn!(version = cache.version, "unsupported link cache version, starting empty");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed link cache, starting empty");
                Self::default()
            }
        }
    }

    /// Serialize with sorted keys, dropping internal-domain entries, with a trailing newline.
    pub fn to_json(&self, internal_domains: &[String]) -> Result<String, Error> {
        let entries: BTreeMap<&str, &CacheEntry> = self
            .entries
            .iter()
            .filter(|(url, _)| !is_internal(url, internal_domains))
            .map(|(url, entry)| (url.as_str(), entry))
            .collect();

        #[derive(Serialize)]
        struct Doc<'a> {
            version: u32,
            entries: BTreeMap<&'a str, &'a CacheEntry>,
        }

        let mut json = serde_json::to_string_pretty(&Doc { version: self.version, entries })?;
        json.push('\n');
        Ok(json)
    }

    /// Write the cache to `path`, creating parent directories.
    ///
    /// The document is written to a sibling temp file and renamed into place,
    /// so a crash never leaves a torn cache behind.
    pub async fn save(&self, path: impl AsRef<Path>, internal_domains: &[String]) -> Result<(), Error> {
        let path = path.as_ref();
        let json = self.to_json(internal_domains)?;
        let io_err = |source| Error::CacheIo { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let tmp = temp_path(path);
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;

        tracing::debug!(path = %path.display(), entries = self.entries.len(), "saved link cache");
        Ok(())
    }

    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(url)
    }

    /// Insert or replace the entry for `url`.
    pub fn record(&mut self, url: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(url.into(), entry);
    }

    /// Remove every entry whose key is not in `live_urls`; returns how many were removed.
    pub fn prune(&mut self, live_urls: &HashSet<String>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|url, _| live_urls.contains(url));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
