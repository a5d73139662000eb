//! Persistent JSON cache of external link verification outcomes.
//!
//! This module provides a single-document, key-sorted cache file keyed by
//! normalized URL. It supports:
//!
//! - Fail-open loading (missing or corrupt files become an empty cache)
//! - Freshness evaluation with manual override precedence
//! - Atomic, sorted saves that never persist the site's own domains
//! - Pruning of entries no longer referenced by content

pub mod entry;
pub mod file;
pub mod manual;

pub use entry::CacheEntry;
pub use file::{CACHE_VERSION, CacheFile, DEFAULT_CACHE_PATH};
pub use manual::{ManualState, normalize_manual_state};
