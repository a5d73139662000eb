//! Core types and shared functionality for linkvet.
//!
//! This crate provides:
//! - Persistent JSON link cache with freshness rules
//! - The verification strategy ladder
//! - URL key normalization and host matching
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod strategy;
pub mod url;

pub use cache::{CacheEntry, CacheFile, ManualState};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use strategy::Strategy;
