//! Unified error types for linkvet.
//!
//! Display strings carry a stable `CODE: message` prefix so CI logs can be
//! grepped by failure class.

use std::path::PathBuf;

/// Unified error types for the link validator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., zero concurrency).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// URL could not be parsed or uses an unsupported scheme.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Cache file could not be written.
    #[error("CACHE_IO: {}: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content file or directory could not be read while scanning for links.
    #[error("CONTENT_IO: {}: {source}", path.display())]
    ContentIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache document could not be serialized.
    #[error("CACHE_ENCODE: {0}")]
    CacheEncode(#[from] serde_json::Error),

    /// HTTP client construction or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Request exceeded the per-check timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Browser-engine strategy is disabled in this build or config.
    #[error("RENDER_DISABLED")]
    RenderDisabled,

    /// Browser-engine navigation failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    /// A single URL check panicked and was contained.
    #[error("CHECK_PANICKED: {0}")]
    CheckPanicked(String),
}

impl Error {
    /// Short machine-readable code for this error class.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::CacheIo { .. } => "CACHE_IO",
            Error::ContentIo { .. } => "CONTENT_IO",
            Error::CacheEncode(_) => "CACHE_ENCODE",
            Error::HttpError(_) => "HTTP_ERROR",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::RenderDisabled => "RENDER_DISABLED",
            Error::RenderFailed(_) => "RENDER_FAILED",
            Error::CheckPanicked(_) => "CHECK_PANICKED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("INVALID_URL"));
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_cache_io_display_includes_path() {
        let err = Error::CacheIo {
            path: PathBuf::from("/tmp/cache.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("CACHE_IO: /tmp/cache.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_code_matches_display_prefix() {
        let errors = [
            Error::InvalidInput("x".into()),
            Error::HttpError("x".into()),
            Error::FetchTimeout("x".into()),
            Error::RenderFailed("x".into()),
            Error::CheckPanicked("x".into()),
            Error::RenderDisabled,
        ];
        for err in errors {
            assert!(err.to_string().starts_with(err.code()));
        }
    }
}
