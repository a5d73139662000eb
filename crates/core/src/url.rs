//! URL key normalization and host matching.
//!
//! Cache keys are case-preserved: only whitespace is trimmed and HTML entities
//! (left behind by scanners reading raw HTML attributes) are decoded. Host
//! comparisons are always done on the lowercased host.

/// Error type for URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Normalize a raw URL string into a cache key.
///
/// 1. Trim leading/trailing whitespace
/// 2. Decode HTML entities (`&amp;`, `&#38;`, `&#x26;`, ...)
/// 3. Preserve case everywhere
pub fn normalize_url_key(raw: &str) -> String {
    decode_html_entities(raw.trim()).trim().to_string()
}

/// Decode the HTML entities that commonly survive link extraction.
///
/// Unknown or malformed entities are left untouched.
pub fn decode_html_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Parse a URL that is eligible for a live check (http or https only).
pub fn parse_http_url(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Lowercased host of a URL, or `None` if it cannot be parsed or has no host.
pub fn host_of(input: &str) -> Option<String> {
    let parsed = url::Url::parse(input.trim()).ok()?;
    parsed.host_str().filter(|h| !h.is_empty()).map(|h| h.to_ascii_lowercase())
}

/// Whether `host` equals `domain` or is a subdomain of it.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('.');
    if domain.is_empty() {
        return false;
    }
    let host = host.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// Whether a URL points at one of the site's own domains.
pub fn is_internal(input: &str, internal_domains: &[String]) -> bool {
    match host_of(input) {
        Some(host) => internal_domains.iter().any(|d| host_matches(&host, d)),
        None => false,
    }
}
