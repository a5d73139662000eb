//! URL harvesting from HTML documents.

use scraper::{Html, Selector};
use std::collections::HashSet;

/// Elements and attributes that reference external resources.
const URL_ATTRIBUTES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("link[href]", "href"),
    ("img[src]", "src"),
    ("script[src]", "src"),
    ("iframe[src]", "src"),
    ("source[src]", "src"),
];

/// Extract absolute `http(s)` URLs from an HTML document.
///
/// Relative, fragment, `mailto:` and other non-web references are skipped.
/// Duplicates are dropped, keeping first-seen order per element kind.
pub fn extract_html_urls(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for (css, attr) in URL_ATTRIBUTES {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(value) = element.value().attr(attr) else {
                continue;
            };
            let value = value.trim();
            if !is_web_url(value) {
                continue;
            }
            if seen.insert(value.to_string()) {
                urls.push(value.to_string());
            }
        }
    }

    urls
}

fn is_web_url(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
