//! URL harvesting from Markdown (and MDX) sources.
//!
//! Inline links and images, autolinks, reference definitions and bare URLs all
//! reduce to the same thing once code is stripped: an `http(s)://` run ending
//! at whitespace, a quote, a bracket or an angle bracket. Trailing sentence
//! punctuation and unbalanced closing parentheses are trimmed off.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s<>"'`\[\]{}|\\^]+"#).expect("valid URL pattern"));

static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`\n]+`").expect("valid code span pattern"));

/// Extract absolute `http(s)` URLs from Markdown text in first-seen order.
///
/// Fenced code blocks and inline code spans are ignored.
pub fn extract_markdown_urls(text: &str) -> Vec<String> {
    let prose = strip_code(text);

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for found in URL.find_iter(&prose) {
        let url = trim_trailing(found.as_str());
        if url.len() <= "https://".len() {
            continue;
        }
        if seen.insert(url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Drop fenced blocks (``` or ~~~) and inline code spans.
fn strip_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut fence: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        match fence {
            Some(marker) => {
                if trimmed.starts_with(marker) {
                    fence = None;
                }
            }
            None if trimmed.starts_with("```") => fence = Some("```"),
            None if trimmed.starts_with("~~~") => fence = Some("~~~"),
            None => {
                out.push_str(&INLINE_CODE.replace_all(line, ""));
                out.push('\n');
            }
        }
    }
    out
}

fn trim_trailing(mut url: &str) -> &str {
    while let Some(last) = url.chars().last() {
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '*' | '_' | '~' => true,
            ')' => url.matches('(').count() < url.matches(')').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_links_and_images() {
        let md = r#"See [the docs](https://docs.example.com/guide "Guide") and ![logo](https://img.example/logo.png)."#;
        assert_eq!(extract_markdown_urls(md), vec!["https://docs.example.com/guide", "https://img.example/logo.png"]);
    }

    #[test]
    fn test_autolinks_and_reference_definitions() {
        let md = "Visit <https://auto.example/path>.\n\n[ref]: https://ref.example/page \"Title\"\n";
        assert_eq!(extract_markdown_urls(md), vec!["https://auto.example/path", "https://ref.example/page"]);
    }

    #[test]
    fn test_bare_urls_trim_punctuation() {
        let md = "Bare: https://bare.example/a, and (https://paren.example/b). Also **https://bold.example/c**!";
        assert_eq!(
            extract_markdown_urls(md),
            vec!["https://bare.example/a", "https://paren.example/b", "https://bold.example/c"]
        );
    }

    #[test]
    fn test_balanced_parentheses_kept() {
        let md = "[Rust](https://en.wikipedia.org/wiki/Rust_(programming_language))";
        assert_eq!(extract_markdown_urls(md), vec!["https://en.wikipedia.org/wiki/Rust_(programming_language)"]);
    }

    #[test]
    fn test_link_text_url_separate_from_target() {
        let md = "[https://shown.example](https://target.example/x)";
        assert_eq!(extract_markdown_urls(md), vec!["https://shown.example", "https://target.example/x"]);
    }

    #[test]
    fn test_code_is_ignored() {
        let md = "Run `curl https://inline.example/` first.

```sh
curl https://fenced.example/
```

Then https://real.example/ works.
";
        assert_eq!(extract_markdown_urls(md), vec!["https://real.example/"]);
    }

    #[test]
    fn test_html_in_markdown() {
        let md = r#"<a href="https://embedded.example/page?a=1&amp;b=2">x</a>"#;
        assert_eq!(extract_markdown_urls(md), vec!["https://embedded.example/page?a=1&amp;b=2"]);
    }

    #[test]
    fn test_duplicates_dropped() {
        let md = "https://dup.example/ and again https://dup.example/.";
        assert_eq!(extract_markdown_urls(md), vec!["https://dup.example/"]);
    }

    #[test]
    fn test_relative_and_bare_scheme_ignored() {
        assert!(extract_markdown_urls("[about](/about) and https:// alone").is_empty());
    }
}
