//! Reader-mode content reduction.
//!
//! Delegates boilerplate removal (navigation, ads, scripts) to
//! `dom_smoothie`, a Readability-style reduction algorithm, and normalises
//! its output: text is trimmed, and a structurally successful extraction
//! whose text trims to nothing still counts as a failure.

use dom_smoothie::Readability;
use url::Url;

use crate::ExtractError;

/// Main article text plus whatever the reduction algorithm learned about it.
#[derive(Debug, Clone)]
pub struct ReadableContent {
    /// Non-empty, trimmed article text.
    pub text: String,
    pub title: Option<String>,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
}

/// Reduce a page to its readable content, anchored to `url` so relative
/// references inside the article resolve correctly.
pub fn extract_readable(html: &str, url: &Url) -> Result<ReadableContent, ExtractError> {
    let mut readability = Readability::new(html, Some(url.as_str()), None)
        .map_err(|e| no_article(url, &e.to_string()))?;
    let article = readability
        .parse()
        .map_err(|e| no_article(url, &e.to_string()))?;

    let text = article.text_content.trim().to_string();
    if text.is_empty() {
        tracing::debug!(url = %url, "extract.readable.empty_text");
        return Err(ExtractError::EmptyArticle);
    }

    Ok(ReadableContent {
        text,
        title: non_empty(article.title),
        byline: article.byline.and_then(non_empty),
        excerpt: article.excerpt.and_then(non_empty),
    })
}

fn no_article(url: &Url, cause: &str) -> ExtractError {
    tracing::debug!(url = %url, cause = %cause, "extract.readable.no_article");
    ExtractError::NoArticle
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/story").unwrap()
    }

    fn article_page(body: &str) -> String {
        format!(
            "<html><head><title>Story</title></head><body><article>{body}</article></body></html>"
        )
    }

    #[test]
    fn extracts_main_text_from_a_plain_article() {
        let para = "The quick brown fox jumps over the lazy dog and keeps \
                    running through the quiet field until the sun finally sets \
                    behind the distant hills of the old valley town."
            .repeat(2);
        let html = article_page(&format!("<p>{para}</p><p>{para}</p><p>{para}</p>"));

        let readable = extract_readable(&html, &base_url()).expect("article expected");
        assert!(readable.text.contains("quick brown fox"));
        assert!(!readable.text.trim().is_empty());
    }

    #[test]
    fn whitespace_only_content_is_an_error() {
        let html = article_page("<p>   </p><p>\n\t</p>");
        assert!(extract_readable(&html, &base_url()).is_err());
    }

    #[test]
    fn non_empty_filters_blank_strings() {
        assert_eq!(non_empty("  ".into()), None);
        assert_eq!(non_empty(" x ".into()).as_deref(), Some("x"));
    }
}
