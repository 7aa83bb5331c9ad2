//! Article extraction pipeline: fetch a web page, strip boilerplate, and
//! infer best-effort metadata.
//!
//! The pipeline is strictly sequential: fetch → DOM parse → head metadata →
//! readable-content reduction → merge. Callers validate URLs with
//! [`is_valid_url`] before invoking [`ArticleExtractor::fetch_and_parse_url`];
//! the orchestrator itself does not re-validate. Every failure between the
//! fetch and the merge funnels through one wrapping rule and surfaces as a
//! single `"URL parsing failed: …"` error — no retries, no partial results.

use quill_http::HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub mod fetch;
pub mod metadata;
pub mod readable;

pub use fetch::{FetchedPage, DESKTOP_USER_AGENT};
pub use metadata::PageMetadata;
pub use readable::ReadableContent;

/// Errors raised inside the extraction pipeline.
///
/// Only [`ExtractError::Failed`] escapes to callers of the orchestrator; the
/// other variants exist so the individual steps stay testable on their own.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to fetch URL: {0}")]
    Fetch(String),
    #[error("Failed to parse article content")]
    NoArticle,
    #[error("Failed to extract article text")]
    EmptyArticle,
    #[error("URL parsing failed: {0}")]
    Failed(String),
}

/// The extractor's sole output. `content` is never empty on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub content: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// Syntactic URL validation: well-formed and scheme is exactly `http` or
/// `https`. Parse failures are classified as `false`, never raised. No
/// network access occurs here.
pub fn is_valid_url(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Orchestrates the fetch-and-reduce pipeline over a shared HTTP client.
#[derive(Clone)]
pub struct ArticleExtractor {
    http: HttpClient,
    user_agent: String,
}

impl ArticleExtractor {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }

    /// Override the `User-Agent` sent by the page fetcher.
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Fetch `url` and reduce it to an [`ExtractedArticle`].
    ///
    /// Any error raised by the fetch, parse, or reduction steps is caught
    /// exactly once here and re-surfaced with the `"URL parsing failed: "`
    /// prefix followed by the cause.
    pub async fn fetch_and_parse_url(&self, url: &str) -> Result<ExtractedArticle, ExtractError> {
        match self.run_pipeline(url).await {
            Ok(article) => Ok(article),
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "extract.pipeline.failed");
                Err(ExtractError::Failed(err.to_string()))
            }
        }
    }

    async fn run_pipeline(&self, url: &str) -> Result<ExtractedArticle, ExtractError> {
        let page = fetch::fetch_page(&self.http, url, &self.user_agent).await?;

        // Head metadata is read from our own DOM parse; the readability pass
        // re-parses internally, anchored to the resolved URL so relative
        // references inside the article resolve correctly.
        let doc = scraper::Html::parse_document(&page.html);
        let meta = metadata::extract_metadata(&doc);
        let readable = readable::extract_readable(&page.html, &page.resolved_url)?;

        let article = merge_article(readable, meta);
        tracing::debug!(
            url = %url,
            resolved = %page.resolved_url,
            title = %article.title,
            content_len = article.content.len(),
            has_author = article.author.is_some(),
            "extract.pipeline.done"
        );
        Ok(article)
    }
}

/// Merge policy: the readable extractor wins for title/byline/excerpt, head
/// metadata fills the gaps, and `"Untitled"` is the title of last resort.
/// Publication comes from metadata only.
fn merge_article(readable: ReadableContent, meta: PageMetadata) -> ExtractedArticle {
    ExtractedArticle {
        content: readable.text,
        title: readable
            .title
            .or(meta.title)
            .unwrap_or_else(|| "Untitled".to_string()),
        author: readable.byline.or(meta.author),
        publication: meta.publication,
        excerpt: readable.excerpt,
    }
}
