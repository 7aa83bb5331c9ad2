//! Best-effort head-metadata inference.
//!
//! Pure inspection of the parsed document; never fails. Absent metadata
//! propagates as unset fields — a field is never defaulted to `""`.

use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Title/author/publication candidates scraped from `<head>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publication: Option<String>,
}

static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static TWITTER_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="twitter:title"]"#));
static DOC_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));

static META_AUTHOR: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[name="author"]"#));
static ARTICLE_AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="article:author"]"#));
static TWITTER_CREATOR: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="twitter:creator"]"#));

static OG_SITE_NAME: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:site_name"]"#));
static ARTICLE_PUBLISHER: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="article:publisher"]"#));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Extract metadata with a fixed precedence per field; the first non-empty
/// candidate wins.
pub fn extract_metadata(doc: &Html) -> PageMetadata {
    let title = meta_content(doc, &OG_TITLE)
        .or_else(|| meta_content(doc, &TWITTER_TITLE))
        .or_else(|| title_text(doc));

    let author = meta_content(doc, &META_AUTHOR)
        .or_else(|| meta_content(doc, &ARTICLE_AUTHOR))
        .or_else(|| meta_content(doc, &TWITTER_CREATOR));

    let publication =
        meta_content(doc, &OG_SITE_NAME).or_else(|| meta_content(doc, &ARTICLE_PUBLISHER));

    PageMetadata {
        title,
        author,
        publication,
    }
}

fn meta_content(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn title_text(doc: &Html) -> Option<String> {
    let text = doc
        .select(&DOC_TITLE)
        .next()
        .map(|el| el.text().collect::<String>())?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
