//! Raw page fetching.

use quill_http::{HttpClient, HttpError, RequestOpts, TextResponse};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

use crate::ExtractError;

/// Conventional desktop-browser `User-Agent`. Some publishers refuse
/// non-browser clients outright; this is a compatibility shim, not a
/// security measure.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Raw payload of the page plus the URL the client actually landed on.
/// Transient; discarded once the DOM has been parsed.
#[derive(Debug)]
pub struct FetchedPage {
    pub html: String,
    pub resolved_url: Url,
}

/// Fetch a page with retries disabled — a failed fetch is terminal for the
/// pipeline, so there is no point burning the shared retry budget on it.
/// Redirect handling and timeouts stay at the client's defaults.
pub async fn fetch_page(
    http: &HttpClient,
    url: &str,
    user_agent: &str,
) -> Result<FetchedPage, ExtractError> {
    let mut headers = HeaderMap::new();
    let ua = HeaderValue::from_str(user_agent)
        .map_err(|e| ExtractError::Fetch(format!("invalid user agent: {e}")))?;
    headers.insert(USER_AGENT, ua);

    let opts = RequestOpts {
        retries: Some(0),
        headers: Some(headers),
        allow_absolute: true,
        ..Default::default()
    };

    let TextResponse {
        body, final_url, ..
    } = http.get_text(url, opts).await.map_err(fetch_error)?;

    tracing::debug!(
        url = %url,
        resolved = %final_url,
        bytes = body.len(),
        "extract.fetch.done"
    );

    Ok(FetchedPage {
        html: body,
        resolved_url: final_url,
    })
}

/// HTTP failures carry the status text (e.g. "Not Found"); transport
/// failures carry the underlying message.
fn fetch_error(err: HttpError) -> ExtractError {
    match err {
        HttpError::Api { status, .. } => ExtractError::Fetch(
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string()),
        ),
        other => ExtractError::Fetch(other.to_string()),
    }
}
