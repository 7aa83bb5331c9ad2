//! End-to-end pipeline tests against a local mock server.

use quill_extract::{ArticleExtractor, ExtractError};
use quill_http::HttpClient;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn extractor(server: &MockServer) -> ArticleExtractor {
    let http = HttpClient::new(&server.uri()).expect("mock server uri");
    ArticleExtractor::new(http)
}

fn long_paragraphs() -> String {
    let para = "The quick brown fox jumps over the lazy dog and keeps running \
                through the quiet field until the sun finally sets behind the \
                distant hills of the old valley town where nothing much happens."
        .repeat(2);
    format!("<p>{para}</p><p>{para}</p><p>{para}</p>")
}

#[tokio::test]
async fn extracts_article_with_metadata() {
    let server = MockServer::start().await;
    let html = format!(
        r#"<html><head>
             <title>Doc Title</title>
             <meta property="og:title" content="OG Title">
             <meta name="author" content="Jane Doe">
             <meta property="og:site_name" content="The Paper">
           </head><body>
             <nav><a href="/">home</a><a href="/about">about</a></nav>
             <article>{}</article>
           </body></html>"#,
        long_paragraphs()
    );
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let url = format!("{}/story", server.uri());
    let article = extractor(&server)
        .fetch_and_parse_url(&url)
        .await
        .expect("extraction succeeds");

    assert!(!article.content.trim().is_empty());
    assert!(article.content.contains("quick brown fox"));
    // Boilerplate outside the article region is gone.
    assert!(!article.content.contains("about"));
    assert!(!article.title.is_empty());
    assert_ne!(article.title, "Untitled");
    assert_eq!(article.author.as_deref(), Some("Jane Doe"));
    assert_eq!(article.publication.as_deref(), Some("The Paper"));
}

#[tokio::test]
async fn untitled_when_no_title_anywhere() {
    let server = MockServer::start().await;
    let html = format!(
        "<html><head></head><body><article>{}</article></body></html>",
        long_paragraphs()
    );
    Mock::given(method("GET"))
        .and(path("/bare"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let url = format!("{}/bare", server.uri());
    let article = extractor(&server)
        .fetch_and_parse_url(&url)
        .await
        .expect("extraction succeeds");

    assert_eq!(article.title, "Untitled");
    assert!(article.author.is_none());
    assert!(article.publication.is_none());
}

#[tokio::test]
async fn fetch_failure_is_wrapped_with_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/gone", server.uri());
    let err = extractor(&server).fetch_and_parse_url(&url).await.unwrap_err();

    let msg = err.to_string();
    assert!(
        msg.starts_with("URL parsing failed:"),
        "unexpected message: {msg}"
    );
    assert!(msg.contains("Not Found"), "unexpected message: {msg}");
    assert!(matches!(err, ExtractError::Failed(_)));
}

#[tokio::test]
async fn whitespace_only_article_is_a_failure() {
    let server = MockServer::start().await;
    let html = "<html><head><title>Empty</title></head>\
                <body><article><p>   </p><p>\t\n</p></article></body></html>";
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let url = format!("{}/empty", server.uri());
    let err = extractor(&server).fetch_and_parse_url(&url).await.unwrap_err();
    assert!(err.to_string().starts_with("URL parsing failed:"));
}

#[tokio::test]
async fn sends_desktop_user_agent() {
    let server = MockServer::start().await;
    let html = format!(
        "<html><head><title>UA</title></head><body><article>{}</article></body></html>",
        long_paragraphs()
    );
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", quill_extract::DESKTOP_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/ua", server.uri());
    extractor(&server)
        .fetch_and_parse_url(&url)
        .await
        .expect("extraction succeeds");
}
