//! Shared helpers for reading and parsing HTML responses in tests.

use axum::response::Response;
use scraper::Html;

/// Read the body of `response` as text.
pub async fn response_body_text(response: Response) -> String {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).to_string()
}

/// Assert that `response` contains a valid HTML document and return its body.
pub async fn assert_valid_html(response: Response) -> String {
    let text = response_body_text(response).await;
    let html = Html::parse_document(&text);

    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );

    text
}

/// Parse `text` as a full HTML document.
pub fn parse_html_document(text: &str) -> Html {
    Html::parse_document(text)
}

/// Parse `text` as an HTML fragment, e.g. a single alert or form.
pub fn parse_html_fragment(text: &str) -> Html {
    Html::parse_fragment(text)
}
