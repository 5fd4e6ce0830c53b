use scraper::{Html, Selector};

use crate::error::ParseError;

/// Plain text pulled out of a fetched page. Either field may be empty;
/// the title fallback is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    pub title: String,
    pub body: String,
}

/// Extract the text of the `<title>` and `<body>` elements.
///
/// Malformed markup is recovered by the parser; only bytes that are not
/// valid UTF-8 fail. Missing elements yield empty strings.
pub fn extract(raw: &[u8]) -> Result<ExtractedText, ParseError> {
    let html = std::str::from_utf8(raw)?;
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").expect("valid selector");
    let body_selector = Selector::parse("body").expect("valid selector");

    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let body = document
        .select(&body_selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    Ok(ExtractedText { title, body })
}
