//! Page content extraction
//!
//! Turns a fetched HTML document into a [`Page`]: title, description, body
//! keywords and outbound links. Extraction never fails outright; documents
//! that cannot be parsed produce an empty page.

mod document;
mod keywords;
mod page;

pub use document::{extract_body_text, extract_description, extract_links, extract_title};
pub use keywords::{extract_keywords, is_stopword, DEFAULT_KEYWORD_LIMIT, STOPWORDS};
pub use page::Page;

use scraper::Html;
use thiserror::Error;
use url::Url;

/// Reasons a fetched body cannot be treated as an HTML document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Not an HTML document: {content_type}")]
    NotHtml { content_type: String },

    #[error("Document body is not valid UTF-8")]
    InvalidEncoding,
}

/// Parses a response body into an HTML document
///
/// A missing content type is assumed to be HTML. Any other content type must
/// be `text/html` or `application/xhtml+xml`.
pub fn parse_document(body: &[u8], content_type: Option<&str>) -> Result<Html, ExtractError> {
    if let Some(content_type) = content_type {
        if !is_html_content_type(content_type) {
            return Err(ExtractError::NotHtml {
                content_type: content_type.to_string(),
            });
        }
    }

    let text = std::str::from_utf8(body).map_err(|_| ExtractError::InvalidEncoding)?;
    Ok(Html::parse_document(text))
}

/// Builds a [`Page`] from a parsed document
///
/// # Examples
///
/// ```
/// use canopy_crawl::extract::extract;
/// use scraper::Html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Labs</title></head>
///     <body><p>Robotics robotics vision</p><a href="/labs/ai">AI</a></body></html>"#;
/// let url = Url::parse("https://cc.gatech.edu/labs").unwrap();
/// let page = extract(&Html::parse_document(html), &url, 10);
///
/// assert_eq!(page.title, "Labs");
/// assert_eq!(page.keywords, vec!["robotics", "vision"]);
/// assert_eq!(page.out_links, vec!["https://cc.gatech.edu/labs/ai"]);
/// ```
pub fn extract(document: &Html, page_url: &Url, keyword_limit: usize) -> Page {
    let body_text = extract_body_text(document);

    Page {
        url: page_url.to_string(),
        title: extract_title(document),
        description: extract_description(document),
        keywords: extract_keywords(&body_text, keyword_limit),
        out_links: extract_links(document, page_url),
    }
}

/// Parses and extracts a fetched body, degrading to an empty page
///
/// The URL is still considered crawled when this returns an empty page.
pub fn extract_page(
    body: &[u8],
    content_type: Option<&str>,
    page_url: &Url,
    keyword_limit: usize,
) -> Page {
    match parse_document(body, content_type) {
        Ok(document) => extract(&document, page_url, keyword_limit),
        Err(e) => {
            tracing::warn!("No content extracted from {}: {}", page_url, e);
            Page::empty(page_url.as_str())
        }
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "text/html" || mime == "application/xhtml+xml"
}
