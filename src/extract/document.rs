//! Field extraction from a parsed HTML document

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text counts as page body
const BODY_SELECTOR: &str = "main, article, section, p, h1, h2";

/// Description sources, highest priority first
const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"meta[name="description"]"#,
    r#"meta[property="og:description"]"#,
    r#"meta[name="twitter:description"]"#,
];

/// Extracts the trimmed text of the first `<title>` element
pub fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extracts the first non-empty description meta tag
///
/// `meta[name=description]` wins over `og:description`, which wins over
/// `twitter:description`. Tags with blank content are skipped.
pub fn extract_description(document: &Html) -> String {
    for source in DESCRIPTION_SELECTORS {
        let Ok(selector) = Selector::parse(source) else {
            continue;
        };

        let found = document
            .select(&selector)
            .filter_map(|element| element.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty());

        if let Some(content) = found {
            return content.to_string();
        }
    }

    String::new()
}

/// Collects the visible body text used for keyword extraction
///
/// Text of every `main`, `article`, `section`, `p`, `h1` and `h2` element is
/// gathered in document order. Nested matches contribute their text once per
/// matching ancestor.
pub fn extract_body_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse(BODY_SELECTOR) else {
        return String::new();
    };

    let joined = document
        .select(&selector)
        .map(element_text)
        .collect::<Vec<_>>()
        .join(" ");

    collapse_whitespace(&joined)
}

/// Extracts the absolute targets of every anchor in document order
///
/// Relative hrefs resolve against `<base href>` when the document declares
/// one, otherwise against the page URL. Empty and unresolvable hrefs are
/// skipped; duplicates are kept.
pub fn extract_links(document: &Html, page_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let base = document_base(document, page_url);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| base.join(href).ok())
        .map(String::from)
        .collect()
}

/// Returns the URL relative links resolve against
fn document_base(document: &Html, page_url: &Url) -> Url {
    let Ok(selector) = Selector::parse("base[href]") else {
        return page_url.clone();
    };

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone())
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
