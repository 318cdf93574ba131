use crate::UrlError;
use url::Url;

/// Canonicalizes a URL for use as a frontier key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme and a host
/// 3. Remove the fragment (everything after #)
///
/// Scheme and host are lowercased by the parser. Paths and query strings
/// are kept as written: two URLs that differ only there are different
/// pages as far as the crawl is concerned.
///
/// # Examples
///
/// ```
/// use canopy_crawl::url::canonicalize_url;
///
/// let url = canonicalize_url("HTTPS://CC.Gatech.edu/about#people").unwrap();
/// assert_eq!(url.as_str(), "https://cc.gatech.edu/about");
/// ```
pub fn canonicalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Returns the frontier key for a link, falling back to the link itself
///
/// Links that cannot be canonicalized (`mailto:`, `tel:`, ...) are still
/// counted as encounters; they keep their original spelling.
pub fn frontier_key(link: &str) -> String {
    match canonicalize_url(link) {
        Ok(url) => url.into(),
        Err(_) => link.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_fragment() {
        let result = canonicalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_lowercase_host() {
        let result = canonicalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_query_preserved() {
        let result = canonicalize_url("https://example.com/page?b=2&a=1").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?b=2&a=1");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = canonicalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = canonicalize_url("ftp://example.com/page");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            canonicalize_url("not a url"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_frontier_key() {
        assert_eq!(
            frontier_key("https://example.com/a#top"),
            "https://example.com/a"
        );
        assert_eq!(
            frontier_key("mailto:someone@example.com"),
            "mailto:someone@example.com"
        );
    }
}
