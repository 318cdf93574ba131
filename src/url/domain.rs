use url::Url;

/// Extracts the domain from a URL
///
/// Returns the lowercase host, or `None` for URLs without one
/// (`mailto:`, `tel:`, `javascript:` and similar).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use canopy_crawl::url::extract_domain;
///
/// let url = Url::parse("https://CC.Gatech.EDU/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("cc.gatech.edu".to_string()));
///
/// let url = Url::parse("mailto:someone@gatech.edu").unwrap();
/// assert_eq!(extract_domain(&url), None);
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the lowercase extension of the URL path's final segment
///
/// The extension is the text after the last `.` of the last path segment;
/// it is empty when that segment has no dot.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use canopy_crawl::url::path_extension;
///
/// let url = Url::parse("https://cc.gatech.edu/docs/file.PDF").unwrap();
/// assert_eq!(path_extension(&url), "pdf");
///
/// let url = Url::parse("https://cc.gatech.edu/v1.2/about").unwrap();
/// assert_eq!(path_extension(&url), "");
/// ```
pub fn path_extension(url: &Url) -> String {
    let last_segment = url.path().rsplit('/').next().unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((_, extension)) => extension.to_ascii_lowercase(),
        None => String::new(),
    }
}
