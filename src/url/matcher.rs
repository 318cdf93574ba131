/// Checks if a host lies inside an allowed domain
///
/// A host matches when it is the domain itself or any subdomain of it.
/// The comparison respects label boundaries, so `notgatech.edu` is not
/// inside `gatech.edu`.
///
/// Both arguments are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use canopy_crawl::url::matches_domain;
///
/// assert!(matches_domain("cc.gatech.edu", "cc.gatech.edu"));
/// assert!(matches_domain("cc.gatech.edu", "jupiter.cc.gatech.edu"));
/// assert!(!matches_domain("cc.gatech.edu", "gatech.edu"));
/// assert!(!matches_domain("gatech.edu", "notgatech.edu"));
/// ```
pub fn matches_domain(domain: &str, host: &str) -> bool {
    if domain.is_empty() {
        return false;
    }

    match host.strip_suffix(domain) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_domain("example.com", "example.com"));
        assert!(matches_domain("blog.example.com", "blog.example.com"));
    }

    #[test]
    fn test_subdomains_match() {
        assert!(matches_domain("example.com", "blog.example.com"));
        assert!(matches_domain("example.com", "api.v2.example.com"));
    }

    #[test]
    fn test_parent_does_not_match() {
        assert!(!matches_domain("blog.example.com", "example.com"));
    }

    #[test]
    fn test_label_boundary() {
        assert!(!matches_domain("example.com", "myexample.com"));
        assert!(!matches_domain("example.com", "example.com.org"));
        assert!(!matches_domain("example.com", "xexample.com"));
    }

    #[test]
    fn test_different_domain() {
        assert!(!matches_domain("example.com", "example.org"));
    }

    #[test]
    fn test_empty_strings() {
        assert!(!matches_domain("", "example.com"));
        assert!(!matches_domain("", ""));
        assert!(!matches_domain("example.com", ""));
    }

    #[test]
    fn test_multiple_dots_in_base() {
        assert!(matches_domain("co.uk", "example.co.uk"));
        assert!(!matches_domain("co.uk", "co.jp"));
    }
}
