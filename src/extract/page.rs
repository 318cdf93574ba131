use serde::{Deserialize, Serialize};

/// Structured content extracted from one crawled page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Canonical absolute URL the content was served from
    pub url: String,

    /// Trimmed `<title>` text, empty if absent
    pub title: String,

    /// First non-empty description meta tag, empty if none
    pub description: String,

    /// Most frequent body keywords, most frequent first
    pub keywords: Vec<String>,

    /// Absolute targets of every anchor, in document order
    pub out_links: Vec<String>,
}

impl Page {
    /// A page that was fetched but yielded no usable content
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Returns true if nothing was extracted from the page
    pub fn is_contentless(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.keywords.is_empty()
            && self.out_links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_page() {
        let page = Page::empty("https://cc.gatech.edu/");
        assert_eq!(page.url, "https://cc.gatech.edu/");
        assert!(page.is_contentless());
    }

    #[test]
    fn test_json_shape() {
        let page = Page {
            url: "https://cc.gatech.edu/".to_string(),
            title: "School of Computing".to_string(),
            description: String::new(),
            keywords: vec!["computing".to_string()],
            out_links: vec!["https://cc.gatech.edu/about".to_string()],
        };

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["title"], "School of Computing");
        assert_eq!(json["out_links"][0], "https://cc.gatech.edu/about");
        assert_eq!(json["description"], "");
    }
}
