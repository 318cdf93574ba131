//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::ParsedRobots;

use reqwest::Client;
use url::Url;

/// Returns the origin key (`scheme://host[:port]`) of a URL
pub fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Returns the robots.txt location for a URL's origin
pub fn robots_url(url: &Url) -> Option<Url> {
    url.join("/robots.txt").ok()
}

/// Fetches robots.txt for the origin of `url`
///
/// A missing, unreachable or non-2xx robots.txt allows everything; the
/// failure is logged and never propagated.
pub async fn fetch_robots(client: &Client, url: &Url) -> ParsedRobots {
    let Some(robots_url) = robots_url(url) else {
        return ParsedRobots::allow_all();
    };

    let response = match client.get(robots_url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Could not fetch {}: {}", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!("{} returned {}", robots_url, response.status());
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::debug!("Could not read {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

/// Checks if a URL is allowed by robots.txt
pub fn is_allowed(robots: &ParsedRobots, url: &str, user_agent: &str) -> bool {
    robots.is_allowed(url, user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_key() {
        let url = Url::parse("https://cc.gatech.edu/news/today?x=1").unwrap();
        assert_eq!(origin_key(&url), "https://cc.gatech.edu");

        let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
        assert_eq!(origin_key(&url), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_robots_url() {
        let url = Url::parse("https://cc.gatech.edu/news/today?x=1").unwrap();
        assert_eq!(
            robots_url(&url).unwrap().as_str(),
            "https://cc.gatech.edu/robots.txt"
        );
    }
}
