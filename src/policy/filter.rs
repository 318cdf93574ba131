//! The link filter predicate
//!
//! Rules are applied in a fixed order: parseability, domain scope, deny
//! patterns (first match wins), denied extension. Everything here is pure.

use crate::policy::Policy;
use crate::url::{extract_domain, matches_domain, path_extension};
use url::Url;

/// Outcome of evaluating a URL against a [`Policy`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    /// The URL may be followed
    Allowed,
    /// The URL is not absolute or has no host
    Unparseable,
    /// The host is outside every allowed domain
    OutOfDomain,
    /// A deny pattern matched; `index` is its position in the policy
    DeniedByPattern { index: usize },
    /// The path ends in a denied extension
    DeniedByExtension { extension: String },
}

impl FilterVerdict {
    /// Returns true if the URL passed every rule
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Evaluates a candidate URL and reports why it was rejected, if it was
///
/// # Examples
///
/// ```
/// use canopy_crawl::policy::{evaluate, FilterVerdict, Policy};
///
/// let policy = Policy::new(
///     vec!["cc.gatech.edu".to_string()],
///     vec![],
///     vec!["pdf".to_string()],
/// );
///
/// assert_eq!(evaluate("https://cc.gatech.edu/news", &policy), FilterVerdict::Allowed);
/// assert_eq!(evaluate("https://gatech.edu/", &policy), FilterVerdict::OutOfDomain);
/// ```
pub fn evaluate(candidate: &str, policy: &Policy) -> FilterVerdict {
    let Ok(url) = Url::parse(candidate) else {
        return FilterVerdict::Unparseable;
    };

    let Some(host) = extract_domain(&url) else {
        return FilterVerdict::Unparseable;
    };

    if !policy
        .allowed_domains()
        .iter()
        .any(|domain| matches_domain(domain, &host))
    {
        return FilterVerdict::OutOfDomain;
    }

    if let Some(index) = policy
        .deny_patterns()
        .iter()
        .position(|pattern| pattern.matches(candidate))
    {
        return FilterVerdict::DeniedByPattern { index };
    }

    let extension = path_extension(&url);
    if policy.denies_extension(&extension) {
        return FilterVerdict::DeniedByExtension { extension };
    }

    FilterVerdict::Allowed
}

/// Decides whether a candidate URL may be followed under the policy
pub fn is_allowed(candidate: &str, policy: &Policy) -> bool {
    evaluate(candidate, policy).is_allowed()
}
