//! URL handling module
//!
//! This module provides URL canonicalization, domain extraction, path
//! extension lookup and allowed-domain matching.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, path_extension};
pub use matcher::matches_domain;
pub use normalize::{canonicalize_url, frontier_key};
