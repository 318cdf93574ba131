//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use canopy_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Allowed domains: {:?}", config.policy.allowed_domains);
//! ```

mod parser;
mod types;
pub mod validation;

// Re-export types
pub use types::{
    default_deny_extensions, Config, CrawlerConfig, OutputConfig, PolicyConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
