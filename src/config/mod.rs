//! Configuration module for Audit-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so a partial file (or none at all) is valid.
//!
//! # Example
//!
//! ```no_run
//! use audit_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit-scout.toml")).unwrap();
//! println!("Final selection size: {}", config.discovery.final_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CurationConfig, DiscoveryConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
