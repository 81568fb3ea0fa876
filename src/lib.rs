//! Audit-Scout: curated page discovery for accessibility audits
//!
//! This crate resolves a site's sitemap, samples large URL populations, asks an
//! external text-generation service to narrow and categorize the candidates, and
//! verifies that each selected page is reachable.

pub mod config;
pub mod curation;
pub mod discovery;
pub mod extract;
pub mod http;
pub mod sampler;
pub mod sitemap;
pub mod status;

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Main error type for discovery runs
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch sitemap {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse sitemap {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Curation {stage} failed: {source}")]
    Curation {
        stage: CurationStage,
        source: CurationError,
    },

    #[error("Discovery timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl DiscoveryError {
    /// Returns true when the run failed because a curation response could not
    /// be parsed into the expected JSON shape
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            DiscoveryError::Curation {
                source: CurationError::Format(_),
                ..
            }
        )
    }
}

/// Which of the two curation calls failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurationStage {
    /// Stage 1: narrowing the sampled population
    NarrowDown,
    /// Stage 2: final selection and categorization
    Categorize,
}

impl fmt::Display for CurationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurationStage::NarrowDown => write!(f, "narrow-down (stage 1)"),
            CurationStage::Categorize => write!(f, "select-and-categorize (stage 2)"),
        }
    }
}

/// Errors returned by a curation backend
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Unexpected curation response format: {0}")]
    Format(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),
}

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

// Re-export commonly used types
pub use config::Config;
pub use curation::{ChatCurator, CuratedUrl, Curator};
pub use discovery::{discover, DiscoveryResult, Discoverer};
pub use extract::HeadFragments;
