//! Curation through an external text-generation service
//!
//! Curation happens in two stateless calls per discovery run:
//! 1. `narrow_down` picks the most relevant URLs from the sampled population
//! 2. `select_and_categorize` picks the final set from the narrowed URLs and
//!    labels each one, using their head fragments as context
//!
//! Both calls fail closed: a transport failure or an unparseable response
//! aborts the run.

mod chat;
mod prompts;
mod response;

pub use chat::ChatCurator;
pub use prompts::{narrow_down_prompt, select_and_categorize_prompt, SYSTEM_PROMPT};
pub use response::{parse_curated_urls, parse_url_list, strip_code_fence};

use crate::extract::HeadFragments;
use crate::CurationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A URL chosen by the second curation call, with its assigned category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedUrl {
    pub url: String,
    pub category: String,
}

/// The two curation operations the discovery pipeline depends on
#[async_trait]
pub trait Curator: Send + Sync {
    /// Narrows a large candidate set down to the most relevant URLs
    async fn narrow_down(&self, urls: &[String], category: &str)
        -> Result<Vec<String>, CurationError>;

    /// Selects the final URLs and assigns each a category
    async fn select_and_categorize(
        &self,
        urls: &[String],
        heads: &HeadFragments,
        category: &str,
    ) -> Result<Vec<CuratedUrl>, CurationError>;
}
