//! Discovery orchestration
//!
//! Runs the full pipeline for one site:
//! 1. Resolve the sitemap into candidate URLs
//! 2. Sample large populations down to a bounded set
//! 3. Narrow the candidates with the first curation call
//! 4. Extract head fragments for the narrowed URLs
//! 5. Select and categorize with the second curation call
//! 6. Check the status of every selected URL
//!
//! Sitemap and curation failures abort the run. Head extraction and status
//! checks degrade to empty fragments and error strings instead.

use crate::config::{Config, DiscoveryConfig};
use crate::curation::{ChatCurator, Curator};
use crate::extract::extract_heads;
use crate::http::build_http_client;
use crate::sampler::{sample_urls, SamplingConfig};
use crate::sitemap::SitemapResolver;
use crate::status::check_status;
use crate::{CurationStage, DiscoveryError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A curated page returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub url: String,
    pub status: String,
    pub category: String,
}

/// Runs discovery for sites using a shared HTTP client and curator
///
/// A `Discoverer` holds no per-run state and can be shared behind an `Arc` to
/// serve concurrent runs.
pub struct Discoverer {
    client: Client,
    curator: Arc<dyn Curator>,
    config: DiscoveryConfig,
}

impl Discoverer {
    /// Creates a discoverer from its collaborators
    pub fn new(client: Client, curator: Arc<dyn Curator>, config: DiscoveryConfig) -> Self {
        Self {
            client,
            curator,
            config,
        }
    }

    /// Creates a discoverer with a [`ChatCurator`] whose API key is read from
    /// the configured environment variable
    pub fn from_config(config: &Config) -> Result<Self, DiscoveryError> {
        let client = build_http_client(&config.user_agent)?;
        let curator = ChatCurator::from_env(client.clone(), config)?;
        Ok(Self::new(client, Arc::new(curator), config.discovery.clone()))
    }

    /// Discovers a curated, categorized and status-checked set of pages
    ///
    /// The result holds at most `final_size` entries. When a run timeout is
    /// configured, exceeding it aborts the run with [`DiscoveryError::Timeout`].
    pub async fn discover(
        &self,
        site_url: &str,
        category: &str,
    ) -> Result<Vec<DiscoveryResult>, DiscoveryError> {
        match self.config.run_timeout_secs {
            Some(secs) => {
                let limit = Duration::from_secs(secs);
                tokio::time::timeout(limit, self.run(site_url, category))
                    .await
                    .map_err(|_| DiscoveryError::Timeout(limit))?
            }
            None => self.run(site_url, category).await,
        }
    }

    async fn run(
        &self,
        site_url: &str,
        category: &str,
    ) -> Result<Vec<DiscoveryResult>, DiscoveryError> {
        validate_site_url(site_url)?;
        tracing::info!(site = %site_url, category = %category, "Starting discovery");

        let resolver = SitemapResolver::new(&self.client, self.config.max_sitemap_depth);
        let candidates = resolver.resolve(site_url).await?;
        if candidates.is_empty() {
            tracing::warn!(site = %site_url, "Sitemap contained no URLs");
            return Ok(Vec::new());
        }

        let total = candidates.len();
        let sampled = self.sample(candidates);
        tracing::info!(total, sampled = sampled.len(), "Sampled candidate URLs");

        let narrowed = self
            .curator
            .narrow_down(&sampled, category)
            .await
            .map_err(|source| DiscoveryError::Curation {
                stage: CurationStage::NarrowDown,
                source,
            })?;
        tracing::info!(narrowed = narrowed.len(), "Narrowed candidate URLs");

        let delay = Duration::from_millis(self.config.head_delay_ms);
        let heads = extract_heads(&self.client, &narrowed, delay).await;

        let mut curated = self
            .curator
            .select_and_categorize(&narrowed, &heads, category)
            .await
            .map_err(|source| DiscoveryError::Curation {
                stage: CurationStage::Categorize,
                source,
            })?;

        if curated.len() > self.config.final_size {
            tracing::warn!(
                returned = curated.len(),
                limit = self.config.final_size,
                "Curation returned more URLs than requested, truncating"
            );
            curated.truncate(self.config.final_size);
        }

        let mut results: Vec<DiscoveryResult> = curated
            .into_iter()
            .map(|item| DiscoveryResult {
                url: item.url,
                status: String::new(),
                category: item.category,
            })
            .collect();

        for result in &mut results {
            result.status = check_status(&self.client, &result.url).await;
        }

        tracing::info!(site = %site_url, results = results.len(), "Discovery complete");
        Ok(results)
    }

    /// Samples with a fresh random source per run, or the configured seed
    fn sample(&self, urls: Vec<String>) -> Vec<String> {
        let mut rng = match self.config.sample_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        sample_urls(urls, &SamplingConfig::from(&self.config), &mut rng)
    }
}

/// Runs a single discovery with a [`ChatCurator`] built from `config`
///
/// # Example
///
/// ```no_run
/// use audit_scout::{discover, Config};
///
/// # async fn example() -> audit_scout::Result<()> {
/// let results = discover(&Config::default(), "https://example.com", "e-commerce").await?;
/// for result in results {
///     println!("{} [{}] {}", result.url, result.category, result.status);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn discover(
    config: &Config,
    site_url: &str,
    category: &str,
) -> Result<Vec<DiscoveryResult>, DiscoveryError> {
    Discoverer::from_config(config)?
        .discover(site_url, category)
        .await
}

/// Rejects site roots that could never yield a sitemap request
fn validate_site_url(site_url: &str) -> Result<(), DiscoveryError> {
    let invalid = |message: String| DiscoveryError::Fetch {
        url: site_url.to_string(),
        message,
    };

    let url = Url::parse(site_url).map_err(|e| invalid(format!("invalid site URL: {}", e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!(
            "site URL must be http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}
