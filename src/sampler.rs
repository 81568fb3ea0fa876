//! Population sampling for large sitemaps
//!
//! Short URLs tend to be structurally important (home, top-level category
//! pages), so the shortest ones are always kept; the rest of the budget is a
//! uniform random draw from the remainder.

use crate::config::DiscoveryConfig;
use rand::seq::SliceRandom;
use rand::Rng;

/// Bounds for [`sample_urls`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Populations at or below this size pass through unchanged; also the
    /// maximum sample size
    pub max_candidates: usize,

    /// Number of shortest URLs always included
    pub shortest_kept: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_candidates: 200,
            shortest_kept: 20,
        }
    }
}

impl From<&DiscoveryConfig> for SamplingConfig {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            max_candidates: config.max_candidates,
            shortest_kept: config.shortest_kept,
        }
    }
}

/// Reduces an oversized URL population to a bounded sample
///
/// Returns the input unchanged when it holds at most `max_candidates` URLs.
/// Otherwise the result is the `shortest_kept` shortest URLs (ties keep their
/// input order) followed by up to `max_candidates - shortest_kept` URLs drawn
/// uniformly from the rest using `rng`.
///
/// # Example
///
/// ```
/// use audit_scout::sampler::{sample_urls, SamplingConfig};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let urls: Vec<String> = (0..500).map(|i| format!("https://example.com/{}", i)).collect();
/// let mut rng = StdRng::seed_from_u64(1);
/// let sample = sample_urls(urls, &SamplingConfig::default(), &mut rng);
/// assert_eq!(sample.len(), 200);
/// ```
pub fn sample_urls<R: Rng + ?Sized>(
    urls: Vec<String>,
    config: &SamplingConfig,
    rng: &mut R,
) -> Vec<String> {
    if urls.len() <= config.max_candidates {
        return urls;
    }

    let mut remaining = urls;
    remaining.sort_by_key(|url| url.len());

    let kept = config.shortest_kept.min(remaining.len());
    let mut sample: Vec<String> = remaining.drain(..kept).collect();

    remaining.shuffle(rng);
    remaining.truncate(config.max_candidates.saturating_sub(kept));
    sample.extend(remaining);

    tracing::debug!(
        shortest = kept,
        random = sample.len() - kept,
        "Sampled URL population"
    );

    sample
}
