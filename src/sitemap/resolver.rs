//! Recursive sitemap resolution
//!
//! Expands a site's root sitemap into a flat list of page URLs. The root
//! document must be fetched and parsed successfully; sub-sitemaps referenced by
//! an index are best-effort and skipped with a warning when they fail.

use crate::sitemap::parser::{decode_body, parse_sitemap_document, SitemapDocument};
use crate::DiscoveryError;
use reqwest::Client;
use std::collections::HashSet;

/// Builds the conventional sitemap location for a site root
///
/// # Example
///
/// ```
/// use audit_scout::sitemap::sitemap_url_for;
///
/// assert_eq!(sitemap_url_for("https://example.com/"), "https://example.com/sitemap.xml");
/// ```
pub fn sitemap_url_for(site_root: &str) -> String {
    format!("{}/sitemap.xml", site_root.trim_end_matches('/'))
}

/// Resolves sitemaps into candidate page URLs
pub struct SitemapResolver<'a> {
    client: &'a Client,
    max_depth: u32,
}

impl<'a> SitemapResolver<'a> {
    /// Creates a resolver that follows index nesting at most `max_depth` levels
    /// below the root sitemap
    pub fn new(client: &'a Client, max_depth: u32) -> Self {
        Self { client, max_depth }
    }

    /// Resolves `{site_root}/sitemap.xml` into page URLs
    pub async fn resolve(&self, site_root: &str) -> Result<Vec<String>, DiscoveryError> {
        self.resolve_sitemap(&sitemap_url_for(site_root)).await
    }

    /// Resolves a specific sitemap URL into page URLs
    ///
    /// Index children are expanded depth-first, so the output is the in-order
    /// concatenation of every reachable URL set. A child is skipped when it
    /// fails to fetch or parse, lies deeper than the configured bound, or was
    /// already visited during this resolution.
    pub async fn resolve_sitemap(&self, sitemap_url: &str) -> Result<Vec<String>, DiscoveryError> {
        let children = match self.fetch_document(sitemap_url).await? {
            SitemapDocument::UrlSet(urls) => {
                tracing::info!(sitemap = %sitemap_url, count = urls.len(), "Resolved sitemap");
                return Ok(urls);
            }
            SitemapDocument::Index(children) => children,
        };

        tracing::debug!(
            sitemap = %sitemap_url,
            children = children.len(),
            "Expanding sitemap index"
        );

        let mut visited = HashSet::from([sitemap_url.to_string()]);
        let mut worklist: Vec<(String, u32)> =
            children.into_iter().rev().map(|child| (child, 1)).collect();
        let mut urls = Vec::new();

        while let Some((child_url, depth)) = worklist.pop() {
            if depth > self.max_depth {
                tracing::warn!(
                    sitemap = %child_url,
                    depth,
                    max_depth = self.max_depth,
                    "Skipping sub-sitemap beyond maximum index depth"
                );
                continue;
            }

            if !visited.insert(child_url.clone()) {
                tracing::warn!(sitemap = %child_url, "Skipping already visited sub-sitemap");
                continue;
            }

            match self.fetch_document(&child_url).await {
                Ok(SitemapDocument::UrlSet(child_urls)) => {
                    tracing::debug!(sitemap = %child_url, count = child_urls.len(), "Resolved sub-sitemap");
                    urls.extend(child_urls);
                }
                Ok(SitemapDocument::Index(grandchildren)) => {
                    worklist.extend(
                        grandchildren
                            .into_iter()
                            .rev()
                            .map(|grandchild| (grandchild, depth + 1)),
                    );
                }
                Err(e) => {
                    tracing::warn!(sitemap = %child_url, error = %e, "Failed to resolve sub-sitemap");
                }
            }
        }

        tracing::info!(sitemap = %sitemap_url, count = urls.len(), "Resolved sitemap index");
        Ok(urls)
    }

    /// Fetches, decodes and parses a single sitemap document
    async fn fetch_document(&self, url: &str) -> Result<SitemapDocument, DiscoveryError> {
        tracing::debug!(sitemap = %url, "Fetching sitemap");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DiscoveryError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Fetch {
                url: url.to_string(),
                message: format!("sitemap not found or accessible, status code: {}", status),
            });
        }

        let body = response.bytes().await.map_err(|e| DiscoveryError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let parse_error = |message: String| DiscoveryError::Parse {
            url: url.to_string(),
            message,
        };

        let xml = decode_body(&body).map_err(parse_error)?;
        parse_sitemap_document(&xml).map_err(parse_error)
    }
}
