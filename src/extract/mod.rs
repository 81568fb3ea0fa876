//! Content extraction for curation context
//!
//! Fetches each narrowed candidate page and keeps a cleaned copy of its
//! `<head>` section. Pages are fetched one at a time with a fixed pause between
//! requests so the target site sees a gentle, predictable load.

mod head;

pub use head::{clean_head, extract_head, strip_tag_blocks};

use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Cleaned head markup keyed by page URL; empty when the page could not be
/// fetched or had no head section
pub type HeadFragments = HashMap<String, String>;

/// Fetches every URL serially and extracts its cleaned head fragment
///
/// Fetch and body-read failures are logged and recorded as an empty fragment;
/// this function never fails. `delay` is slept between consecutive requests.
pub async fn extract_heads(client: &Client, urls: &[String], delay: Duration) -> HeadFragments {
    let mut heads = HeadFragments::with_capacity(urls.len());

    for (i, url) in urls.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let fragment = match fetch_head(client, url).await {
            Ok(fragment) => fragment,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to fetch page head");
                String::new()
            }
        };

        tracing::debug!(url = %url, head_len = fragment.len(), "Extracted page head");
        heads.insert(url.clone(), fragment);
    }

    tracing::info!(
        pages = urls.len(),
        with_head = heads.values().filter(|h| !h.is_empty()).count(),
        "Extracted page heads"
    );

    heads
}

/// Fetches a single page and returns its cleaned head fragment
async fn fetch_head(client: &Client, url: &str) -> Result<String, reqwest::Error> {
    let body = client.get(url).send().await?.text().await?;
    Ok(extract_head(&body))
}
