//! Sitemap resolution module
//!
//! This module turns a site root into candidate page URLs:
//! - Fetching `sitemap.xml` and any sub-sitemaps an index references
//! - Transparent gzip handling for compressed sitemaps
//! - Classifying documents as sitemap index or URL set

mod parser;
mod resolver;

pub use parser::{decode_body, parse_sitemap_document, SitemapDocument};
pub use resolver::{sitemap_url_for, SitemapResolver};
