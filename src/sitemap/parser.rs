//! Sitemap document parsing
//!
//! Decodes a fetched sitemap body (plain or gzip) and classifies it as either a
//! sitemap index or a URL set, collecting the `<loc>` of every entry.

use flate2::read::GzDecoder;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;

/// First two bytes of every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A parsed sitemap, never retained past a single resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: locations of further sitemaps
    Index(Vec<String>),
    /// `<urlset>`: locations of pages
    UrlSet(Vec<String>),
}

#[derive(Debug, Clone, Copy)]
enum RootKind {
    Index,
    UrlSet,
}

impl RootKind {
    fn from_tag(tag: &[u8]) -> Result<Self, String> {
        match tag {
            b"sitemapindex" => Ok(RootKind::Index),
            b"urlset" => Ok(RootKind::UrlSet),
            other => Err(format!(
                "invalid sitemap format: neither <sitemapindex> nor <urlset> found (root is <{}>)",
                String::from_utf8_lossy(other)
            )),
        }
    }

    fn entry_tag(self) -> &'static [u8] {
        match self {
            RootKind::Index => b"sitemap",
            RootKind::UrlSet => b"url",
        }
    }
}

/// Decodes a sitemap response body into XML text
///
/// Bodies that start with the gzip magic bytes are inflated first. This covers
/// `.gz` sitemaps served without a `Content-Encoding` header; encoded responses
/// are already decoded by the HTTP client and pass through untouched.
pub fn decode_body(body: &[u8]) -> Result<String, String> {
    if body.starts_with(&GZIP_MAGIC) {
        let mut xml = String::new();
        GzDecoder::new(body)
            .read_to_string(&mut xml)
            .map_err(|e| format!("failed to decompress gzip sitemap: {}", e))?;
        return Ok(xml);
    }

    String::from_utf8(body.to_vec()).map_err(|e| format!("sitemap body is not valid UTF-8: {}", e))
}

/// Parses sitemap XML into a [`SitemapDocument`]
///
/// Element names are compared by local name, so prefixed namespaces are
/// accepted. Only the first `<loc>` of each entry is taken; entries without a
/// `<loc>` are ignored. Document order is preserved.
///
/// # Example
///
/// ```
/// use audit_scout::sitemap::{parse_sitemap_document, SitemapDocument};
///
/// let xml = r#"<urlset><url><loc>https://example.com/</loc></url></urlset>"#;
/// let doc = parse_sitemap_document(xml).unwrap();
/// assert_eq!(doc, SitemapDocument::UrlSet(vec!["https://example.com/".to_string()]));
/// ```
pub fn parse_sitemap_document(xml: &str) -> Result<SitemapDocument, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<RootKind> = None;
    let mut locations = Vec::new();
    let mut in_entry = false;
    let mut entry_has_loc = false;
    let mut in_loc = false;
    let mut current_loc = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match root {
                    None => root = Some(RootKind::from_tag(name.as_ref())?),
                    Some(kind) if name.as_ref() == kind.entry_tag() => {
                        in_entry = true;
                        entry_has_loc = false;
                    }
                    Some(_) if in_entry && !entry_has_loc && name.as_ref() == b"loc" => {
                        in_loc = true;
                        current_loc.clear();
                    }
                    Some(_) => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if root.is_none() {
                    root = Some(RootKind::from_tag(e.local_name().as_ref())?);
                }
            }
            Ok(Event::Text(e)) if in_loc => {
                let text = e
                    .unescape()
                    .map_err(|e| format!("XML parse error: {}", e))?;
                current_loc.push_str(&text);
            }
            Ok(Event::CData(e)) if in_loc => {
                current_loc.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if in_loc && name.as_ref() == b"loc" {
                    in_loc = false;
                    entry_has_loc = true;
                    let loc = current_loc.trim();
                    if !loc.is_empty() {
                        locations.push(loc.to_string());
                    }
                } else if root.is_some_and(|kind| name.as_ref() == kind.entry_tag()) {
                    in_entry = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    match root {
        Some(RootKind::Index) => Ok(SitemapDocument::Index(locations)),
        Some(RootKind::UrlSet) => Ok(SitemapDocument::UrlSet(locations)),
        None => Err(
            "invalid sitemap format: neither <sitemapindex> nor <urlset> found".to_string(),
        ),
    }
}
