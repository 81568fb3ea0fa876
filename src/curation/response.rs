//! Parsing of curation responses
//!
//! Models frequently wrap JSON in a markdown code fence even when told not to,
//! so the fence is removed before parsing. Anything else that is not the
//! expected JSON shape is a format error.

use crate::curation::CuratedUrl;
use crate::CurationError;
use serde::de::DeserializeOwned;

/// Characters of the raw response quoted in format errors
const PREVIEW_CHARS: usize = 120;

/// Strips a surrounding markdown code fence (with or without a language tag)
///
/// # Example
///
/// ```
/// use audit_scout::curation::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```json\n[1, 2]\n```"), "[1, 2]");
/// assert_eq!(strip_code_fence("  [1, 2] "), "[1, 2]");
/// ```
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parses a first-stage response: a JSON array of URL strings
pub fn parse_url_list(text: &str) -> Result<Vec<String>, CurationError> {
    let urls: Vec<String> = parse_json(text, "a JSON array of URL strings")?;
    Ok(urls
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect())
}

/// Parses a second-stage response: a JSON array of `{url, category}` objects
pub fn parse_curated_urls(text: &str) -> Result<Vec<CuratedUrl>, CurationError> {
    parse_json(text, "a JSON array of {url, category} objects")
}

fn parse_json<T: DeserializeOwned>(text: &str, expected: &str) -> Result<T, CurationError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        CurationError::Format(format!(
            "expected {}: {} (response began: {:?})",
            expected,
            e,
            text.chars().take(PREVIEW_CHARS).collect::<String>()
        ))
    })
}
