use crate::extract::HeadFragments;
use std::fmt::Write;

/// System message sent with both curation calls
pub const SYSTEM_PROMPT: &str = "You help plan website accessibility audits by choosing a small, \
representative set of pages to test. Respond with JSON only, without commentary.";

/// Builds the first-stage prompt listing every candidate URL
pub fn narrow_down_prompt(urls: &[String], category: &str, target: usize) -> String {
    let mut prompt = format!(
        "From the following list of URLs, select the {} most relevant URLs for an \
         accessibility audit of a site with the category '{}'. Prefer pages that cover \
         distinct templates and user journeys (home, listings, detail pages, forms, \
         account and checkout flows) over near-duplicates.\n\nURLs:\n",
        target,
        category_hint(category)
    );

    for url in urls {
        prompt.push_str(url);
        prompt.push('\n');
    }

    let _ = write!(
        prompt,
        "\nReturn only a JSON array of between {} and {} URL strings copied exactly from \
         the list. For example: [\"https://example.com/\", \"https://example.com/contact\"]",
        target,
        target + 5
    );

    prompt
}

/// Builds the second-stage prompt pairing each URL with its head fragment
pub fn select_and_categorize_prompt(
    urls: &[String],
    heads: &HeadFragments,
    category: &str,
    target: usize,
) -> String {
    let mut prompt = format!(
        "From the following list of URLs and their HTML head sections, select the {} most \
         relevant URLs for an accessibility audit of a site with the category '{}'. For each \
         selected URL, assign a short page category.\n\n",
        target,
        category_hint(category)
    );

    for url in urls {
        let head = heads.get(url).map(String::as_str).unwrap_or_default();
        let _ = write!(prompt, "URL: {}\nHead:\n{}\n\n", url, head);
    }

    let _ = write!(
        prompt,
        "Return only a JSON array of at most {} objects, where each object has 'url' and \
         'category' keys. For example: [{{\"url\": \"https://example.com\", \"category\": \
         \"home\"}}]",
        target
    );

    prompt
}

fn category_hint(category: &str) -> &str {
    let category = category.trim();
    if category.is_empty() {
        "unspecified"
    } else {
        category
    }
}
