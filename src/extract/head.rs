//! `<head>` isolation and script/style stripping
//!
//! Deliberately string based rather than a DOM parse: the fragment is only
//! context for the categorization prompt, and a malformed page must still
//! yield whatever head markup it has.

const HEAD_OPEN: &str = "<head>";
const HEAD_CLOSE: &str = "</head>";

/// Extracts the cleaned inner markup of the first `<head>...</head>` span
///
/// Returns an empty string when either boundary is missing.
///
/// # Example
///
/// ```
/// use audit_scout::extract::extract_head;
///
/// let html = "<html><head><title>Home</title><script>track()</script></head><body></body></html>";
/// assert_eq!(extract_head(html), "<title>Home</title>");
/// ```
pub fn extract_head(html: &str) -> String {
    let Some(start) = html.find(HEAD_OPEN) else {
        return String::new();
    };
    let inner_start = start + HEAD_OPEN.len();

    let Some(len) = html[inner_start..].find(HEAD_CLOSE) else {
        return String::new();
    };

    clean_head(&html[inner_start..inner_start + len])
}

/// Removes every `<script>` and `<style>` block from head markup
pub fn clean_head(head: &str) -> String {
    let without_scripts = strip_tag_blocks(head, "script");
    strip_tag_blocks(&without_scripts, "style")
}

/// Removes every `<tag ...>...</tag>` block, matching tag names ASCII
/// case-insensitively
///
/// An opening tag without a matching close truncates the markup from that tag
/// to the end. An opening tag missing its `>` stops stripping and leaves the
/// rest untouched.
pub fn strip_tag_blocks(html: &str, tag: &str) -> String {
    let open_tag = format!("<{}", tag);
    let close_tag = format!("</{}>", tag);
    let mut result = html.to_string();

    while let Some(open_start) = find_ignore_ascii_case(&result, &open_tag, 0) {
        let Some(gt) = result[open_start..].find('>') else {
            break;
        };
        let open_end = open_start + gt + 1;

        match find_ignore_ascii_case(&result, &close_tag, open_end) {
            Some(close_start) => {
                result.replace_range(open_start..close_start + close_tag.len(), "");
            }
            None => {
                result.truncate(open_start);
                break;
            }
        }
    }

    result
}

/// Byte offset of the first ASCII case-insensitive match of `needle` in
/// `haystack` at or after `from`
///
/// `needle` must be ASCII, so any match starts and ends on a char boundary.
fn find_ignore_ascii_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let needle = needle.as_bytes();
    let bytes = haystack.as_bytes();
    if from > bytes.len() || needle.len() > bytes.len() - from {
        return None;
    }

    bytes[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|pos| pos + from)
}
