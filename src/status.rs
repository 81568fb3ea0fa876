//! Reachability checks for the final selection
//!
//! The status is an annotation for the caller, never a reason to fail a run.

use reqwest::{Client, StatusCode};

/// Issues a GET for `url` and describes the outcome
///
/// Returns the status line (for example `"200 OK"`) when a response arrives,
/// or `"Error: <description>"` when the request fails in transport.
pub async fn check_status(client: &Client, url: &str) -> String {
    match client.get(url).send().await {
        Ok(response) => status_line(response.status()),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Status check failed");
            format!("Error: {}", e)
        }
    }
}

/// Formats a status code as `"<code> <reason>"`, or just the code when the
/// reason phrase is unknown
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
