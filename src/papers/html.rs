//! Rendered-HTML strategy
//!
//! arXiv serves an HTML rendering for most recent submissions. Markup is stripped with
//! the regex cleaner; what remains is good enough for keyword search.

use super::arxiv::Endpoints;
use super::AttemptFailure;
use crate::markup::strip_tags;
use crate::remote_client::Fetch;

/// Fetch the rendered HTML for `id` and strip it down to text
pub fn fetch_html_text(
    fetcher: &dyn Fetch,
    endpoints: &Endpoints,
    id: &str,
) -> Result<String, AttemptFailure> {
    let url = endpoints.html_url(id);
    let response = fetcher.get(&url)?;

    if !response.is_success() {
        return Err(AttemptFailure::Status { url, status: response.status });
    }

    Ok(strip_tags(&response.text()))
}
