//! Text Resolver - ordered fallback chain over the acquisition strategies
//!
//! Every attempt is floored at the configured minimum duration (200 ms by default):
//! fast failures and fast successes alike sleep out the remainder, which bounds the
//! request rate against arXiv no matter which step returned.

use super::arxiv::Endpoints;
use super::html::fetch_html_text;
use super::pdf_extractor::render_pdf_text;
use super::source::fetch_source_text;
use super::{AcquiredText, AcquisitionStats, AttemptFailure, Strategy};
use crate::error::Result;
use crate::remote_client::Fetch;
use crate::settings::Settings;
use crate::tools::ToolRunner;
use std::time::{Duration, Instant};

/// Text resolver that tries strategies in a given order
pub struct TextResolver<'a> {
    pub stats: AcquisitionStats,
    fetcher: &'a dyn Fetch,
    tools: &'a dyn ToolRunner,
    settings: &'a Settings,
    endpoints: Endpoints,
}

impl<'a> TextResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetch, tools: &'a dyn ToolRunner, settings: &'a Settings) -> Result<Self> {
        Ok(Self {
            stats: AcquisitionStats::new(),
            fetcher,
            tools,
            settings,
            endpoints: Endpoints::new(settings)?,
        })
    }

    /// Run one strategy by name
    ///
    /// Unknown names fail with `Error::UnsupportedMethod` before any request is made.
    pub fn acquire_named(&mut self, id: &str, method: &str) -> Result<Option<String>> {
        let strategy: Strategy = method.parse()?;
        Ok(self.acquire(id, strategy))
    }

    /// Run one strategy; `None` when it produced no text
    pub fn acquire(&mut self, id: &str, strategy: Strategy) -> Option<String> {
        let started = Instant::now();
        let outcome = self.dispatch(id, strategy);
        pace(started, self.settings.min_attempt_duration());

        self.stats.record(strategy, outcome.is_ok());
        match outcome {
            Ok(text) => {
                tracing::debug!("[Acquire] {} via {}: {} bytes", id, strategy, text.len());
                Some(text)
            }
            Err(e) => {
                tracing::warn!("[Acquire] {} via {} failed: {}", id, strategy, e);
                None
            }
        }
    }

    /// Resolve text using the first strategy in `order` that succeeds
    pub fn resolve(&mut self, id: &str, order: &[Strategy]) -> Option<AcquiredText> {
        order.iter().find_map(|&strategy| {
            self.acquire(id, strategy)
                .map(|text| AcquiredText { text, strategy })
        })
    }

    /// Get statistics summary
    pub fn get_stats(&self) -> &AcquisitionStats {
        &self.stats
    }

    fn dispatch(&self, id: &str, strategy: Strategy) -> std::result::Result<String, AttemptFailure> {
        match strategy {
            Strategy::Html => fetch_html_text(self.fetcher, &self.endpoints, id),
            Strategy::Source => fetch_source_text(self.fetcher, self.tools, self.settings, &self.endpoints, id),
            Strategy::Pdf => render_pdf_text(self.tools, self.settings, &self.endpoints, id),
        }
    }
}

/// Sleep out whatever is left of `floor` since `started`
fn pace(started: Instant, floor: Duration) {
    let elapsed = started.elapsed();
    if elapsed < floor {
        std::thread::sleep(floor - elapsed);
    }
}
