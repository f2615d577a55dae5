//! arXiv endpoints and listing-page parsing
//!
//! Endpoints used:
//! - `/list/{category}/{YYYY}-{MM}?skip=0&show=N` monthly listing
//! - `/html/{id}{version}` rendered HTML
//! - `/src/{id}` typesetting source archive
//! - `/pdf/{id}` PDF
//!
//! No API key required. Politeness is enforced by the resolver's attempt floor.

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::utils::dedup_ordered;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Token after `id=`, quotes and markup excluded
static LISTING_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id=["']?([^"'<>\s&]+)"#).unwrap());

const ABSTRACT_MARKER: &str = "Abstract";

/// URL builder for one arXiv mirror
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    category: String,
    page_size: u32,
    html_version: String,
}

impl Endpoints {
    pub fn new(settings: &Settings) -> Result<Self> {
        let base = Url::parse(&settings.base_url)
            .map_err(|e| Error::Config(format!("invalid base_url {}: {}", settings.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!("base_url cannot be a base: {}", settings.base_url)));
        }
        Ok(Self {
            base,
            category: settings.category.clone(),
            page_size: settings.listing_page_size,
            html_version: settings.html_version.clone(),
        })
    }

    fn url_for(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", prefix, path));
        url.set_query(None);
        url
    }

    /// Listing page for one month, with a window large enough for the whole month
    pub fn listing_url(&self, year: i32, month: u32) -> String {
        let mut url = self.url_for(&format!("list/{}/{:04}-{:02}", self.category, year, month));
        url.query_pairs_mut()
            .append_pair("skip", "0")
            .append_pair("show", &self.page_size.to_string());
        url.to_string()
    }

    pub fn html_url(&self, id: &str) -> String {
        self.url_for(&format!("html/{}{}", id, self.html_version)).to_string()
    }

    pub fn source_url(&self, id: &str) -> String {
        self.url_for(&format!("src/{}", id)).to_string()
    }

    pub fn pdf_url(&self, id: &str) -> String {
        self.url_for(&format!("pdf/{}", id)).to_string()
    }
}

/// Extract identifiers from a listing page
///
/// Only lines carrying both the "Abstract" link marker and an `id=` attribute count;
/// the token after the last `id=` is taken. Duplicates keep their first position.
pub fn parse_listing(body: &str) -> Vec<String> {
    let ids = body
        .lines()
        .filter(|line| line.contains(ABSTRACT_MARKER) && line.contains("id="))
        .filter_map(|line| {
            LISTING_ID_REGEX
                .captures_iter(line)
                .last()
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        });
    dedup_ordered(ids)
}
