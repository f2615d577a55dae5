//! Monthly listing harvester
//!
//! One listing fetch per (year, month), persisted as `ids/arxiv_ids_YYYY-MM.txt`.
//! Existing listings are a cache: they are only re-fetched with `overwrite`.

use crate::error::{Error, Result};
use crate::papers::arxiv::{parse_listing, Endpoints};
use crate::remote_client::Fetch;
use crate::settings::Settings;
use crate::store::Store;
use chrono::{Datelike, Utc};
use serde::Serialize;

/// First listing month in the archive's history
const FIRST_ARCHIVE_YEAR: i32 = 1991;

/// What happened to one listing month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "count")]
pub enum HarvestOutcome {
    /// Listing already on disk, nothing fetched
    Cached,
    /// Listing fetched and persisted with this many identifiers
    Fetched(usize),
    /// Remote failure; an empty listing was persisted (re-fetch with `overwrite`)
    Failed,
}

/// Reject keys outside the archive's history before any request is made
pub fn validate_listing_key(year: i32, month: u32) -> Result<()> {
    let current_year = Utc::now().year();
    if !(FIRST_ARCHIVE_YEAR..=current_year).contains(&year) || !(1..=12).contains(&month) {
        return Err(Error::InvalidListingKey { year, month });
    }
    Ok(())
}

pub struct Harvester<'a> {
    fetcher: &'a dyn Fetch,
    store: &'a Store,
    endpoints: Endpoints,
}

impl<'a> Harvester<'a> {
    pub fn new(fetcher: &'a dyn Fetch, store: &'a Store, settings: &Settings) -> Result<Self> {
        Ok(Self {
            fetcher,
            store,
            endpoints: Endpoints::new(settings)?,
        })
    }

    /// Fetch and persist the identifiers listed for one month
    pub fn harvest(&self, year: i32, month: u32, overwrite: bool) -> Result<HarvestOutcome> {
        validate_listing_key(year, month)?;

        if self.store.has_listing(year, month) && !overwrite {
            tracing::debug!("[Harvester] {:04}-{:02} already harvested", year, month);
            return Ok(HarvestOutcome::Cached);
        }

        let url = self.endpoints.listing_url(year, month);
        let response = match self.fetcher.get(&url) {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::warn!("[Harvester] {:04}-{:02}: {} returned status {}", year, month, url, response.status);
                self.store.write_listing(year, month, &[])?;
                return Ok(HarvestOutcome::Failed);
            }
            Err(e) => {
                tracing::warn!("[Harvester] {:04}-{:02}: request failed: {}", year, month, e);
                self.store.write_listing(year, month, &[])?;
                return Ok(HarvestOutcome::Failed);
            }
        };

        let ids = parse_listing(&response.text());
        self.store.write_listing(year, month, &ids)?;
        tracing::info!("[Harvester] {:04}-{:02}: {} ids", year, month, ids.len());
        Ok(HarvestOutcome::Fetched(ids.len()))
    }

    /// Harvest every (year, month) pair; remote failures never stop the loop
    pub fn harvest_range(
        &self,
        years: &[i32],
        months: &[u32],
        overwrite: bool,
        on_progress: impl Fn(i32, u32, HarvestOutcome),
    ) -> Result<Vec<(i32, u32, HarvestOutcome)>> {
        for &year in years {
            for &month in months {
                validate_listing_key(year, month)?;
            }
        }

        let mut outcomes = Vec::with_capacity(years.len() * months.len());
        for &year in years {
            for &month in months {
                let outcome = self.harvest(year, month, overwrite)?;
                on_progress(year, month, outcome);
                outcomes.push((year, month, outcome));
            }
        }
        Ok(outcomes)
    }
}
