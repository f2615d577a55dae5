//! Corpus run: every harvested identifier through acquisition and classification
//!
//! Identifiers come from the persisted listings, deduplicated in first-seen order.
//! Records that already have text (raw or compressed) are skipped unless `overwrite`,
//! so a run can be interrupted and rerun at any point.

use crate::classification::{classify, Classification};
use crate::error::Result;
use crate::papers::resolver::TextResolver;
use crate::papers::{AcquisitionStats, Strategy};
use crate::store::{compress_in_place, Store};
use crate::utils::dedup_ordered;
use serde::Serialize;

/// Corpus run summary
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub identifiers: usize,
    pub skipped: usize,
    pub acquired: usize,
    pub failed: usize,
    pub python_ecosystem: usize,
    pub julia: usize,
    /// Identifiers no strategy could get text for
    pub failures: Vec<String>,
}

/// Outcome for one processed identifier
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub strategy: Strategy,
    pub classification: Classification,
    pub is_python_ecosystem: bool,
    pub is_julia: bool,
}

pub struct Corpus<'a> {
    store: &'a Store,
    resolver: TextResolver<'a>,
}

impl<'a> Corpus<'a> {
    pub fn new(store: &'a Store, resolver: TextResolver<'a>) -> Self {
        Self { store, resolver }
    }

    /// Unique identifiers across all listings (or one year's), in first-seen order
    pub fn identifiers(&self, year: Option<i32>) -> Result<Vec<String>> {
        let mut all = Vec::new();
        for path in self.store.listing_files(year)? {
            all.extend(self.store.read_listing(&path)?);
        }
        Ok(dedup_ordered(all))
    }

    /// Process every identifier not yet complete
    pub fn run(&mut self, year: Option<i32>, overwrite: bool) -> Result<RunReport> {
        let ids = self.identifiers(year)?;
        let total = ids.len();
        tracing::info!("[Corpus] {} ids", total);

        let mut report = RunReport { identifiers: total, ..RunReport::default() };

        for (i, id) in ids.iter().enumerate() {
            let position = i + 1;

            if self.store.is_complete(id) && !overwrite {
                report.skipped += 1;
                continue;
            }

            match self.process(id)? {
                Some(summary) => {
                    report.acquired += 1;
                    if summary.is_python_ecosystem {
                        report.python_ecosystem += 1;
                    }
                    if summary.is_julia {
                        report.julia += 1;
                    }
                    tracing::info!(
                        "[Corpus] {}/{} {} python={} julia={} (via {})",
                        position, total, id, summary.is_python_ecosystem, summary.is_julia, summary.strategy
                    );
                }
                None => {
                    report.failed += 1;
                    report.failures.push(id.clone());
                    tracing::warn!("[Corpus] {}/{} {}: no text from any strategy", position, total, id);
                }
            }
        }

        Ok(report)
    }

    /// Acquire, persist and classify one identifier
    ///
    /// `Ok(None)` when every strategy failed; `Err` only for local storage errors.
    pub fn process(&mut self, id: &str) -> Result<Option<DocumentSummary>> {
        let acquired = match self.resolver.resolve(id, &Strategy::CORPUS_ORDER) {
            Some(acquired) => acquired,
            None => return Ok(None),
        };

        let raw = self.store.write_text(id, &acquired.text)?;
        compress_in_place(&raw)?;

        let classification = classify(&acquired.text);
        self.store.write_classification(id, &classification)?;

        Ok(Some(DocumentSummary {
            id: id.to_string(),
            strategy: acquired.strategy,
            classification,
            is_python_ecosystem: classification.is_python_ecosystem(),
            is_julia: classification.is_julia(),
        }))
    }

    pub fn stats(&self) -> &AcquisitionStats {
        self.resolver.get_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote_client::{Fetch, FetchResponse};
    use crate::settings::Settings;
    use crate::tools::{ToolOutput, ToolRunner};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::fs;
    use std::path::Path;

    /// Rendered-HTML pages by identifier; everything else 404
    struct HtmlServer {
        pages: HashMap<&'static str, &'static str>,
        hits: RefCell<Vec<String>>,
    }

    impl HtmlServer {
        fn new(pages: &[(&'static str, &'static str)]) -> Self {
            Self { pages: pages.iter().copied().collect(), hits: RefCell::new(Vec::new()) }
        }
    }

    impl Fetch for HtmlServer {
        fn get(&self, url: &str) -> Result<FetchResponse> {
            self.hits.borrow_mut().push(url.to_string());
            let page = url
                .strip_prefix("https://arxiv.org/html/")
                .and_then(|rest| rest.strip_suffix("v1"))
                .and_then(|id| self.pages.get(id));
            Ok(match page {
                Some(body) => FetchResponse { status: 200, body: body.as_bytes().to_vec() },
                None => FetchResponse { status: 404, body: Vec::new() },
            })
        }
    }

    /// Every external tool fails, so only the HTML path can succeed
    struct NoTools;

    impl ToolRunner for NoTools {
        fn run(&self, _: &str, _: &[OsString], _: Option<&Path>) -> std::io::Result<ToolOutput> {
            Ok(ToolOutput { success: false, ..Default::default() })
        }
    }

    fn fast_settings() -> Settings {
        Settings { min_attempt_millis: 0, ..Settings::default() }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_end_to_end_html_document() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.write_listing(2024, 1, &ids(&["2401.00185"])).unwrap();

        let settings = fast_settings();
        let server = HtmlServer::new(&[(
            "2401.00185",
            "<html><body><p>... uses numpy and astropy ...</p></body></html>",
        )]);
        let resolver = TextResolver::new(&server, &NoTools, &settings).unwrap();
        let mut corpus = Corpus::new(&store, resolver);

        let report = corpus.run(None, false).unwrap();
        assert_eq!(report.acquired, 1);
        assert_eq!(report.python_ecosystem, 1);
        assert_eq!(report.julia, 0);

        assert!(!store.text_path("2401.00185").exists());
        assert!(store.compressed_text_path("2401.00185").exists());
        assert_eq!(
            store.read_text("2401.00185").unwrap().as_deref(),
            Some("... uses numpy and astropy ...")
        );

        let expected = Classification {
            python: false,
            numpy: true,
            scipy: false,
            astropy: true,
            sklearn: false,
            julia: false,
        };
        assert_eq!(store.read_classification("2401.00185").unwrap(), Some(expected));
        assert!(expected.is_python_ecosystem());
        assert!(!expected.is_julia());
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.write_listing(2024, 1, &ids(&["2401.00001", "2401.00002"])).unwrap();

        let settings = fast_settings();
        let server = HtmlServer::new(&[("2401.00001", "python"), ("2401.00002", "julia")]);

        let resolver = TextResolver::new(&server, &NoTools, &settings).unwrap();
        let first = Corpus::new(&store, resolver).run(None, false).unwrap();
        assert_eq!(first.acquired, 2);
        let hits_after_first = server.hits.borrow().len();
        let search_files = fs::read_dir(tmp.path().join("search")).unwrap().count();

        let resolver = TextResolver::new(&server, &NoTools, &settings).unwrap();
        let second = Corpus::new(&store, resolver).run(None, false).unwrap();
        assert_eq!(second.skipped, 2);
        assert_eq!(second.acquired, 0);
        assert_eq!(server.hits.borrow().len(), hits_after_first);
        assert_eq!(fs::read_dir(tmp.path().join("search")).unwrap().count(), search_files);
    }

    #[test]
    fn test_overwrite_reprocesses_complete_records() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.write_listing(2024, 1, &ids(&["2401.00001"])).unwrap();
        store.write_text("2401.00001", "stale").unwrap();

        let settings = fast_settings();
        let server = HtmlServer::new(&[("2401.00001", "fresh scipy text")]);
        let resolver = TextResolver::new(&server, &NoTools, &settings).unwrap();
        let mut corpus = Corpus::new(&store, resolver);

        assert_eq!(corpus.run(None, false).unwrap().skipped, 1);
        let report = corpus.run(None, true).unwrap();
        assert_eq!(report.acquired, 1);
        assert!(!store.text_path("2401.00001").exists());
        assert_eq!(store.read_text("2401.00001").unwrap().as_deref(), Some("fresh scipy text"));
        assert!(store.read_classification("2401.00001").unwrap().unwrap().scipy);
    }

    #[test]
    fn test_failed_identifier_does_not_stop_run() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.write_listing(2024, 1, &ids(&["2401.00404", "2401.00002"])).unwrap();

        let settings = fast_settings();
        let server = HtmlServer::new(&[("2401.00002", "sklearn")]);
        let resolver = TextResolver::new(&server, &NoTools, &settings).unwrap();
        let mut corpus = Corpus::new(&store, resolver);

        let report = corpus.run(None, false).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures, vec!["2401.00404"]);
        assert_eq!(report.acquired, 1);
        assert!(!store.is_complete("2401.00404"));
        assert_eq!(store.read_classification("2401.00404").unwrap(), None);

        // All three strategies were tried for the failing id
        let stats = corpus.stats();
        assert_eq!(stats.html_attempts, 2);
        assert_eq!(stats.pdf_attempts, 1);
        assert_eq!(stats.source_attempts, 1);
    }

    #[test]
    fn test_identifiers_deduplicated_across_listings() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.write_listing(2023, 12, &ids(&["2312.1", "2401.5"])).unwrap();
        store.write_listing(2024, 1, &ids(&["2401.5", "2401.6"])).unwrap();
        store.write_listing(2024, 2, &ids(&["2402.1", "2401.6"])).unwrap();

        let settings = fast_settings();
        let server = HtmlServer::new(&[]);
        let resolver = TextResolver::new(&server, &NoTools, &settings).unwrap();
        let corpus = Corpus::new(&store, resolver);

        assert_eq!(corpus.identifiers(None).unwrap(), ids(&["2312.1", "2401.5", "2401.6", "2402.1"]));
        assert_eq!(corpus.identifiers(Some(2024)).unwrap(), ids(&["2401.5", "2401.6", "2402.1"]));
        assert!(corpus.identifiers(Some(2015)).unwrap().is_empty());
    }

    #[test]
    fn test_uncompressed_leftover_counts_as_complete() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.write_listing(2024, 1, &ids(&["2401.00001"])).unwrap();
        // Simulates a crash between write and compress
        store.write_text("2401.00001", "numpy").unwrap();

        let settings = fast_settings();
        let server = HtmlServer::new(&[("2401.00001", "numpy")]);
        let resolver = TextResolver::new(&server, &NoTools, &settings).unwrap();
        let report = Corpus::new(&store, resolver).run(None, false).unwrap();

        assert_eq!(report.skipped, 1);
        assert!(server.hits.borrow().is_empty());
    }
}
