//! Scraper settings storage
//!
//! Stores configuration (endpoints, politeness floor, external tool names) in a JSON file.
//! Every field has a default, so a missing file or a partial file both work.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_FILE: &str = "settings.json";

/// Program names for the external tools the acquisition chain shells out to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSettings {
    /// Archive unpacker (`tar -xf`)
    #[serde(default = "default_tar")]
    pub tar: String,
    /// Text search used to find the main source file (`grep -l`)
    #[serde(default = "default_grep")]
    pub grep: String,
    /// PDF-to-text renderer (ghostscript `txtwrite` device)
    #[serde(default = "default_gs")]
    pub gs: String,
    /// PDF downloader
    #[serde(default = "default_wget")]
    pub wget: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tar: default_tar(),
            grep: default_grep(),
            gs: default_gs(),
            wget: default_wget(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Root of the `ids/`, `text/` and `search/` artifact directories
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Listing category, e.g. "astro-ph"
    #[serde(default = "default_category")]
    pub category: String,
    /// Listing page window; large enough for one month of a busy category
    #[serde(default = "default_listing_page_size")]
    pub listing_page_size: u32,
    /// Version suffix requested from the rendered-HTML endpoint
    #[serde(default = "default_html_version")]
    pub html_version: String,
    /// Floor on the duration of every acquisition attempt
    #[serde(default = "default_min_attempt_millis")]
    pub min_attempt_millis: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Default harvest range when no year is given
    #[serde(default = "default_first_year")]
    pub first_year: i32,
    #[serde(default = "default_last_year")]
    pub last_year: i32,
    /// Extension of typesetting source files inside an archive
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// Marker identifying the main source file when an archive holds several
    #[serde(default = "default_document_class_marker")]
    pub document_class_marker: String,
    #[serde(default)]
    pub tools: ToolSettings,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_base_url() -> String {
    "https://arxiv.org".to_string()
}

fn default_category() -> String {
    "astro-ph".to_string()
}

fn default_listing_page_size() -> u32 {
    2000
}

fn default_html_version() -> String {
    "v1".to_string()
}

fn default_min_attempt_millis() -> u64 {
    200
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("astroscrape/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_first_year() -> i32 {
    2015
}

fn default_last_year() -> i32 {
    2024
}

fn default_source_extension() -> String {
    "tex".to_string()
}

fn default_document_class_marker() -> String {
    "documentclass".to_string()
}

fn default_tar() -> String {
    "tar".to_string()
}

fn default_grep() -> String {
    "grep".to_string()
}

fn default_gs() -> String {
    "gs".to_string()
}

fn default_wget() -> String {
    "wget".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            base_url: default_base_url(),
            category: default_category(),
            listing_page_size: default_listing_page_size(),
            html_version: default_html_version(),
            min_attempt_millis: default_min_attempt_millis(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            first_year: default_first_year(),
            last_year: default_last_year(),
            source_extension: default_source_extension(),
            document_class_marker: default_document_class_marker(),
            tools: ToolSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Default settings location: `<config_dir>/astroscrape/settings.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("astroscrape"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SETTINGS_FILE)
    }

    pub fn min_attempt_duration(&self) -> Duration {
        Duration::from_millis(self.min_attempt_millis)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.base_url).is_err() {
            return Err(Error::Config(format!("base_url is not a URL: {}", self.base_url)));
        }
        if self.first_year > self.last_year {
            return Err(Error::Config(format!(
                "first_year {} is after last_year {}",
                self.first_year, self.last_year
            )));
        }
        if self.listing_page_size == 0 {
            return Err(Error::Config("listing_page_size must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::load(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.min_attempt_duration(), Duration::from_millis(200));
        assert_eq!(settings.category, "astro-ph");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"category": "hep-th", "tools": {"gs": "/opt/gs"}}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.category, "hep-th");
        assert_eq!(settings.tools.gs, "/opt/gs");
        assert_eq!(settings.tools.tar, "tar");
        assert_eq!(settings.listing_page_size, 2000);
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("settings.json");
        let settings = Settings { min_attempt_millis: 0, ..Settings::default() };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"first_year": 2030, "last_year": 2020}"#).unwrap();
        assert!(matches!(Settings::load(&path), Err(Error::Config(_))));
    }
}
