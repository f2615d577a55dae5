//! On-disk artifact layout
//!
//! Three flat directories under the data root:
//! - `ids/arxiv_ids_YYYY-MM.txt`: one identifier per line, one file per listing month
//! - `text/<id>_text.txt`: extracted text, gzip-compressed in place to `.txt.gz`
//! - `search/<id>_search.json`: keyword classification
//!
//! Artifacts are append-only; callers decide when overwriting is allowed.

use crate::classification::Classification;
use crate::error::Result;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

const IDS_DIR: &str = "ids";
const TEXT_DIR: &str = "text";
const SEARCH_DIR: &str = "search";
const LISTING_PREFIX: &str = "arxiv_ids_";

/// File-name stem for an identifier. Old-style ids ("astro-ph/0601001") contain a slash.
fn artifact_stem(id: &str) -> String {
    id.replace('/', "_")
}

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open a store rooted at `root`, creating the artifact directories
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { root: root.into() };
        for dir in [IDS_DIR, TEXT_DIR, SEARCH_DIR] {
            fs::create_dir_all(store.root.join(dir))?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ==================== Listings ====================

    pub fn listing_path(&self, year: i32, month: u32) -> PathBuf {
        self.root
            .join(IDS_DIR)
            .join(format!("{}{:04}-{:02}.txt", LISTING_PREFIX, year, month))
    }

    pub fn has_listing(&self, year: i32, month: u32) -> bool {
        self.listing_path(year, month).exists()
    }

    pub fn write_listing(&self, year: i32, month: u32, ids: &[String]) -> Result<PathBuf> {
        let path = self.listing_path(year, month);
        let mut content = ids.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Listing artifacts, optionally restricted to one year, sorted by name
    pub fn listing_files(&self, year: Option<i32>) -> Result<Vec<PathBuf>> {
        let prefix = match year {
            Some(y) => format!("{}{:04}", LISTING_PREFIX, y),
            None => LISTING_PREFIX.to_string(),
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(self.root.join(IDS_DIR))? {
            let path = entry?.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|name| name.starts_with(&prefix) && name.ends_with(".txt"))
                .unwrap_or(false);
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Identifiers in one listing artifact; blank lines are skipped
    pub fn read_listing(&self, path: &Path) -> Result<Vec<String>> {
        let content = fs::read_to_string(path)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    // ==================== Text ====================

    pub fn text_path(&self, id: &str) -> PathBuf {
        self.root
            .join(TEXT_DIR)
            .join(format!("{}_text.txt", artifact_stem(id)))
    }

    pub fn compressed_text_path(&self, id: &str) -> PathBuf {
        gz_path(&self.text_path(id))
    }

    /// A record is complete once either text artifact exists. A crash between write and
    /// compress leaves only the raw file, which still counts.
    pub fn is_complete(&self, id: &str) -> bool {
        self.text_path(id).exists() || self.compressed_text_path(id).exists()
    }

    pub fn write_text(&self, id: &str, text: &str) -> Result<PathBuf> {
        let path = self.text_path(id);
        fs::write(&path, text)?;
        Ok(path)
    }

    /// Stored text for an identifier, compressed or not
    pub fn read_text(&self, id: &str) -> Result<Option<String>> {
        for path in [self.compressed_text_path(id), self.text_path(id)] {
            if path.exists() {
                return read_text_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    // ==================== Classification ====================

    pub fn search_path(&self, id: &str) -> PathBuf {
        self.root
            .join(SEARCH_DIR)
            .join(format!("{}_search.json", artifact_stem(id)))
    }

    pub fn write_classification(&self, id: &str, result: &Classification) -> Result<PathBuf> {
        let path = self.search_path(id);
        fs::write(&path, serde_json::to_string(result)?)?;
        Ok(path)
    }

    pub fn read_classification(&self, id: &str) -> Result<Option<Classification>> {
        let path = self.search_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Gzip `path` to `path.gz` and remove the original. Returns the compressed path.
pub fn compress_in_place(path: &Path) -> Result<PathBuf> {
    let target = gz_path(path);
    {
        let mut input = BufReader::new(File::open(path)?);
        let mut encoder = GzEncoder::new(BufWriter::new(File::create(&target)?), Compression::default());
        io::copy(&mut input, &mut encoder)?;
        encoder.finish()?.into_inner().map_err(|e| e.into_error())?;
    }
    fs::remove_file(path)?;
    Ok(target)
}

/// Read a text file, transparently decompressing `.gz`
pub fn read_text_file(path: &Path) -> Result<String> {
    let raw = fs::read(path)?;
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut text = String::new();
        decoder.read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(String::from_utf8(raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, Store) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_layout_created() {
        let (tmp, _store) = store();
        for dir in ["ids", "text", "search"] {
            assert!(tmp.path().join(dir).is_dir());
        }
    }

    #[test]
    fn test_listing_write_read() {
        let (_tmp, store) = store();
        let ids = vec!["2401.00001".to_string(), "2401.00002".to_string()];
        let path = store.write_listing(2024, 1, &ids).unwrap();

        assert!(path.ends_with("ids/arxiv_ids_2024-01.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "2401.00001\n2401.00002\n");
        assert!(store.has_listing(2024, 1));
        assert!(!store.has_listing(2024, 2));
        assert_eq!(store.read_listing(&path).unwrap(), ids);
    }

    #[test]
    fn test_read_listing_skips_blank_lines() {
        let (_tmp, store) = store();
        let path = store.listing_path(2023, 5);
        fs::write(&path, "2305.1\n\n  2305.2  \n\n").unwrap();
        assert_eq!(store.read_listing(&path).unwrap(), vec!["2305.1", "2305.2"]);
    }

    #[test]
    fn test_listing_files_filtered_and_sorted() {
        let (tmp, store) = store();
        store.write_listing(2024, 2, &[]).unwrap();
        store.write_listing(2023, 12, &[]).unwrap();
        store.write_listing(2024, 1, &[]).unwrap();
        fs::write(tmp.path().join("ids").join("notes.md"), "x").unwrap();

        let names = |files: Vec<PathBuf>| -> Vec<String> {
            files
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };

        assert_eq!(
            names(store.listing_files(None).unwrap()),
            vec!["arxiv_ids_2023-12.txt", "arxiv_ids_2024-01.txt", "arxiv_ids_2024-02.txt"]
        );
        assert_eq!(
            names(store.listing_files(Some(2024)).unwrap()),
            vec!["arxiv_ids_2024-01.txt", "arxiv_ids_2024-02.txt"]
        );
        assert!(store.listing_files(Some(2019)).unwrap().is_empty());
    }

    #[test]
    fn test_compress_in_place() {
        let (_tmp, store) = store();
        let raw = store.write_text("2401.00185", "uses numpy").unwrap();
        assert!(store.is_complete("2401.00185"));

        let gz = compress_in_place(&raw).unwrap();
        assert!(!raw.exists());
        assert_eq!(gz, store.compressed_text_path("2401.00185"));
        assert!(store.is_complete("2401.00185"));
        assert_eq!(read_text_file(&gz).unwrap(), "uses numpy");
        assert_eq!(store.read_text("2401.00185").unwrap().as_deref(), Some("uses numpy"));
    }

    #[test]
    fn test_raw_text_counts_as_complete() {
        let (_tmp, store) = store();
        assert!(!store.is_complete("2401.00009"));
        store.write_text("2401.00009", "partial").unwrap();
        assert!(store.is_complete("2401.00009"));
        assert_eq!(store.read_text("2401.00009").unwrap().as_deref(), Some("partial"));
    }

    #[test]
    fn test_old_style_id_paths() {
        let (_tmp, store) = store();
        let path = store.text_path("astro-ph/0601001");
        assert!(path.ends_with("text/astro-ph_0601001_text.txt"));
        store.write_text("astro-ph/0601001", "x").unwrap();
        assert!(store.is_complete("astro-ph/0601001"));
    }

    #[test]
    fn test_classification_roundtrip() {
        let (_tmp, store) = store();
        assert_eq!(store.read_classification("2401.1").unwrap(), None);

        let result = crate::classification::classify("astropy");
        let path = store.write_classification("2401.1", &result).unwrap();
        assert!(path.ends_with("search/2401.1_search.json"));
        assert_eq!(store.read_classification("2401.1").unwrap(), Some(result));
    }
}
