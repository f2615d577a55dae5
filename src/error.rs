//! Error types shared across the harvester, the acquisition chain and the corpus run

use thiserror::Error;

/// Errors that stop a call path.
///
/// Data-dependent failures (bad HTTP status, broken archives, tool exits) never show up
/// here; they are logged and turned into "no text" inside the strategy chain.
#[derive(Error, Debug)]
pub enum Error {
    /// Local filesystem error while reading or writing artifacts
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error (connection, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Settings or artifact JSON could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Strategy name outside the supported set
    #[error("Unsupported acquisition method: {0:?} (expected html, source or pdf)")]
    UnsupportedMethod(String),

    /// Year/month outside the archive's history
    #[error("Invalid listing key {year:04}-{month:02}")]
    InvalidListingKey { year: i32, month: u32 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
