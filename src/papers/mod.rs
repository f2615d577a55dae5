//! Full-text acquisition for arXiv papers
//!
//! Three strategies, each independently invocable:
//! 1. Rendered HTML (`/html/{id}v1`, tags stripped)
//! 2. Source archive (`/src/{id}`, main `.tex` file)
//! 3. Rendered PDF (`/pdf/{id}` through ghostscript `txtwrite`)
//!
//! The corpus run tries them as html → pdf → source.

pub mod arxiv;
pub mod html;
pub mod source;
pub mod pdf_extractor;
pub mod resolver;

use crate::error::Error;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error as ThisError;

/// One retrieval + extraction method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Html,
    Source,
    Pdf,
}

impl Strategy {
    /// Fallback order used by corpus runs
    pub const CORPUS_ORDER: [Strategy; 3] = [Strategy::Html, Strategy::Pdf, Strategy::Source];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Html => "html",
            Strategy::Source => "source",
            Strategy::Pdf => "pdf",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Strategy::Html),
            "source" => Ok(Strategy::Source),
            "pdf" => Ok(Strategy::Pdf),
            other => Err(Error::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Why a single attempt produced no text. Logged by the resolver, never propagated.
#[derive(ThisError, Debug)]
pub enum AttemptFailure {
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] Error),

    #[error("could not stage working files: {0}")]
    Stage(#[from] std::io::Error),

    #[error("{program} could not be started: {source}")]
    ToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with failure: {stderr}")]
    ToolFailed { program: String, stderr: String },

    #[error("archive contains no .{0} files")]
    NoSourceFiles(String),

    #[error("{0} source files and no unique document class; unclear which one to use")]
    AmbiguousSource(usize),

    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Text produced by a successful attempt
#[derive(Debug, Clone)]
pub struct AcquiredText {
    pub text: String,
    pub strategy: Strategy,
}

/// Attempt/success counters per strategy
#[derive(Debug, Default, Clone, Serialize)]
pub struct AcquisitionStats {
    pub html_success: u32,
    pub html_attempts: u32,
    pub pdf_success: u32,
    pub pdf_attempts: u32,
    pub source_success: u32,
    pub source_attempts: u32,
}

impl AcquisitionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, strategy: Strategy, success: bool) {
        let (attempts, successes) = match strategy {
            Strategy::Html => (&mut self.html_attempts, &mut self.html_success),
            Strategy::Pdf => (&mut self.pdf_attempts, &mut self.pdf_success),
            Strategy::Source => (&mut self.source_attempts, &mut self.source_success),
        };
        *attempts += 1;
        if success {
            *successes += 1;
        }
    }

    pub fn print_summary(&self) {
        println!("\nText Acquisition Results:");
        self.print_source("HTML", self.html_success, self.html_attempts);
        self.print_source("PDF", self.pdf_success, self.pdf_attempts);
        self.print_source("Source", self.source_success, self.source_attempts);
    }

    fn print_source(&self, name: &str, success: u32, attempts: u32) {
        if attempts > 0 {
            let rate = (success as f64 / attempts as f64) * 100.0;
            println!("  {:12} {:3}/{:3}  ({:.0}%)",
                     format!("{}:", name), success, attempts, rate);
        }
    }
}

/// Join lines with `\n`, dropping `\r\n` endings and the trailing newline
pub(crate) fn join_lines(content: &str) -> String {
    content.lines().collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("html".parse::<Strategy>().unwrap(), Strategy::Html);
        assert_eq!("source".parse::<Strategy>().unwrap(), Strategy::Source);
        assert_eq!("pdf".parse::<Strategy>().unwrap(), Strategy::Pdf);
    }

    #[test]
    fn test_unsupported_method_is_distinct_error() {
        match "docx".parse::<Strategy>() {
            Err(Error::UnsupportedMethod(name)) => assert_eq!(name, "docx"),
            other => panic!("expected UnsupportedMethod, got {:?}", other),
        }
    }

    #[test]
    fn test_corpus_order() {
        assert_eq!(
            Strategy::CORPUS_ORDER,
            [Strategy::Html, Strategy::Pdf, Strategy::Source]
        );
    }

    #[test]
    fn test_stats_record() {
        let mut stats = AcquisitionStats::new();
        stats.record(Strategy::Html, false);
        stats.record(Strategy::Pdf, true);
        stats.record(Strategy::Html, true);
        assert_eq!(stats.html_attempts, 2);
        assert_eq!(stats.html_success, 1);
        assert_eq!(stats.pdf_attempts, 1);
        assert_eq!(stats.pdf_success, 1);
        assert_eq!(stats.source_attempts, 0);
    }

    #[test]
    fn test_join_lines() {
        assert_eq!(join_lines("a\r\nb\nc\n"), "a\nb\nc");
        assert_eq!(join_lines(""), "");
    }
}
