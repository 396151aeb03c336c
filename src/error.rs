//! Error types for the TOC pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, TocForgeError>;

/// Errors that can occur in the TOC pipeline.
///
/// Collaborator failures (`SearchUnavailable`, `FetchError`, `FetchTimeout`)
/// are per-URL conditions: callers exclude the affected URL and continue.
/// Only `MalformedBeyondRepair` and `SchemaMismatch` are fatal for a run.
#[derive(Error, Debug)]
pub enum TocForgeError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No book-title candidates were found for the subject.
    #[error("No candidate book titles found for '{0}'")]
    NoCandidateTitles(String),

    /// No candidate page yielded an eligible table of contents.
    #[error("No candidate page yielded at least {minimum} accepted TOC entries")]
    NoEligibleTocSet { minimum: usize },

    /// The search provider failed or returned an error response.
    #[error("Search provider unavailable: {0}")]
    SearchUnavailable(String),

    /// A page fetch failed (HTTP error or malformed content).
    #[error("Fetch failed for '{url}': {reason}")]
    FetchError { url: String, reason: String },

    /// A page fetch exceeded its timeout.
    #[error("Fetch timed out for '{url}'")]
    FetchTimeout { url: String },

    /// Structural repair exhausted its strategies without producing valid JSON.
    #[error("JSON is malformed beyond repair: {0}")]
    MalformedBeyondRepair(String),

    /// Repaired JSON parses but does not match the expected output schema.
    #[error("Repaired JSON does not match the expected schema: {0}")]
    SchemaMismatch(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TocForgeError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for TocForgeError {
    fn from(err: reqwest::Error) -> Self {
        TocForgeError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for TocForgeError {
    fn from(err: serde_json::Error) -> Self {
        TocForgeError::Serialization(err.to_string())
    }
}
