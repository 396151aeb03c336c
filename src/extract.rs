//! TOC line extraction from page text.
//!
//! Splits a page into lines, drops everything matching the exclusion
//! tables, and keeps the lines that carry a recognized heading prefix.
//! Source-document order is recorded as `original_order` and is the sole
//! ordering signal used downstream; heading numbers in scraped text are
//! too unreliable to sort by.

use crate::patterns::PatternLibrary;
use std::sync::Arc;

/// Decoration characters stripped from the front of a line before matching.
const LINE_DECORATIONS: &[char] = &['·', '•', '●', '-', '—', '*', '>', '|'];

/// One raw TOC line as found in a source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTocLine {
    /// The matched line, trimmed of surrounding decoration.
    pub raw_text: String,
    /// Position of the line in the source document.
    pub original_order: usize,
    /// Page the line was extracted from.
    pub source_url: String,
}

/// Extracts candidate chapter/section lines from a page's text.
#[derive(Clone)]
pub struct TocEntryExtractor {
    patterns: Arc<PatternLibrary>,
}

impl TocEntryExtractor {
    /// Create a new entry extractor.
    pub fn new(patterns: Arc<PatternLibrary>) -> Self {
        Self { patterns }
    }

    /// Extract raw TOC lines from `text`.
    ///
    /// Exclusion patterns win over heading patterns on the same line.
    /// Pure function of the input; an empty result is a normal outcome.
    pub fn extract(&self, text: &str, source_url: &str) -> Vec<RawTocLine> {
        let mut lines = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim().trim_start_matches(LINE_DECORATIONS).trim_start();
            if line.is_empty() {
                continue;
            }
            if self.patterns.is_excluded(line) {
                continue;
            }
            let Some(m) = self.patterns.match_heading(line) else {
                continue;
            };
            if m.rest.trim().is_empty() {
                continue;
            }
            lines.push(RawTocLine {
                raw_text: line.to_string(),
                original_order: index,
                source_url: source_url.to_string(),
            });
        }

        lines
    }
}
