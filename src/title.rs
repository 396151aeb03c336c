//! Book-title extraction from noisy page text.
//!
//! Finds quoted book titles with an adjacent author name, filters out
//! URL/markup noise by length and script-ratio bounds, and deduplicates
//! while preserving first-occurrence order.

use crate::config::ExtractionConfig;
use crate::patterns::PatternLibrary;
use std::collections::HashSet;
use std::sync::Arc;

/// Interior-span length bounds for a plausible book title, in characters.
const MIN_TITLE_LEN: usize = 2;
const MAX_TITLE_LEN: usize = 60;

/// A candidate book title found in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCandidate {
    pub title: String,
    pub author: Option<String>,
    pub source_url: String,
}

/// Extracts candidate book titles from a page's text.
#[derive(Clone)]
pub struct TitleExtractor {
    patterns: Arc<PatternLibrary>,
    config: ExtractionConfig,
}

impl TitleExtractor {
    /// Create a new title extractor.
    pub fn new(patterns: Arc<PatternLibrary>, config: ExtractionConfig) -> Self {
        Self { patterns, config }
    }

    /// Extract candidate titles from `text`.
    ///
    /// Pure function of the input text; an empty result is a normal outcome,
    /// not an error.
    pub fn extract(&self, text: &str, source_url: &str) -> Vec<TitleCandidate> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        for m in self.patterns.book_titles(text) {
            let title = m.title.trim();
            if !self.plausible_title(title) {
                continue;
            }
            if !seen.insert(normalize_title(title)) {
                continue;
            }
            candidates.push(TitleCandidate {
                title: title.to_string(),
                author: m.author.map(str::to_string),
                source_url: source_url.to_string(),
            });
            if candidates.len() >= self.config.max_title_candidates {
                break;
            }
        }

        candidates
    }

    fn plausible_title(&self, title: &str) -> bool {
        let len = title.chars().count();
        if !(MIN_TITLE_LEN..=MAX_TITLE_LEN).contains(&len) {
            return false;
        }
        self.config.target_script.ratio(title) >= self.config.min_script_ratio
    }
}

/// Whitespace-collapsed, case-folded dedup key.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
