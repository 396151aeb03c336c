//! Hierarchy classification of raw TOC lines.
//!
//! Classification is a pure per-entry function of the prefix shape: no
//! cross-entry lookback, so a set of lines classifies identically in any
//! order. Aggregation per level happens later, in selection.

use crate::extract::RawTocLine;
use crate::patterns::{HeadingRole, PatternLibrary};
use std::sync::Arc;

/// Hierarchy level assigned to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Top-level chapter.
    Primary,
    /// Nested section.
    Secondary,
    /// Matched an exclusion pattern; never part of a candidate set.
    Excluded,
}

impl Level {
    /// Selection precedence: chapters beat sections.
    pub fn precedence(self) -> u8 {
        match self {
            Level::Primary => 2,
            Level::Secondary => 1,
            Level::Excluded => 0,
        }
    }
}

/// A raw TOC line with its hierarchy level and split prefix/title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEntry {
    pub raw: RawTocLine,
    pub level: Level,
    /// The numbering prefix ("第三章", "1.2"), when one was recognized.
    pub number_prefix: Option<String>,
    /// Title text after the prefix, with dot leaders and page numbers removed.
    pub title: String,
}

/// Assigns hierarchy levels from prefix shape.
#[derive(Clone)]
pub struct HierarchyClassifier {
    patterns: Arc<PatternLibrary>,
}

impl HierarchyClassifier {
    /// Create a new classifier.
    pub fn new(patterns: Arc<PatternLibrary>) -> Self {
        Self { patterns }
    }

    /// Classify one raw line.
    ///
    /// A marker matching both a chapter and a section shape resolves to
    /// `Secondary`; a line matching an exclusion pattern is `Excluded`
    /// regardless of any heading match.
    pub fn classify(&self, raw: RawTocLine) -> ClassifiedEntry {
        if self.patterns.is_excluded(&raw.raw_text) {
            let title = raw.raw_text.clone();
            return ClassifiedEntry {
                raw,
                level: Level::Excluded,
                number_prefix: None,
                title,
            };
        }

        match self.patterns.match_heading(&raw.raw_text) {
            Some(m) => {
                let level = match m.role {
                    HeadingRole::Primary => Level::Primary,
                    HeadingRole::Secondary => Level::Secondary,
                };
                let title = self.patterns.trim_leader(m.rest).to_string();
                let number_prefix = Some(m.prefix.to_string());
                ClassifiedEntry {
                    raw,
                    level,
                    number_prefix,
                    title,
                }
            }
            // No recognizable prefix; nothing to place in the hierarchy.
            None => {
                let title = raw.raw_text.clone();
                ClassifiedEntry {
                    raw,
                    level: Level::Excluded,
                    number_prefix: None,
                    title,
                }
            }
        }
    }
}
