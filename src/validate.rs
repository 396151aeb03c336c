//! Acceptance heuristics for classified TOC entries.
//!
//! Checks run in a fixed order and short-circuit on the first failure:
//! length bounds, script ratio, classifier exclusion, duplicate text.
//! All bounds come from [`ExtractionConfig`].

use crate::classify::{ClassifiedEntry, Level};
use crate::config::ExtractionConfig;
use crate::title::normalize_title;
use std::collections::HashSet;

/// Why an entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooShort,
    TooLong,
    LowScriptRatio,
    Excluded,
    DuplicateText,
}

/// A classified entry with its acceptance verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub entry: ClassifiedEntry,
    pub reject_reason: Option<RejectReason>,
}

impl ValidatedEntry {
    /// Whether the entry passed every check.
    pub fn accepted(&self) -> bool {
        self.reject_reason.is_none()
    }
}

/// Applies the acceptance heuristics.
#[derive(Clone)]
pub struct EntryValidator {
    config: ExtractionConfig,
}

impl EntryValidator {
    /// Create a validator with the given thresholds.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Validate a batch of entries from one source.
    ///
    /// Entries are processed in `original_order` so the duplicate check is
    /// deterministic; every other check is order-independent.
    pub fn validate_all(&self, mut entries: Vec<ClassifiedEntry>) -> Vec<ValidatedEntry> {
        entries.sort_by_key(|e| e.raw.original_order);

        let mut seen: HashSet<String> = HashSet::new();
        entries
            .into_iter()
            .map(|entry| {
                let reject_reason = self.check(&entry, &mut seen);
                ValidatedEntry {
                    entry,
                    reject_reason,
                }
            })
            .collect()
    }

    fn check(&self, entry: &ClassifiedEntry, seen: &mut HashSet<String>) -> Option<RejectReason> {
        let len = entry.title.chars().count();
        if len < self.config.min_entry_len {
            return Some(RejectReason::TooShort);
        }
        if len > self.config.max_entry_len {
            return Some(RejectReason::TooLong);
        }

        // Replacement characters mark mis-scraped bytes; treat the whole
        // entry as script noise.
        if entry.title.contains('\u{FFFD}')
            || self.config.target_script.ratio(&entry.title) < self.config.min_script_ratio
        {
            return Some(RejectReason::LowScriptRatio);
        }

        if entry.level == Level::Excluded {
            return Some(RejectReason::Excluded);
        }

        if !seen.insert(normalize_title(&entry.title)) {
            return Some(RejectReason::DuplicateText);
        }

        None
    }
}
