//! Candidate-set scoring and selection across source pages.
//!
//! Accepted entries are grouped per (source URL, level). A set is eligible
//! once it reaches the configured minimum size; among eligible sets,
//! chapter-level sets beat section-level sets, larger beats smaller, and
//! ties fall to the earliest search-result rank. An empty selection is a
//! normal outcome that signals the manual-URL fallback, not an error.

use crate::classify::Level;
use crate::patterns::parse_heading_number;
use crate::validate::ValidatedEntry;

/// Accepted entries from one source page at one hierarchy level.
#[derive(Debug, Clone)]
pub struct CandidateEntrySet {
    pub source_url: String,
    /// Search-result rank of the source page (0 = first result).
    pub rank: usize,
    pub level: Level,
    /// Accepted entries, sorted strictly by `original_order`.
    pub entries: Vec<ValidatedEntry>,
    /// Whether parsed heading numbers, where present, are non-decreasing.
    pub order_preserved: bool,
}

impl CandidateEntrySet {
    /// Group the accepted entries of `validated` at `level` into a set.
    ///
    /// Entries are re-sorted by `original_order` and deduplicated by raw
    /// text, first occurrence winning.
    pub fn build(
        source_url: &str,
        rank: usize,
        level: Level,
        validated: &[ValidatedEntry],
    ) -> Self {
        let mut entries: Vec<ValidatedEntry> = validated
            .iter()
            .filter(|v| v.accepted() && v.entry.level == level)
            .cloned()
            .collect();
        entries.sort_by_key(|v| v.entry.raw.original_order);
        let mut seen = std::collections::HashSet::new();
        entries.retain(|v| seen.insert(v.entry.raw.raw_text.clone()));

        let order_preserved = heading_numbers_monotonic(&entries);

        Self {
            source_url: source_url.to_string(),
            rank,
            level,
            entries,
            order_preserved,
        }
    }

    /// Number of accepted entries in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the set reaches the minimum size threshold.
    pub fn is_eligible(&self, minimum: usize) -> bool {
        self.entries.len() >= minimum
    }

    /// Final titles in source order, with digits removed.
    ///
    /// Scraped numbering is unreliable, so digits are dropped from titles
    /// while the original appearance order is kept untouched.
    pub fn cleaned_titles(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|v| {
                v.entry
                    .title
                    .chars()
                    .filter(|c| !c.is_ascii_digit())
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .collect()
    }
}

fn heading_numbers_monotonic(entries: &[ValidatedEntry]) -> bool {
    let numbers: Vec<u32> = entries
        .iter()
        .filter_map(|v| v.entry.number_prefix.as_deref())
        .filter_map(parse_heading_number)
        .collect();
    numbers.windows(2).all(|w| w[0] <= w[1])
}

/// Outcome of selection across all candidate sets.
#[derive(Debug, Clone)]
pub enum SelectionResult {
    /// The winning set.
    Selected(CandidateEntrySet),
    /// No set was eligible; the caller should fall back to a manual URL.
    Empty,
}

impl SelectionResult {
    /// Whether selection produced no winner.
    pub fn is_empty(&self) -> bool {
        matches!(self, SelectionResult::Empty)
    }

    /// Unwrap into the winning set, if any.
    pub fn into_option(self) -> Option<CandidateEntrySet> {
        match self {
            SelectionResult::Selected(set) => Some(set),
            SelectionResult::Empty => None,
        }
    }
}

/// Picks the best candidate set.
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    min_eligible_set_size: usize,
}

impl CandidateSelector {
    /// Create a selector with the given eligibility threshold.
    pub fn new(min_eligible_set_size: usize) -> Self {
        Self {
            min_eligible_set_size,
        }
    }

    /// Select the winning set, or `Empty` when none is eligible.
    ///
    /// Pure selection over already-computed data: if any set reaches the
    /// threshold, `Empty` is never returned.
    pub fn select(&self, sets: Vec<CandidateEntrySet>) -> SelectionResult {
        let mut best: Option<CandidateEntrySet> = None;

        for set in sets {
            if !set.is_eligible(self.min_eligible_set_size) {
                continue;
            }
            match &best {
                None => best = Some(set),
                Some(current) if Self::beats(&set, current) => best = Some(set),
                Some(_) => {}
            }
        }

        match best {
            Some(set) => SelectionResult::Selected(set),
            None => SelectionResult::Empty,
        }
    }

    fn beats(challenger: &CandidateEntrySet, incumbent: &CandidateEntrySet) -> bool {
        let by_level = challenger
            .level
            .precedence()
            .cmp(&incumbent.level.precedence());
        let by_size = challenger.len().cmp(&incumbent.len());
        // Lower rank (earlier search result) wins the remaining ties.
        let by_rank = incumbent.rank.cmp(&challenger.rank);
        by_level.then(by_size).then(by_rank).is_gt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifiedEntry, Level};
    use crate::extract::RawTocLine;

    fn accepted_entry(title: &str, order: usize, level: Level, url: &str) -> ValidatedEntry {
        ValidatedEntry {
            entry: ClassifiedEntry {
                raw: RawTocLine {
                    raw_text: format!("第{order}章 {title}"),
                    original_order: order,
                    source_url: url.to_string(),
                },
                level,
                number_prefix: Some(format!("第{order}章")),
                title: title.to_string(),
            },
            reject_reason: None,
        }
    }

    fn primary_set(url: &str, rank: usize, size: usize) -> CandidateEntrySet {
        let validated: Vec<ValidatedEntry> = (0..size)
            .map(|i| accepted_entry(&format!("主题{i}"), i, Level::Primary, url))
            .collect();
        CandidateEntrySet::build(url, rank, Level::Primary, &validated)
    }

    fn secondary_set(url: &str, rank: usize, size: usize) -> CandidateEntrySet {
        let validated: Vec<ValidatedEntry> = (0..size)
            .map(|i| accepted_entry(&format!("小节{i}"), i, Level::Secondary, url))
            .collect();
        CandidateEntrySet::build(url, rank, Level::Secondary, &validated)
    }

    #[test]
    fn test_larger_primary_set_wins() {
        let selector = CandidateSelector::new(30);
        let result = selector.select(vec![primary_set("a", 0, 35), primary_set("b", 1, 40)]);

        let set = result.into_option().unwrap();
        assert_eq!(set.source_url, "b");
        assert_eq!(set.len(), 40);
    }

    #[test]
    fn test_all_below_threshold_returns_empty() {
        let selector = CandidateSelector::new(30);
        let result = selector.select(vec![primary_set("a", 0, 10), secondary_set("b", 1, 29)]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_primary_beats_larger_secondary() {
        let selector = CandidateSelector::new(30);
        let result = selector.select(vec![secondary_set("a", 0, 60), primary_set("b", 1, 31)]);

        let set = result.into_option().unwrap();
        assert_eq!(set.level, Level::Primary);
        assert_eq!(set.source_url, "b");
    }

    #[test]
    fn test_tie_breaks_on_search_rank() {
        let selector = CandidateSelector::new(30);
        let result = selector.select(vec![primary_set("later", 3, 35), primary_set("earlier", 1, 35)]);

        let set = result.into_option().unwrap();
        assert_eq!(set.source_url, "earlier");
    }

    #[test]
    fn test_threshold_monotonicity() {
        let set = primary_set("a", 0, 33);
        assert!(set.is_eligible(33));
        for lower in 0..=33 {
            assert!(set.is_eligible(lower));
        }
        assert!(!set.is_eligible(34));
    }

    #[test]
    fn test_eligible_set_is_never_dropped() {
        let selector = CandidateSelector::new(30);
        let result = selector.select(vec![primary_set("only", 0, 30)]);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_entries_sorted_by_original_order() {
        let validated = vec![
            accepted_entry("后面的章节", 9, Level::Primary, "u"),
            accepted_entry("前面的章节", 1, Level::Primary, "u"),
        ];
        let set = CandidateEntrySet::build("u", 0, Level::Primary, &validated);

        let orders: Vec<usize> = set
            .entries
            .iter()
            .map(|v| v.entry.raw.original_order)
            .collect();
        assert_eq!(orders, vec![1, 9]);
        assert!(orders.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_set_excludes_other_levels_and_rejects() {
        let mut validated = vec![
            accepted_entry("章节甲", 0, Level::Primary, "u"),
            accepted_entry("小节乙", 1, Level::Secondary, "u"),
        ];
        validated.push(ValidatedEntry {
            reject_reason: Some(crate::validate::RejectReason::TooShort),
            ..accepted_entry("丙", 2, Level::Primary, "u")
        });

        let set = CandidateEntrySet::build("u", 0, Level::Primary, &validated);
        assert_eq!(set.len(), 1);
        assert_eq!(set.entries[0].entry.title, "章节甲");
    }

    #[test]
    fn test_order_preserved_flag() {
        let increasing = primary_set("u", 0, 5);
        assert!(increasing.order_preserved);

        let mut validated = vec![
            accepted_entry("第九个", 0, Level::Primary, "u"),
            accepted_entry("第二个", 1, Level::Primary, "u"),
        ];
        validated[0].entry.number_prefix = Some("第九章".to_string());
        validated[1].entry.number_prefix = Some("第二章".to_string());
        let set = CandidateEntrySet::build("u", 0, Level::Primary, &validated);
        assert!(!set.order_preserved);
    }

    #[test]
    fn test_cleaned_titles_strip_digits_keep_order() {
        let validated = vec![
            accepted_entry("绪论12", 0, Level::Primary, "u"),
            accepted_entry("模型评估", 1, Level::Primary, "u"),
        ];
        let set = CandidateEntrySet::build("u", 0, Level::Primary, &validated);
        assert_eq!(set.cleaned_titles(), vec!["绪论", "模型评估"]);
    }
}
