//! End-to-end orchestration of the extraction pipeline.
//!
//! Extraction, classification, validation and selection are pure,
//! synchronous transforms; the only suspension points are the external
//! collaborators (search, fetch, LLM). Each candidate URL's
//! fetch-and-extract is independent and stateless, so the bounded
//! candidate set runs concurrently; selection is the single join point.
//! A failed fetch removes that URL's sets from consideration and never
//! aborts the round.

use crate::classify::{HierarchyClassifier, Level};
use crate::config::{Config, ExtractionConfig};
use crate::error::{Result, TocForgeError};
use crate::extract::TocEntryExtractor;
use crate::fetch::{PageFetcher, RawPageText};
use crate::llm::{LlmClient, TocExpander};
use crate::patterns::PatternLibrary;
use crate::repair::{TocMaterial, repair, validate_material};
use crate::search::SearchClient;
use crate::select::{CandidateEntrySet, CandidateSelector, SelectionResult};
use crate::title::{TitleCandidate, TitleExtractor, normalize_title};
use crate::validate::EntryValidator;
use std::collections::HashSet;
use std::sync::Arc;

/// The full subject-to-material pipeline.
pub struct TocPipeline {
    config: Config,
    patterns: Arc<PatternLibrary>,
    search: SearchClient,
    fetcher: PageFetcher,
    expander: TocExpander,
}

impl TocPipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: Config) -> Self {
        let patterns = Arc::new(PatternLibrary::new());
        let search = SearchClient::new(config.search.clone());
        let fetcher = PageFetcher::new(config.fetch.clone());
        let expander = TocExpander::new(LlmClient::new(config.llm.clone()));

        Self {
            config,
            patterns,
            search,
            fetcher,
            expander,
        }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Search the subject and mine candidate book titles from the results.
    ///
    /// Candidates are merged across pages, deduplicated by normalized title
    /// and capped, preserving search-rank order. Finding nothing is
    /// surfaced as `NoCandidateTitles` so the caller can refine the query.
    pub async fn discover_titles(&self, subject: &str) -> Result<Vec<TitleCandidate>> {
        let results = self.search.search(subject).await?;
        let urls: Vec<String> = results
            .into_iter()
            .map(|r| r.url)
            .take(self.config.fetch.max_candidate_pages)
            .collect();
        let pages = self.fetch_all(urls).await;

        let extractor = TitleExtractor::new(
            Arc::clone(&self.patterns),
            self.config.extraction.clone(),
        );

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for page in &pages {
            for candidate in extractor.extract(&page.text, &page.url) {
                if !seen.insert(normalize_title(&candidate.title)) {
                    continue;
                }
                merged.push(candidate);
                if merged.len() >= self.config.extraction.max_title_candidates {
                    return Ok(merged);
                }
            }
        }

        if merged.is_empty() {
            return Err(TocForgeError::NoCandidateTitles(subject.to_string()));
        }
        Ok(merged)
    }

    /// Search for the book's TOC page and select the best candidate set.
    pub async fn collect_toc(&self, book_title: &str) -> Result<SelectionResult> {
        let query = format!("{} {}", book_title, self.config.search.directory_term);
        let results = self.search.search(&query).await?;
        let urls: Vec<String> = results
            .into_iter()
            .map(|r| r.url)
            .take(self.config.fetch.max_candidate_pages)
            .collect();

        let sets = self.candidate_sets(urls).await;
        let selector = CandidateSelector::new(self.config.extraction.min_eligible_set_size);
        Ok(selector.select(sets))
    }

    /// Manual fallback: re-enter the pipeline at TOC extraction for one URL.
    pub async fn extract_from_url(&self, url: &str) -> Result<SelectionResult> {
        let page = self.fetcher.fetch(url).await?;
        let sets = candidate_sets_for_page(&self.patterns, &self.config.extraction, &page, 0);
        let selector = CandidateSelector::new(self.config.extraction.min_eligible_set_size);
        Ok(selector.select(sets))
    }

    /// Turn a selection into the hard error the caller reports.
    pub fn require_selection(&self, result: SelectionResult) -> Result<CandidateEntrySet> {
        result.into_option().ok_or(TocForgeError::NoEligibleTocSet {
            minimum: self.config.extraction.min_eligible_set_size,
        })
    }

    /// Expand ordered chapter titles into validated section material.
    ///
    /// The LLM output is structurally repaired, then checked against the
    /// output schema; both failures are fatal for the run.
    pub async fn expand_material(&self, titles: &[String]) -> Result<TocMaterial> {
        let raw = self.expander.expand(titles).await?;
        let repaired = repair(&raw)?;
        validate_material(&repaired)
    }

    /// Fetch every URL concurrently, dropping failures.
    ///
    /// Result order follows the input (search-rank) order.
    async fn fetch_all(&self, urls: Vec<String>) -> Vec<RawPageText> {
        let mut handles = Vec::new();
        for url in urls {
            let fetcher = self.fetcher.clone();
            handles.push(tokio::spawn(async move { fetcher.fetch(&url).await }));
        }

        let mut pages = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(page)) => pages.push(page),
                Ok(Err(e)) => eprintln!("Skipping candidate page: {e}"),
                Err(e) => eprintln!("Fetch task failed: {e}"),
            }
        }
        pages
    }

    /// Fetch and extract every URL concurrently, dropping failed URLs.
    async fn candidate_sets(&self, urls: Vec<String>) -> Vec<CandidateEntrySet> {
        let mut handles = Vec::new();
        for (rank, url) in urls.into_iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let patterns = Arc::clone(&self.patterns);
            let extraction = self.config.extraction.clone();
            handles.push(tokio::spawn(async move {
                let page = fetcher.fetch(&url).await?;
                Ok::<_, TocForgeError>(candidate_sets_for_page(
                    &patterns, &extraction, &page, rank,
                ))
            }));
        }

        let mut sets = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(page_sets)) => sets.extend(page_sets),
                Ok(Err(e)) => eprintln!("Skipping candidate page: {e}"),
                Err(e) => eprintln!("Extraction task failed: {e}"),
            }
        }
        sets
    }
}

/// Run one page through extract → classify → validate and group the
/// accepted entries into per-level candidate sets.
pub fn candidate_sets_for_page(
    patterns: &Arc<PatternLibrary>,
    config: &ExtractionConfig,
    page: &RawPageText,
    rank: usize,
) -> Vec<CandidateEntrySet> {
    let extractor = TocEntryExtractor::new(Arc::clone(patterns));
    let classifier = HierarchyClassifier::new(Arc::clone(patterns));
    let validator = EntryValidator::new(config.clone());

    let lines = extractor.extract(&page.text, &page.url);
    let classified: Vec<_> = lines
        .into_iter()
        .map(|line| classifier.classify(line))
        .collect();
    let validated = validator.validate_all(classified);

    [Level::Primary, Level::Secondary]
        .into_iter()
        .map(|level| CandidateEntrySet::build(&page.url, rank, level, &validated))
        .filter(|set| !set.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str, url: &str) -> RawPageText {
        RawPageText {
            url: url.to_string(),
            text: text.to_string(),
            page_title: None,
        }
    }

    fn toc_page_text(chapters: usize) -> String {
        let mut text = String::from("某书目录\n");
        for i in 1..=chapters {
            text.push_str(&format!("第{i}章 专题内容讲解{i}\n"));
            text.push_str(&format!("{i}.1 小节内容概览{i}\n"));
        }
        text
    }

    #[test]
    fn test_page_yields_per_level_sets() {
        let patterns = Arc::new(PatternLibrary::new());
        let config = ExtractionConfig::default();
        let page = page(&toc_page_text(31), "https://example.com/toc");

        let sets = candidate_sets_for_page(&patterns, &config, &page, 2);

        assert_eq!(sets.len(), 2);
        let primary = sets.iter().find(|s| s.level == Level::Primary).unwrap();
        let secondary = sets.iter().find(|s| s.level == Level::Secondary).unwrap();
        assert_eq!(primary.len(), 31);
        assert_eq!(secondary.len(), 31);
        assert_eq!(primary.rank, 2);
        assert_eq!(primary.source_url, "https://example.com/toc");
    }

    #[test]
    fn test_selection_over_pages_prefers_larger_primary() {
        let patterns = Arc::new(PatternLibrary::new());
        let config = ExtractionConfig::default();

        let mut sets = candidate_sets_for_page(
            &patterns,
            &config,
            &page(&toc_page_text(35), "https://example.com/a"),
            0,
        );
        sets.extend(candidate_sets_for_page(
            &patterns,
            &config,
            &page(&toc_page_text(40), "https://example.com/b"),
            1,
        ));

        let selector = CandidateSelector::new(config.min_eligible_set_size);
        let winner = selector.select(sets).into_option().unwrap();
        assert_eq!(winner.source_url, "https://example.com/b");
        assert_eq!(winner.level, Level::Primary);
        assert_eq!(winner.len(), 40);
    }

    #[test]
    fn test_small_pages_select_empty() {
        let patterns = Arc::new(PatternLibrary::new());
        let config = ExtractionConfig::default();
        let sets = candidate_sets_for_page(&patterns, &config, &page(&toc_page_text(5), "u"), 0);

        let selector = CandidateSelector::new(config.min_eligible_set_size);
        assert!(selector.select(sets).is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let patterns = Arc::new(PatternLibrary::new());
        let config = ExtractionConfig::default();
        let page = page(&toc_page_text(12), "u");

        let first = candidate_sets_for_page(&patterns, &config, &page, 0);
        let second = candidate_sets_for_page(&patterns, &config, &page, 0);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.level, b.level);
            assert_eq!(a.entries, b.entries);
            assert_eq!(a.order_preserved, b.order_preserved);
        }
    }

    #[test]
    fn test_accepted_entries_keep_strictly_increasing_order() {
        let patterns = Arc::new(PatternLibrary::new());
        let config = ExtractionConfig::default();
        let sets = candidate_sets_for_page(&patterns, &config, &page(&toc_page_text(20), "u"), 0);

        for set in sets {
            let orders: Vec<usize> = set
                .entries
                .iter()
                .map(|v| v.entry.raw.original_order)
                .collect();
            assert!(orders.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_empty_page_yields_no_sets() {
        let patterns = Arc::new(PatternLibrary::new());
        let config = ExtractionConfig::default();
        let sets =
            candidate_sets_for_page(&patterns, &config, &page("没有目录的普通页面\n", "u"), 0);
        assert!(sets.is_empty());
    }
}
