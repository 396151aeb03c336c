//! TOC Forge - turns noisy web text into a validated book table of contents.
//!
//! Given a subject, the pipeline locates a canonical book, retrieves its
//! TOC from arbitrary web pages, and emerges with a clean, hierarchically
//! classified, deduplicated sequence of chapter entries. Each entry is then
//! expanded into a short description via an LLM and persisted.
//!
//! # Overview
//!
//! Matching is pattern- and statistic-based, not semantic:
//! 1. Search results for the subject are mined for quoted book titles with
//!    adjacent author names.
//! 2. A second search for the chosen book's TOC page yields candidate
//!    URLs; each page's text is run through heading extraction, hierarchy
//!    classification and acceptance heuristics.
//! 3. The best candidate set wins by level, size and search rank; too few
//!    entries everywhere falls back to a manually supplied URL.
//! 4. LLM expansion output is structurally repaired and schema-checked
//!    before it is written to disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use toc_forge::{config::Config, persistence, pipeline::TocPipeline};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let pipeline = TocPipeline::new(config);
//!
//!     // Find candidate books for a subject
//!     let candidates = pipeline.discover_titles("机器学习").await?;
//!     let book = &candidates[0];
//!
//!     // Collect and select the best TOC across candidate pages
//!     let selection = pipeline.collect_toc(&book.title).await?;
//!     let toc = pipeline.require_selection(selection)?;
//!
//!     // Expand into per-section material and persist
//!     let material = pipeline.expand_material(&toc.cleaned_titles()).await?;
//!     persistence::save_material(&material, Path::new("output/机器学习.json"))?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **PatternLibrary**: declarative heading/title/exclusion pattern tables
//! - **TitleExtractor**: candidate book titles with adjacent authors
//! - **TocEntryExtractor**: raw chapter/section lines in document order
//! - **HierarchyClassifier**: per-entry level from prefix shape
//! - **EntryValidator**: length, script-ratio and duplicate heuristics
//! - **CandidateSelector**: best set across pages, or the fallback signal
//! - **repair**: structural JSON repair + output schema validation
//! - **TocPipeline**: orchestration over the search/fetch/LLM collaborators

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod llm;
pub mod patterns;
pub mod persistence;
pub mod pipeline;
pub mod repair;
pub mod search;
pub mod select;
pub mod title;
pub mod validate;

// Re-export commonly used types
pub use classify::{ClassifiedEntry, HierarchyClassifier, Level};
pub use config::Config;
pub use error::{Result, TocForgeError};
pub use extract::{RawTocLine, TocEntryExtractor};
pub use fetch::{PageFetcher, RawPageText};
pub use llm::LlmClient;
pub use patterns::PatternLibrary;
pub use pipeline::TocPipeline;
pub use repair::{SectionMaterial, TocMaterial, repair, validate_material};
pub use search::{SearchClient, SearchResult};
pub use select::{CandidateEntrySet, CandidateSelector, SelectionResult};
pub use title::{TitleCandidate, TitleExtractor};
pub use validate::{EntryValidator, RejectReason, ValidatedEntry};
