//! LLM integration module.
//!
//! Provides an OpenAI-compatible client for LLM API calls and the prompts
//! used to expand a table of contents into per-section material.

mod client;
mod prompts;

pub use client::{LlmClient, LlmResponse, Message, Role, TokenUsage};
pub use prompts::Prompts;

use crate::error::Result;

/// Drives the TOC-expansion call.
///
/// The contract is best-effort structured text: the returned string must be
/// passed through [`crate::repair::repair`] before use.
pub struct TocExpander {
    client: LlmClient,
}

impl TocExpander {
    /// Create a new expander.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Expand ordered chapter titles into raw material text.
    ///
    /// Titles are joined one per line; their order defines the section
    /// numbering the model is asked to emit.
    pub async fn expand(&self, titles: &[String]) -> Result<String> {
        let toc_text = titles.join("\n");
        let prompt = Prompts::expand_sections().replace("{toc}", &toc_text);

        self.client
            .complete_json(Some(Prompts::system_academic_writer()), &prompt)
            .await
    }
}
