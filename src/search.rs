//! Web-search collaborator.
//!
//! Issues a query against a SerpAPI-style JSON endpoint and returns the
//! ranked organic results. Language and region hints ride along with every
//! query; provider failures surface as `SearchUnavailable` and never carry
//! partial results.

use crate::config::SearchConfig;
use crate::error::{Result, TocForgeError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// One ranked search result.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "link")]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<SearchResult>,
}

/// Search provider client.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    config: SearchConfig,
}

impl SearchClient {
    /// Create a new search client with the given configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Run a search and return up to `result_count` ranked results.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let count = self.config.result_count.to_string();
        let params = [
            ("q", query),
            ("hl", self.config.language.as_str()),
            ("gl", self.config.region.as_str()),
            ("num", count.as_str()),
            ("api_key", self.config.api_key.as_str()),
        ];

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&params)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| TocForgeError::SearchUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TocForgeError::SearchUnavailable(format!(
                "provider returned HTTP {status}"
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| TocForgeError::SearchUnavailable(e.to_string()))?;

        let mut results = parsed.organic_results;
        results.truncate(self.config.result_count);
        Ok(results)
    }
}
