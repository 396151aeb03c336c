//! Configuration for the TOC pipeline.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{Result, TocForgeError};
use crate::patterns::TargetScript;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Search provider configuration (SerpAPI-style endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// API key for the search provider.
    pub api_key: String,

    /// Search endpoint URL.
    pub endpoint: String,

    /// Interface-language hint sent with each query (e.g., "zh-CN").
    pub language: String,

    /// Region hint sent with each query (e.g., "cn").
    pub region: String,

    /// Number of ranked results to request per query.
    pub result_count: usize,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Term appended to a book title when searching for its TOC page.
    pub directory_term: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://serpapi.com/search".to_string(),
            language: "zh-CN".to_string(),
            region: "cn".to_string(),
            result_count: 5,
            timeout_secs: 20,
            directory_term: "目录".to_string(),
        }
    }
}

/// Page-fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// User-Agent header sent with every fetch.
    pub user_agent: String,

    /// Upper bound on candidate URLs fetched per extraction round.
    pub max_candidate_pages: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0".to_string(),
            max_candidate_pages: 5,
        }
    }
}

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name (e.g., "gpt-4o", "claude-3-opus")
    pub model: String,

    /// Maximum tokens for response
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            max_tokens: 3000,
            temperature: 0.7,
            timeout_secs: 90,
        }
    }
}

/// Extraction and selection thresholds.
///
/// Every threshold the heuristics use lives here so behavior stays tunable
/// without module-level constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum entry-title length in characters.
    pub min_entry_len: usize,

    /// Maximum entry-title length in characters.
    pub max_entry_len: usize,

    /// Minimum fraction of target-script characters in an entry title.
    pub min_script_ratio: f64,

    /// Minimum accepted-entry count for a candidate set to be eligible.
    pub min_eligible_set_size: usize,

    /// Writing system the extraction targets.
    pub target_script: TargetScript,

    /// Upper bound on distinct book-title candidates surfaced to the user.
    pub max_title_candidates: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_entry_len: 3,
            max_entry_len: 80,
            min_script_ratio: 0.3,
            min_eligible_set_size: 30,
            target_script: TargetScript::Han,
            max_title_candidates: 5,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Search provider settings.
    pub search: SearchConfig,

    /// Page-fetch settings.
    pub fetch: FetchConfig,

    /// LLM settings.
    pub llm: LlmConfig,

    /// Extraction thresholds.
    pub extraction: ExtractionConfig,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SEARCH_API_KEY, LLM_API_BASE, LLM_API_KEY, ...)
    /// 2. Config file (~/.config/toc-forge/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file first
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        // Override with environment variables
        if let Some(api_key) = env_first(&["SEARCH_API_KEY", "SERPAPI_API_KEY"]) {
            config.search.api_key = api_key;
        }

        if let Ok(api_base) = env::var("LLM_API_BASE") {
            config.llm.api_base = api_base;
        }

        if let Ok(api_key) = env::var("LLM_API_KEY") {
            config.llm.api_key = api_key;
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            config.llm.model = model;
        }

        if let Ok(max_tokens) = env::var("LLM_MAX_TOKENS") {
            if let Ok(tokens) = max_tokens.parse() {
                config.llm.max_tokens = tokens;
            }
        }

        if let Ok(temperature) = env::var("LLM_TEMPERATURE") {
            if let Ok(temp) = temperature.parse() {
                config.llm.temperature = temp;
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TocForgeError::io(path, e))?;

        serde_yaml::from_str(&content)
            .map_err(|e| TocForgeError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "toc-forge")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.search.api_key.is_empty() {
            return Err(TocForgeError::Config(
                "Search API key is required. Set SEARCH_API_KEY environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.api_base.is_empty() {
            return Err(TocForgeError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.api_key.is_empty() {
            return Err(TocForgeError::Config(
                "LLM API key is required. Set LLM_API_KEY environment variable or add to config file.".to_string()
            ));
        }

        if self.extraction.min_entry_len > self.extraction.max_entry_len {
            return Err(TocForgeError::Config(format!(
                "min_entry_len ({}) exceeds max_entry_len ({})",
                self.extraction.min_entry_len, self.extraction.max_entry_len
            )));
        }

        if !(0.0..=1.0).contains(&self.extraction.min_script_ratio) {
            return Err(TocForgeError::Config(format!(
                "min_script_ratio must be within [0, 1], got {}",
                self.extraction.min_script_ratio
            )));
        }

        Ok(())
    }

    /// Create a config from explicit API credentials (useful for testing).
    pub fn with_keys(
        search_api_key: impl Into<String>,
        llm_api_base: impl Into<String>,
        llm_api_key: impl Into<String>,
    ) -> Self {
        let mut config = Config::default();
        config.search.api_key = search_api_key.into();
        config.llm.api_base = llm_api_base.into();
        config.llm.api_key = llm_api_key.into();
        config
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.search.api_key.is_empty());
        assert_eq!(config.search.result_count, 5);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 3000);
        assert_eq!(config.extraction.min_entry_len, 3);
        assert_eq!(config.extraction.max_entry_len, 80);
        assert_eq!(config.extraction.min_script_ratio, 0.3);
        assert_eq!(config.extraction.min_eligible_set_size, 30);
    }

    #[test]
    fn test_validate_fails_without_required_fields() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_length_bounds() {
        let mut config = Config::with_keys("key", "https://api.example.com", "key");
        config.extraction.min_entry_len = 100;
        config.extraction.max_entry_len = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_keys() {
        let config = Config::with_keys("search-key", "https://api.example.com", "llm-key");
        assert_eq!(config.search.api_key, "search-key");
        assert_eq!(config.llm.api_base, "https://api.example.com");
        assert_eq!(config.llm.api_key, "llm-key");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "search:\n  api_key: abc\nextraction:\n  min_eligible_set_size: 10\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.search.api_key, "abc");
        assert_eq!(config.search.result_count, 5);
        assert_eq!(config.extraction.min_eligible_set_size, 10);
        assert_eq!(config.extraction.min_entry_len, 3);
    }
}
