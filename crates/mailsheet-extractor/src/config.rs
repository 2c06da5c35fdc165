//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which extractor(s) the pipeline runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Deterministic label patterns only
    Pattern,
    /// Language model only
    Llm,
    /// Label patterns first, language model when they find nothing
    #[default]
    PatternThenLlm,
}

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Extraction strategy
    pub strategy: ExtractionStrategy,

    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Blocks shorter than this (characters) are dropped as noise
    pub min_block_chars: usize,

    /// Model identifier sent to the chat-completion service
    pub model: String,

    /// Sampling temperature for the language model
    pub temperature: f32,

    /// Maximum time for a single language-model extraction (seconds)
    pub extraction_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::default(),
            max_text_length: 50_000,
            min_block_chars: 10,
            model: "gpt-4".to_string(),
            temperature: 0.2,
            extraction_timeout_secs: 120,
        }
    }
}
