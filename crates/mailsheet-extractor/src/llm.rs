//! Language-model extraction

use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use mailsheet_domain::ProjectRecord;
use mailsheet_llm::LlmProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Extracts records by asking a chat-completion model
pub struct LlmExtractor {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl LlmExtractor {
    /// Create a new extractor over a provider
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            timeout: Duration::from_secs(120),
        }
    }

    /// Set the overall time limit for one extraction
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extract records, surfacing every failure
    pub async fn try_extract(&self, text: &str) -> Result<Vec<ProjectRecord>, ExtractorError> {
        let request = PromptBuilder::new(text).build(&self.model, self.temperature);

        debug!(
            "Sending {} chars to provider '{}' (model {})",
            text.chars().count(),
            self.provider.name(),
            self.model
        );

        let reply = timeout(self.timeout, self.provider.chat(&request))
            .await
            .map_err(|_| ExtractorError::Timeout)??;

        debug!("LLM response length: {} chars", reply.len());

        let records = parse_llm_response(&reply)?;
        info!("Parsed {} project candidates from LLM reply", records.len());
        Ok(records)
    }

    /// Extract records; any failure is logged and yields no records
    pub async fn extract(&self, text: &str) -> Vec<ProjectRecord> {
        match self.try_extract(text).await {
            Ok(records) => records,
            Err(e) => {
                warn!("LLM extraction failed, continuing with no records: {}", e);
                Vec::new()
            }
        }
    }
}
