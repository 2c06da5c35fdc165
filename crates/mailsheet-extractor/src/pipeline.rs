//! Strategy selection and the extraction pipeline

use crate::config::{ExtractionStrategy, ExtractorConfig};
use crate::error::ExtractorError;
use crate::llm::LlmExtractor;
use crate::normalize::normalize;
use crate::pattern::PatternExtractor;
use crate::types::ExtractionOutcome;
use async_trait::async_trait;
use mailsheet_domain::ProjectRecord;
use mailsheet_llm::LlmProvider;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Something that turns message text into candidate records
#[async_trait]
pub trait RecordExtractor: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Produce candidate records; never fails, degrades to none
    async fn extract(&self, text: &str) -> Vec<ProjectRecord>;
}

#[async_trait]
impl RecordExtractor for PatternExtractor {
    fn name(&self) -> &'static str {
        "pattern"
    }

    async fn extract(&self, text: &str) -> Vec<ProjectRecord> {
        self.extract_all(text)
    }
}

#[async_trait]
impl RecordExtractor for LlmExtractor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn extract(&self, text: &str) -> Vec<ProjectRecord> {
        LlmExtractor::extract(self, text).await
    }
}

/// Runs the configured extractors in order until one yields records
pub struct ExtractionPipeline {
    strategy: ExtractionStrategy,
    max_text_length: usize,
    chain: Vec<Box<dyn RecordExtractor>>,
}

impl ExtractionPipeline {
    /// Build the pipeline for a configuration
    ///
    /// `llm` strategy requires a provider. With `pattern_then_llm` and no
    /// provider the pipeline runs the pattern extractor alone.
    pub fn new(
        config: &ExtractorConfig,
        provider: Option<Arc<dyn LlmProvider>>,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        let pattern = || -> Box<dyn RecordExtractor> {
            Box::new(PatternExtractor::new(config.min_block_chars))
        };
        let llm = |provider: Arc<dyn LlmProvider>| -> Box<dyn RecordExtractor> {
            Box::new(
                LlmExtractor::new(provider, config.model.clone(), config.temperature)
                    .with_timeout(config.extraction_timeout()),
            )
        };

        let chain = match (config.strategy, provider) {
            (ExtractionStrategy::Pattern, _) => vec![pattern()],
            (ExtractionStrategy::Llm, Some(p)) => vec![llm(p)],
            (ExtractionStrategy::Llm, None) => {
                return Err(ExtractorError::Config(
                    "strategy 'llm' needs a language-model provider".to_string(),
                ))
            }
            (ExtractionStrategy::PatternThenLlm, Some(p)) => vec![pattern(), llm(p)],
            (ExtractionStrategy::PatternThenLlm, None) => vec![pattern()],
        };

        Ok(Self {
            strategy: config.strategy,
            max_text_length: config.max_text_length,
            chain,
        })
    }

    /// Pipeline with an explicit extractor chain
    pub fn with_chain(
        strategy: ExtractionStrategy,
        max_text_length: usize,
        chain: Vec<Box<dyn RecordExtractor>>,
    ) -> Self {
        Self {
            strategy,
            max_text_length,
            chain,
        }
    }

    /// Configured strategy
    pub fn strategy(&self) -> ExtractionStrategy {
        self.strategy
    }

    /// Names of the extractors in run order
    pub fn extractor_names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|e| e.name()).collect()
    }

    /// Reject text longer than the configured limit (in characters)
    pub fn check_length(&self, text: &str) -> Result<(), ExtractorError> {
        let length = text.chars().count();
        if length > self.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.max_text_length));
        }
        Ok(())
    }

    /// Extract normalized records from a message
    ///
    /// Never fails. Over-long text and extractor failures yield no records.
    pub async fn run(&self, text: &str) -> ExtractionOutcome {
        if let Err(e) = self.check_length(text) {
            warn!("{}; skipping extraction", e);
            return self.empty_outcome(0);
        }

        let mut candidates = 0;
        for extractor in &self.chain {
            let raw = extractor.extract(text).await;
            candidates += raw.len();

            let records = normalize(raw);
            debug!(
                "Extractor '{}' produced {} meaningful records",
                extractor.name(),
                records.len()
            );

            if !records.is_empty() {
                info!(
                    "Extracted {} records with '{}' extractor",
                    records.len(),
                    extractor.name()
                );
                return ExtractionOutcome {
                    records,
                    strategy: self.strategy,
                    source: Some(extractor.name()),
                    candidates,
                };
            }
        }

        info!("No meaningful records found");
        self.empty_outcome(candidates)
    }

    fn empty_outcome(&self, candidates: usize) -> ExtractionOutcome {
        ExtractionOutcome {
            records: Vec::new(),
            strategy: self.strategy,
            source: None,
            candidates,
        }
    }
}
