//! Mailsheet Extractor
//!
//! Turns the free text of a project-listing email into [`ProjectRecord`]s.
//!
//! # Architecture
//!
//! ```text
//! Text → BlockSplitter → PatternExtractor ─┐
//!                                          ├→ normalize → records
//! Text → PromptBuilder → LLM → parser ─────┘
//! ```
//!
//! The [`ExtractionPipeline`] runs the extractors selected by
//! [`ExtractionStrategy`] in order and keeps the first non-empty normalized
//! result. The canonical strategy is `pattern_then_llm`.
//!
//! # Example Usage
//!
//! ```
//! use mailsheet_extractor::{ExtractionPipeline, ExtractionStrategy, ExtractorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig {
//!     strategy: ExtractionStrategy::Pattern,
//!     ..ExtractorConfig::default()
//! };
//! let pipeline = ExtractionPipeline::new(&config, None)?;
//!
//! let outcome = pipeline.run("【案件名】 Web開発\n【勤務地】東京").await;
//! assert_eq!(outcome.records[0].title, "Web開発");
//! # Ok(())
//! # }
//! ```
//!
//! [`ProjectRecord`]: mailsheet_domain::ProjectRecord

#![warn(missing_docs)]

mod config;
mod error;
mod labels;
mod llm;
mod normalize;
mod parser;
mod pattern;
mod pipeline;
mod prompt;
mod splitter;
mod types;

#[cfg(test)]
mod tests;

pub use config::{ExtractionStrategy, ExtractorConfig};
pub use error::ExtractorError;
pub use llm::LlmExtractor;
pub use normalize::normalize;
pub use parser::parse_llm_response;
pub use pattern::PatternExtractor;
pub use pipeline::{ExtractionPipeline, RecordExtractor};
pub use prompt::PromptBuilder;
pub use splitter::BlockSplitter;
pub use types::ExtractionOutcome;
