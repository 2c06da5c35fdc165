//! Mailsheet Server
//!
//! Receives chat-platform message events, extracts project listings from the
//! message text, renders them into an xlsx workbook and posts the workbook
//! back into the conversation.
//!
//! # Architecture
//!
//! ```text
//! POST /webhook → EventGate → ExtractionPipeline → SheetRenderer → Delivery
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod gate;
pub mod handlers;
pub mod orchestrator;
pub mod webhook;

use config::ServerConfig;
use gate::build_gate;
use handlers::{create_router, AppState};
use mailsheet_extractor::{ExtractionPipeline, ExtractorError};
use mailsheet_lark::{LarkClient, LarkError};
use mailsheet_llm::{LlmError, LlmProvider, OpenAiProvider};
use mailsheet_sheet::SheetRenderer;
use orchestrator::Orchestrator;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Pipeline could not be built
    #[error("Extractor setup failed: {0}")]
    Extractor(#[from] ExtractorError),

    /// Language-model client could not be built
    #[error("LLM setup failed: {0}")]
    Llm(#[from] LlmError),

    /// Lark client error
    #[error("Lark error: {0}")]
    Lark(#[from] LarkError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the chat-completion provider, if an API key is configured
pub fn build_llm_provider(
    config: &ServerConfig,
) -> Result<Option<Arc<dyn LlmProvider>>, ServerError> {
    if !config.llm.enabled() {
        warn!("No OpenAI API key configured; language-model extraction disabled");
        return Ok(None);
    }

    let provider = OpenAiProvider::with_timeout(
        config.llm.base_url.clone(),
        config.llm.api_key.clone(),
        Duration::from_secs(config.llm.request_timeout_secs),
    )?
    .with_max_retries(config.llm.max_retries)
    .with_backoff(Duration::from_millis(config.llm.backoff_ms));

    Ok(Some(Arc::new(provider)))
}

/// Wire the application state from configuration
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let provider = build_llm_provider(config)?;
    let pipeline = ExtractionPipeline::new(&config.extractor, provider)?;
    info!(
        "Extraction strategy {:?} runs {:?}",
        pipeline.strategy(),
        pipeline.extractor_names()
    );

    let orchestrator = Orchestrator::new(
        build_gate(&config.gate),
        Arc::new(pipeline),
        SheetRenderer::new(config.sheet.clone()),
        Arc::new(LarkClient::new(config.lark.clone())?),
    );

    Ok(AppState {
        orchestrator: Arc::new(orchestrator),
    })
}

/// Start the webhook HTTP server
///
/// Validates configuration, wires the collaborators and serves until the
/// process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting Mailsheet webhook server");
    info!("Webhook path: {}", config.webhook_path);
    info!("Gate: {:?}", config.gate.kind);
    info!("Output file: {}", config.sheet.output_path.display());

    let state = build_state(&config)?;
    let app = create_router(state, &config.webhook_path);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsheet_extractor::ExtractionStrategy;

    fn config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.lark.app_id = "cli_test".to_string();
        config.lark.app_secret = "secret".to_string();
        config
    }

    #[test]
    fn test_no_api_key_disables_llm() {
        assert!(build_llm_provider(&config()).unwrap().is_none());
    }

    #[test]
    fn test_api_key_enables_llm() {
        let mut config = config();
        config.llm.api_key = "sk-test".to_string();
        let provider = build_llm_provider(&config).unwrap().unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_build_state() {
        assert!(build_state(&config()).is_ok());
    }

    #[test]
    fn test_llm_strategy_without_key_fails() {
        let mut config = config();
        config.extractor.strategy = ExtractionStrategy::Llm;
        assert!(matches!(build_state(&config), Err(ServerError::Extractor(_))));
    }
}
