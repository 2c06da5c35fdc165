//! OpenAI-compatible Provider Implementation
//!
//! Talks to any service exposing the `/chat/completions` endpoint.
//!
//! # Features
//!
//! - Bearer-token authentication
//! - Per-request timeout
//! - Bounded retries with exponential backoff and random jitter
//!
//! # Examples
//!
//! ```no_run
//! use mailsheet_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("https://api.openai.com/v1", "sk-...").unwrap();
//! ```

use crate::{ChatRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout for a single request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts (first try included)
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff before the second attempt
pub const DEFAULT_BACKOFF_MS: u64 = 1_000;

/// Chat-completion provider for OpenAI-compatible APIs
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
    backoff: Duration,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Outcome of one HTTP attempt
enum Attempt {
    Done(Result<String, LlmError>),
    Retry(LlmError),
}

impl OpenAiProvider {
    /// Create a new provider with the default timeout
    ///
    /// # Parameters
    ///
    /// - `base_url`: API base (e.g., "https://api.openai.com/v1")
    /// - `api_key`: Bearer token
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new provider with a specific per-request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        })
    }

    /// Set the maximum number of attempts (at least one is always made)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the base backoff delay
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Exponential backoff (1x, 2x, 4x, ...) plus up to 50% random jitter
    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self.backoff.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
        let jitter_ms = (base.as_millis() as u64) / 2;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        base + Duration::from_millis(jitter)
    }

    async fn attempt(&self, request: &ChatRequest) -> Attempt {
        let response = match self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(LlmError::Communication(format!("Request failed: {}", e))),
        };

        let status = response.status();
        if status.is_success() {
            let parsed = match response.json::<ChatCompletionResponse>().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    return Attempt::Done(Err(LlmError::InvalidResponse(format!(
                        "Failed to parse response: {}",
                        e
                    ))))
                }
            };
            let content = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .map(|c| c.trim().to_string())
                .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()));
            return Attempt::Done(content);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => Attempt::Retry(LlmError::RateLimitExceeded),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Attempt::Done(Err(LlmError::Unauthorized(body)))
            }
            reqwest::StatusCode::NOT_FOUND => {
                Attempt::Done(Err(LlmError::ModelNotAvailable(request.model.clone())))
            }
            s if s.is_server_error() => {
                Attempt::Retry(LlmError::Communication(format!("HTTP {}: {}", s, body)))
            }
            s => Attempt::Done(Err(LlmError::Communication(format!("HTTP {}: {}", s, body)))),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.attempt(request).await {
                Attempt::Done(result) => return result,
                Attempt::Retry(e) => {
                    warn!("Chat completion attempt {} failed: {}", attempts + 1, e);
                    last_error = Some(e);
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = self.retry_delay(attempts);
                debug!("Retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}
