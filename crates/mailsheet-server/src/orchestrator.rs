//! Webhook event processing
//!
//! ```text
//! Received ─┬─ challenge ──────────────→ Challenge
//!           ├─ id already seen ────────→ Duplicate
//!           ├─ not a text message ─────→ Ignored
//!           ├─ content undecodable ────→ Err(ContentDecode)
//!           └─ Extracted → Rendered → Delivered
//! ```
//!
//! Each event renders its own workbook bytes and delivers those, so events
//! handled concurrently never send each other's listings.

use crate::webhook::{ContentError, WebhookPayload};
use mailsheet_domain::EventGate;
use mailsheet_extractor::ExtractionPipeline;
use mailsheet_lark::Delivery;
use mailsheet_sheet::{RenderedSheet, SheetRenderer};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Text posted back into the chat when the workbook cannot be delivered
pub const DELIVERY_FAILURE_NOTICE: &str =
    "案件一覧の送信に失敗しました。時間をおいて再度お試しください。";

/// Failures reported to the caller
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Message content could not be decoded
    #[error("{0}")]
    ContentDecode(#[from] ContentError),
}

/// How an event was handled
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// Handshake answered with the given token
    Challenge(Value),
    /// Event id was already processed
    Duplicate,
    /// Not a text message
    Ignored {
        /// The message type received, if any
        message_type: Option<String>,
    },
    /// Records extracted and the workbook written
    Processed(ProcessReport),
}

/// Details of a fully processed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    /// Records written to the workbook
    pub records: usize,
    /// Conversation the workbook was sent to
    pub chat_id: Option<String>,
    /// Whether the workbook reached the conversation
    pub delivered: bool,
}

/// Runs one webhook event end to end
pub struct Orchestrator {
    gate: Arc<dyn EventGate>,
    pipeline: Arc<ExtractionPipeline>,
    renderer: SheetRenderer,
    delivery: Arc<dyn Delivery>,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        gate: Arc<dyn EventGate>,
        pipeline: Arc<ExtractionPipeline>,
        renderer: SheetRenderer,
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        Self {
            gate,
            pipeline,
            renderer,
            delivery,
        }
    }

    /// Number of distinct events the gate remembers
    pub fn processed_events(&self) -> usize {
        self.gate.len()
    }

    /// Handle one payload
    pub async fn handle(
        &self,
        mut payload: WebhookPayload,
    ) -> Result<WebhookOutcome, OrchestratorError> {
        if let Some(challenge) = payload.challenge.take() {
            info!("Answering URL verification challenge");
            return Ok(WebhookOutcome::Challenge(challenge));
        }

        match payload.event_id() {
            Some(id) => {
                if !self.gate.check_and_mark(id) {
                    info!("Duplicate event {}, skipping", id);
                    return Ok(WebhookOutcome::Duplicate);
                }
                debug!("Accepted event {}", id);
            }
            None => warn!("Event has no uuid or header.event_id; duplicate check skipped"),
        }

        if !payload.is_text() {
            let message_type = payload.message_type().map(str::to_string);
            info!("Ignoring message of type {:?}", message_type);
            return Ok(WebhookOutcome::Ignored { message_type });
        }

        let text = payload.text()?;
        info!("Processing text message ({} chars)", text.chars().count());

        let outcome = self.pipeline.run(&text).await;
        info!(
            "Extraction produced {} records from {} candidates",
            outcome.records.len(),
            outcome.candidates
        );

        let chat_id = payload.chat_id().map(str::to_string);
        let rendered = match self.renderer.render(&outcome.records) {
            Ok(sheet) => Some(sheet),
            Err(e) => {
                error!("Failed to render workbook: {}", e);
                None
            }
        };

        let delivered = match (chat_id.as_deref(), rendered) {
            (Some(chat_id), Some(sheet)) => self.deliver(chat_id, sheet).await,
            (Some(chat_id), None) => {
                self.notify_failure(chat_id).await;
                false
            }
            (None, _) => {
                warn!("Event has no chat_id or conversation_id; workbook not sent");
                false
            }
        };

        Ok(WebhookOutcome::Processed(ProcessReport {
            records: outcome.records.len(),
            chat_id,
            delivered,
        }))
    }

    async fn deliver(&self, chat_id: &str, sheet: RenderedSheet) -> bool {
        let file_name = sheet.file_name();
        match self
            .delivery
            .deliver_file(chat_id, &file_name, sheet.bytes)
            .await
        {
            Ok(()) => {
                info!("Sent {} ({} rows) to {}", file_name, sheet.rows, chat_id);
                true
            }
            Err(e) => {
                error!("Failed to deliver workbook to {}: {}", chat_id, e);
                self.notify_failure(chat_id).await;
                false
            }
        }
    }

    async fn notify_failure(&self, chat_id: &str) {
        if let Err(e) = self.delivery.notify(chat_id, DELIVERY_FAILURE_NOTICE).await {
            error!("Failed to post failure notice to {}: {}", chat_id, e);
        }
    }
}
