//! Inbound webhook payloads

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Message content could not be turned into text
#[derive(Debug, Error)]
pub enum ContentError {
    /// `content` is not valid JSON
    #[error("message content is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `content` decoded to something other than an object
    #[error("message content must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// `text` is present but not a string
    #[error("message text must be a string")]
    TextNotString,
}

/// Body posted by the platform: a URL-verification handshake or an event
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    /// Handshake token, echoed back verbatim
    #[serde(default)]
    pub challenge: Option<Value>,
    /// Delivery id (older event schema)
    #[serde(default)]
    pub uuid: Option<String>,
    /// Event header (newer event schema)
    #[serde(default)]
    pub header: Option<EventHeader>,
    /// Event body
    #[serde(default)]
    pub event: Option<EventBody>,
}

/// Event header
#[derive(Debug, Default, Deserialize)]
pub struct EventHeader {
    /// Event id
    #[serde(default)]
    pub event_id: Option<String>,
}

/// Event body
#[derive(Debug, Default, Deserialize)]
pub struct EventBody {
    /// The received message
    #[serde(default)]
    pub message: Option<Message>,
}

/// A chat message
#[derive(Debug, Default, Deserialize)]
pub struct Message {
    /// "text", "file", "image", ...
    #[serde(default)]
    pub message_type: Option<String>,
    /// JSON-encoded content object
    #[serde(default)]
    pub content: Option<String>,
    /// Conversation the message was posted in
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Fallback conversation id
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl WebhookPayload {
    /// Parse a request body
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Delivery id: top-level `uuid`, then `header.event_id`
    pub fn event_id(&self) -> Option<&str> {
        non_empty(self.uuid.as_deref())
            .or_else(|| non_empty(self.header.as_ref()?.event_id.as_deref()))
    }

    /// The message, if the event carries one
    pub fn message(&self) -> Option<&Message> {
        self.event.as_ref()?.message.as_ref()
    }

    /// Message type, if present
    pub fn message_type(&self) -> Option<&str> {
        self.message()?.message_type.as_deref()
    }

    /// True for plain-text messages
    pub fn is_text(&self) -> bool {
        self.message_type() == Some("text")
    }

    /// Conversation id: `chat_id`, then `conversation_id`
    pub fn chat_id(&self) -> Option<&str> {
        let message = self.message()?;
        non_empty(message.chat_id.as_deref())
            .or_else(|| non_empty(message.conversation_id.as_deref()))
    }

    /// Decode the message text from its JSON-encoded content
    pub fn text(&self) -> Result<String, ContentError> {
        decode_text(self.message().and_then(|m| m.content.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Decode `content` into text
///
/// Absent content means `{}`; an absent `text` key means an empty text.
pub fn decode_text(content: Option<&str>) -> Result<String, ContentError> {
    let value: Value = serde_json::from_str(content.unwrap_or("{}"))?;

    let Value::Object(object) = value else {
        return Err(ContentError::NotAnObject(json_type(&value)));
    };

    match object.get("text") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(ContentError::TextNotString),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
