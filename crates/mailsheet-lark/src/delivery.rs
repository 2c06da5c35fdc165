//! Delivery of rendered workbooks into a conversation

use crate::client::LarkClient;
use crate::error::LarkError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Posts files and notices back into a chat
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Upload the workbook bytes under `file_name` and send them into the chat
    async fn deliver_file(
        &self,
        chat_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), LarkError>;

    /// Send a plain-text notice into the chat
    async fn notify(&self, chat_id: &str, text: &str) -> Result<(), LarkError>;
}

#[async_trait]
impl Delivery for LarkClient {
    async fn deliver_file(
        &self,
        chat_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), LarkError> {
        let file_key = self.upload_file(file_name, bytes).await?;
        let message_id = self.send_file(chat_id, &file_key).await?;
        info!("Delivered {} to chat {} as {}", file_name, chat_id, message_id);
        Ok(())
    }

    async fn notify(&self, chat_id: &str, text: &str) -> Result<(), LarkError> {
        self.send_text(chat_id, text).await.map(|_| ())
    }
}

/// What a [`RecordingDelivery`] was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    /// A file sent to a chat
    File {
        /// Target chat
        chat_id: String,
        /// Upload name
        file_name: String,
        /// Workbook content
        bytes: Vec<u8>,
    },
    /// A text notice sent to a chat
    Notice {
        /// Target chat
        chat_id: String,
        /// Notice text
        text: String,
    },
}

/// In-memory delivery for testing
///
/// Records every call. File deliveries can be made to fail so that the
/// failure-notice path can be exercised.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelivery {
    log: Arc<Mutex<Vec<Delivered>>>,
    fail_files: bool,
}

impl RecordingDelivery {
    /// Create a delivery that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a delivery whose file uploads fail
    pub fn failing_files() -> Self {
        Self {
            fail_files: true,
            ..Self::default()
        }
    }

    /// Everything delivered so far
    pub fn delivered(&self) -> Vec<Delivered> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn record(&self, entry: Delivered) {
        if let Ok(mut log) = self.log.lock() {
            log.push(entry);
        }
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn deliver_file(
        &self,
        chat_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), LarkError> {
        if self.fail_files {
            return Err(LarkError::ApiError {
                code: 234001,
                msg: "upload rejected".to_string(),
            });
        }
        self.record(Delivered::File {
            chat_id: chat_id.to_string(),
            file_name: file_name.to_string(),
            bytes,
        });
        Ok(())
    }

    async fn notify(&self, chat_id: &str, text: &str) -> Result<(), LarkError> {
        self.record(Delivered::Notice {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LarkConfig;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_recording_delivery() {
        let delivery = RecordingDelivery::new();
        delivery
            .deliver_file("oc_1", "output.xlsx", b"PK".to_vec())
            .await
            .unwrap();
        delivery.notify("oc_1", "done").await.unwrap();

        assert_eq!(
            delivery.delivered(),
            vec![
                Delivered::File {
                    chat_id: "oc_1".to_string(),
                    file_name: "output.xlsx".to_string(),
                    bytes: b"PK".to_vec(),
                },
                Delivered::Notice {
                    chat_id: "oc_1".to_string(),
                    text: "done".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_delivery() {
        let delivery = RecordingDelivery::failing_files();
        assert!(delivery
            .deliver_file("oc_1", "x.xlsx", Vec::new())
            .await
            .is_err());
        assert!(delivery.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_lark_client_delivers_file() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/open-apis/auth/v3/tenant_access_token/internal")
            .with_status(200)
            .with_body(r#"{"code":0,"tenant_access_token":"t-1","expire":7200}"#)
            .create_async()
            .await;
        let upload = server
            .mock("POST", "/open-apis/im/v1/files")
            .with_status(200)
            .with_body(r#"{"code":0,"data":{"file_key":"fk"}}"#)
            .create_async()
            .await;
        let send = server
            .mock("POST", "/open-apis/im/v1/messages")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(serde_json::json!({"receive_id": "oc_9"})))
            .with_status(200)
            .with_body(r#"{"code":0,"data":{"message_id":"om"}}"#)
            .create_async()
            .await;

        let client = LarkClient::new(LarkConfig {
            base_url: server.url(),
            app_id: "a".to_string(),
            app_secret: "s".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap();
        let delivery: &dyn Delivery = &client;
        delivery
            .deliver_file("oc_9", "output.xlsx", b"PK".to_vec())
            .await
            .unwrap();

        upload.assert_async().await;
        send.assert_async().await;
    }
}
