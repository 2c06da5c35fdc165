//! Lark open-platform client

use crate::config::LarkConfig;
use crate::error::LarkError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Tokens are refreshed this long before the server-side expiry
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Common response envelope: `{"code": 0, "msg": "...", "data": {...}}`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    tenant_access_token: String,
    #[serde(default)]
    expire: u64,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    file_key: String,
}

#[derive(Debug, Deserialize)]
struct MessageData {
    #[serde(default)]
    message_id: String,
}

#[derive(Debug, Deserialize)]
struct BotInfoResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    bot: Option<BotInfo>,
}

/// Identity of the application's bot
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotInfo {
    /// Bot open id
    pub open_id: String,
    /// Display name
    #[serde(default)]
    pub app_name: String,
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    receive_id: &'a str,
    msg_type: &'a str,
    content: String,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Lark API client
pub struct LarkClient {
    config: LarkConfig,
    http: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl LarkClient {
    /// Create a new client
    pub fn new(config: LarkConfig) -> Result<Self, LarkError> {
        config.validate().map_err(LarkError::ConfigError)?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LarkError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config: LarkConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            http,
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Get a tenant access token, reusing the cached one until it nears expiry
    pub async fn tenant_access_token(&self) -> Result<String, LarkError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http
            .post(self.url("/open-apis/auth/v3/tenant_access_token/internal"))
            .json(&json!({
                "app_id": self.config.app_id,
                "app_secret": self.config.app_secret,
            }))
            .send()
            .await?;
        let body: TokenResponse = read_json(response).await?;

        if body.code != 0 {
            return Err(LarkError::AuthError(format!("code {}: {}", body.code, body.msg)));
        }
        if body.tenant_access_token.is_empty() {
            return Err(LarkError::AuthError("empty tenant_access_token".to_string()));
        }

        let lifetime = Duration::from_secs(body.expire).saturating_sub(TOKEN_REFRESH_MARGIN);
        debug!("Obtained tenant token valid for {}s", body.expire);
        *cached = Some(CachedToken {
            value: body.tenant_access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(body.tenant_access_token)
    }

    /// Upload bytes as a `stream` attachment and return its `file_key`
    pub async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, LarkError> {
        if file_name.is_empty() {
            return Err(LarkError::ConfigError("upload needs a file name".to_string()));
        }
        let file_name = file_name.to_string();
        let size = bytes.len();

        let form = reqwest::multipart::Form::new()
            .text("file_type", "stream")
            .text("file_name", file_name.clone())
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.clone()),
            );

        let token = self.tenant_access_token().await?;
        let response = self
            .http
            .post(self.url("/open-apis/im/v1/files"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let data: UploadData = unwrap_envelope(read_json(response).await?)?;

        info!("Uploaded {} ({} bytes) as {}", file_name, size, data.file_key);
        Ok(data.file_key)
    }

    async fn send_message(
        &self,
        chat_id: &str,
        msg_type: &str,
        content: serde_json::Value,
    ) -> Result<String, LarkError> {
        let body = SendMessageBody {
            receive_id: chat_id,
            msg_type,
            content: content.to_string(),
        };

        let token = self.tenant_access_token().await?;
        let response = self
            .http
            .post(self.url("/open-apis/im/v1/messages"))
            .query(&[("receive_id_type", "chat_id")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let data: MessageData = unwrap_envelope(read_json(response).await?)?;

        debug!("Sent {} message {} to {}", msg_type, data.message_id, chat_id);
        Ok(data.message_id)
    }

    /// Send a previously uploaded file into a chat
    pub async fn send_file(&self, chat_id: &str, file_key: &str) -> Result<String, LarkError> {
        self.send_message(chat_id, "file", json!({ "file_key": file_key }))
            .await
    }

    /// Send a plain-text message into a chat
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<String, LarkError> {
        self.send_message(chat_id, "text", json!({ "text": text })).await
    }

    /// Look up the application's bot identity
    pub async fn bot_info(&self) -> Result<BotInfo, LarkError> {
        let token = self.tenant_access_token().await?;
        let response = self
            .http
            .get(self.url("/open-apis/bot/v3/info"))
            .bearer_auth(token)
            .send()
            .await?;
        let body: BotInfoResponse = read_json(response).await?;

        if body.code != 0 {
            return Err(LarkError::ApiError {
                code: body.code,
                msg: body.msg,
            });
        }
        body.bot
            .ok_or_else(|| LarkError::InvalidResponse("missing 'bot' object".to_string()))
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, LarkError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(LarkError::HttpError {
            status: status.as_u16(),
            body: text.chars().take(512).collect(),
        });
    }

    Ok(serde_json::from_str(&text)?)
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, LarkError> {
    if envelope.code != 0 {
        return Err(LarkError::ApiError {
            code: envelope.code,
            msg: envelope.msg,
        });
    }
    envelope
        .data
        .ok_or_else(|| LarkError::InvalidResponse("missing 'data' object".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> LarkClient {
        LarkClient::new(LarkConfig {
            base_url: server.url(),
            app_id: "cli_test".to_string(),
            app_secret: "secret".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    async fn mock_token(server: &mut mockito::ServerGuard, hits: usize) -> mockito::Mock {
        server
            .mock("POST", "/open-apis/auth/v3/tenant_access_token/internal")
            .match_body(Matcher::PartialJson(json!({
                "app_id": "cli_test",
                "app_secret": "secret"
            })))
            .with_status(200)
            .with_body(r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":7200}"#)
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_token_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = mock_token(&mut server, 1).await;
        let client = client(&server);

        assert_eq!(client.tenant_access_token().await.unwrap(), "t-abc");
        assert_eq!(client.tenant_access_token().await.unwrap(), "t-abc");
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_error_code() {
        let mut server = mockito::Server::new_async().await;
        let _endpoint = server
            .mock("POST", "/open-apis/auth/v3/tenant_access_token/internal")
            .with_status(200)
            .with_body(r#"{"code":10014,"msg":"app secret invalid"}"#)
            .create_async()
            .await;

        let result = client(&server).tenant_access_token().await;
        assert!(matches!(result, Err(LarkError::AuthError(msg)) if msg.contains("10014")));
    }

    #[tokio::test]
    async fn test_upload_and_send_file() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server, 1).await;
        let upload = server
            .mock("POST", "/open-apis/im/v1/files")
            .match_header("authorization", "Bearer t-abc")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"file_type\"\r\n\r\nstream".to_string()),
                Matcher::Regex("name=\"file_name\"\r\n\r\nreport.xlsx".to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"code":0,"msg":"success","data":{"file_key":"file_v2_123"}}"#)
            .create_async()
            .await;
        let send = server
            .mock("POST", "/open-apis/im/v1/messages")
            .match_query(Matcher::UrlEncoded(
                "receive_id_type".to_string(),
                "chat_id".to_string(),
            ))
            .match_body(Matcher::Json(json!({
                "receive_id": "oc_1",
                "msg_type": "file",
                "content": "{\"file_key\":\"file_v2_123\"}"
            })))
            .with_status(200)
            .with_body(r#"{"code":0,"msg":"success","data":{"message_id":"om_1"}}"#)
            .create_async()
            .await;

        let client = client(&server);
        let file_key = client
            .upload_file("report.xlsx", b"PK\x03\x04data".to_vec())
            .await
            .unwrap();
        assert_eq!(file_key, "file_v2_123");
        let message_id = client.send_file("oc_1", &file_key).await.unwrap();
        assert_eq!(message_id, "om_1");

        upload.assert_async().await;
        send.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server, 1).await;
        let _endpoint = server
            .mock("POST", "/open-apis/im/v1/files")
            .with_status(200)
            .with_body(r#"{"code":234001,"msg":"Invalid request param."}"#)
            .create_async()
            .await;

        let result = client(&server).upload_file("output.xlsx", b"x".to_vec()).await;
        assert!(matches!(result, Err(LarkError::ApiError { code: 234001, .. })));
    }

    #[tokio::test]
    async fn test_upload_without_file_name() {
        let server = mockito::Server::new_async().await;
        let result = client(&server).upload_file("", b"PK".to_vec()).await;
        assert!(matches!(result, Err(LarkError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_send_text() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server, 1).await;
        let send = server
            .mock("POST", "/open-apis/im/v1/messages")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "msg_type": "text",
                "content": "{\"text\":\"hello\"}"
            })))
            .with_status(200)
            .with_body(r#"{"code":0,"data":{"message_id":"om_2"}}"#)
            .create_async()
            .await;

        assert_eq!(client(&server).send_text("oc_1", "hello").await.unwrap(), "om_2");
        send.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server, 1).await;
        let _endpoint = server
            .mock("POST", "/open-apis/im/v1/messages")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;

        let result = client(&server).send_text("oc_1", "hi").await;
        assert!(matches!(result, Err(LarkError::HttpError { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_bot_info() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server, 1).await;
        let _endpoint = server
            .mock("GET", "/open-apis/bot/v3/info")
            .match_header("authorization", "Bearer t-abc")
            .with_status(200)
            .with_body(r#"{"code":0,"msg":"ok","bot":{"open_id":"ou_bot","app_name":"案件Bot"}}"#)
            .create_async()
            .await;

        let bot = client(&server).bot_info().await.unwrap();
        assert_eq!(bot.open_id, "ou_bot");
        assert_eq!(bot.app_name, "案件Bot");
    }
}
