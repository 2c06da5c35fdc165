//! Lark client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Credentials and endpoint for the Lark open platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LarkConfig {
    /// API base URL
    pub base_url: String,
    /// Application id (`LARK_APP_ID`)
    pub app_id: String,
    /// Application secret (`LARK_APP_SECRET`)
    pub app_secret: String,
    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,
}

impl LarkConfig {
    /// Per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("base_url must be an http(s) URL: {}", self.base_url));
        }
        if self.app_id.trim().is_empty() {
            return Err("app_id is required (set LARK_APP_ID)".to_string());
        }
        if self.app_secret.trim().is_empty() {
            return Err("app_secret is required (set LARK_APP_SECRET)".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for LarkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://open.larksuite.com".to_string(),
            app_id: String::new(),
            app_secret: String::new(),
            request_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_needs_credentials() {
        let config = LarkConfig::default();
        assert!(config.validate().unwrap_err().contains("LARK_APP_ID"));
    }

    #[test]
    fn test_valid_config() {
        let config = LarkConfig {
            app_id: "cli_a".to_string(),
            app_secret: "secret".to_string(),
            ..LarkConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_bad_base_url() {
        let config = LarkConfig {
            base_url: "open.larksuite.com".to_string(),
            app_id: "cli_a".to_string(),
            app_secret: "secret".to_string(),
            ..LarkConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
