//! Configuration file parsing for the webhook server.
//!
//! Settings come from an optional TOML file with nested `[lark]`, `[llm]`,
//! `[extractor]`, `[sheet]` and `[gate]` tables, then environment overrides.

use mailsheet_extractor::ExtractorConfig;
use mailsheet_lark::LarkConfig;
use mailsheet_sheet::SheetConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Lark application id
pub const ENV_LARK_APP_ID: &str = "LARK_APP_ID";
/// Lark application secret
pub const ENV_LARK_APP_SECRET: &str = "LARK_APP_SECRET";
/// Chat-completion API key
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Bind address as `host:port`
pub const ENV_BIND: &str = "MAILSHEET_BIND";
/// Workbook output path
pub const ENV_OUTPUT: &str = "MAILSHEET_OUTPUT";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value failed validation
    #[error("Invalid configuration [{section}]: {message}")]
    Invalid {
        /// Table the value belongs to
        section: &'static str,
        /// What is wrong
        message: String,
    },
}

/// Chat-completion service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// API key; without one the language-model extractor is disabled
    pub api_key: String,
    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Attempts per request, first try included
    pub max_retries: u32,
    /// Backoff before the second attempt (milliseconds)
    pub backoff_ms: u64,
}

impl LlmConfig {
    /// True when an API key is configured
    pub fn enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: mailsheet_llm::openai::DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            request_timeout_secs: mailsheet_llm::openai::DEFAULT_TIMEOUT_SECS,
            max_retries: mailsheet_llm::openai::DEFAULT_MAX_RETRIES,
            backoff_ms: mailsheet_llm::openai::DEFAULT_BACKOFF_MS,
        }
    }
}

/// Which event gate to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// Remember every id for the life of the process
    Unbounded,
    /// Remember at most `capacity` ids, each for `ttl_secs`
    Bounded,
}

/// Event gate settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Gate implementation
    pub kind: GateKind,
    /// Maximum remembered ids (bounded gate)
    pub capacity: usize,
    /// How long an id is remembered (bounded gate, seconds)
    pub ttl_secs: u64,
}

impl GateConfig {
    /// Entry lifetime as a Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    fn validate(&self) -> Result<(), String> {
        if self.kind == GateKind::Bounded {
            if self.capacity == 0 {
                return Err("capacity must be greater than 0".to_string());
            }
            if self.ttl_secs == 0 {
                return Err("ttl_secs must be greater than 0".to_string());
            }
        }
        Ok(())
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            kind: GateKind::Unbounded,
            capacity: 10_000,
            ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Webhook server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub bind_address: String,
    /// Bind port
    pub bind_port: u16,
    /// Path the platform posts events to
    pub webhook_path: String,
    /// Lark platform
    pub lark: LarkConfig,
    /// Chat-completion service
    pub llm: LlmConfig,
    /// Extraction pipeline
    pub extractor: ExtractorConfig,
    /// Workbook output
    pub sheet: SheetConfig,
    /// Duplicate-event gate
    pub gate: GateConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 8000,
            webhook_path: "/webhook".to_string(),
            lark: LarkConfig::default(),
            llm: LlmConfig::default(),
            extractor: ExtractorConfig::default(),
            sheet: SheetConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(app_id) = lookup(ENV_LARK_APP_ID) {
            self.lark.app_id = app_id;
        }
        if let Some(secret) = lookup(ENV_LARK_APP_SECRET) {
            self.lark.app_secret = secret;
        }
        if let Some(key) = lookup(ENV_OPENAI_API_KEY) {
            self.llm.api_key = key;
        }
        if let Some(output) = lookup(ENV_OUTPUT) {
            self.sheet.output_path = PathBuf::from(output);
        }
        if let Some(bind) = lookup(ENV_BIND) {
            let (host, port) = bind.rsplit_once(':').ok_or_else(|| ConfigError::Invalid {
                section: "server",
                message: format!("{} must be host:port, got '{}'", ENV_BIND, bind),
            })?;
            self.bind_port = port.parse().map_err(|_| ConfigError::Invalid {
                section: "server",
                message: format!("invalid port in {}: '{}'", ENV_BIND, port),
            })?;
            self.bind_address = host.to_string();
        }
        Ok(())
    }

    /// Validate every table
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |section: &'static str| move |message: String| ConfigError::Invalid { section, message };

        if !self.webhook_path.starts_with('/') {
            return Err(invalid("server")(format!(
                "webhook_path must start with '/': {}",
                self.webhook_path
            )));
        }
        self.lark.validate().map_err(invalid("lark"))?;
        self.llm.validate().map_err(invalid("llm"))?;
        self.extractor.validate().map_err(invalid("extractor"))?;
        self.sheet.validate().map_err(invalid("sheet"))?;
        self.gate.validate().map_err(invalid("gate"))?;
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsheet_extractor::ExtractionStrategy;
    use std::collections::HashMap;

    fn with_credentials() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.lark.app_id = "cli_test".to_string();
        config.lark.app_secret = "secret".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.webhook_path, "/webhook");
        assert_eq!(config.sheet.output_path, PathBuf::from("output.xlsx"));
        assert_eq!(config.gate.kind, GateKind::Unbounded);
        assert!(!config.llm.enabled());
    }

    #[test]
    fn test_defaults_need_lark_credentials() {
        let err = ServerConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { section: "lark", .. }));
        assert!(with_credentials().validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 9000

            [lark]
            app_id = "cli_a"
            app_secret = "s"

            [llm]
            base_url = "http://localhost:11434/v1"
            max_retries = 5

            [extractor]
            strategy = "pattern"

            [sheet]
            output_path = "/tmp/projects.xlsx"

            [gate]
            kind = "bounded"
            capacity = 100
            ttl_secs = 600
        "#;

        let config = ServerConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.lark.app_id, "cli_a");
        assert_eq!(config.lark.base_url, "https://open.larksuite.com");
        assert_eq!(config.llm.max_retries, 5);
        assert_eq!(config.extractor.strategy, ExtractionStrategy::Pattern);
        assert_eq!(config.extractor.model, "gpt-4");
        assert_eq!(config.sheet.output_path, PathBuf::from("/tmp/projects.xlsx"));
        assert_eq!(config.gate.kind, GateKind::Bounded);
        assert_eq!(config.gate.ttl(), Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mailsheet.toml");
        std::fs::write(&path, "bind_port = 8123\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.bind_port, 8123);
        assert!(matches!(
            ServerConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::FileRead(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_LARK_APP_ID, "cli_env"),
            (ENV_LARK_APP_SECRET, "env-secret"),
            (ENV_OPENAI_API_KEY, "sk-env"),
            (ENV_BIND, "127.0.0.1:3000"),
            (ENV_OUTPUT, "out/list.xlsx"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.lark.app_id, "cli_env");
        assert_eq!(config.lark.app_secret, "env-secret");
        assert!(config.llm.enabled());
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.sheet.output_path, PathBuf::from("out/list.xlsx"));
    }

    #[test]
    fn test_blank_env_does_not_override() {
        let mut config = with_credentials();
        config
            .apply_overrides(|k| (k == ENV_LARK_APP_ID).then(|| "  ".to_string()))
            .unwrap();
        assert_eq!(config.lark.app_id, "cli_test");
    }

    #[test]
    fn test_bad_bind_override() {
        let mut config = ServerConfig::default();
        let result = config.apply_overrides(|k| (k == ENV_BIND).then(|| "localhost".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid { section: "server", .. })));
    }

    #[test]
    fn test_bounded_gate_validation() {
        let mut config = with_credentials();
        config.gate.kind = GateKind::Bounded;
        config.gate.capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { section: "gate", .. })
        ));
    }
}
