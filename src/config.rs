//! # Configuration Management
//!
//! This module handles loading and managing application configuration from
//! multiple sources:
//! - TOML configuration files (config.toml)
//! - Environment variables (with APP_ prefix)
//! - Default values (built into the code)
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Deployment environment variables (HOST, PORT, OPEN_API_KEY)
//! 2. Environment variables with APP_ prefix
//! 3. Configuration file (config.toml)
//! 4. Default values (defined in the Default impl)
//!
//! The transcription API credential is deliberately NOT required at startup:
//! the server comes up without it and only recording verification requests
//! fail, with a clear configuration error, until the credential is provided.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Main application configuration that contains all settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub transcription: TranscriptionSettings,
    pub dataset: DatasetConfig,
}

/// Server-specific configuration settings.
///
/// ## Fields:
/// - `host`: IP address or hostname to bind to ("127.0.0.1" for local
///   development, "0.0.0.0" to accept connections from anywhere)
/// - `port`: TCP port to listen on (this service has always lived on 5002)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Settings for the external speech-to-text provider.
///
/// ## Fields:
/// - `api_key`: bearer credential for the provider; absent means recording
///   verification is unavailable (but the server still starts)
/// - `api_url`: transcription endpoint URL
/// - `model`: Whisper model the provider should run
/// - `timeout_secs`: upper bound on the whole transcription request
/// - `connect_timeout_secs`: upper bound on establishing the connection
///
/// ## Why bounded timeouts:
/// The provider call is the only externally-blocking operation in the
/// request path; a hung provider must fail the one request, not wedge the
/// worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionSettings {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

/// Where to find the phoneme reference dataset.
///
/// ## Fields:
/// - `path`: optional TOML file replacing the built-in phoneme table.
///   When unset, the compiled-in dataset is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5002,
            },
            transcription: TranscriptionSettings {
                api_key: None,
                api_url: "https://api.groq.com/openai/v1/audio/transcriptions".to_string(),
                model: "whisper-large-v3".to_string(),
                timeout_secs: 60,
                connect_timeout_secs: 10,
            },
            dataset: DatasetConfig { path: None },
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources in priority order.
    ///
    /// ## Loading Process:
    /// 1. Start with built-in defaults
    /// 2. Override with values from config.toml (if it exists)
    /// 3. Override with environment variables prefixed with APP_
    /// 4. Handle HOST / PORT / OPEN_API_KEY, the un-prefixed variables the
    ///    hosting platform and existing deployments already use
    ///
    /// ## Environment Variable Examples:
    /// - `APP_SERVER_HOST=127.0.0.1`: override the bind address
    /// - `PORT=8080`: deployment-platform port override
    /// - `OPEN_API_KEY=gsk_...`: the transcription provider credential
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("_"));

        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        // The provider credential keeps the variable name the deployment
        // has always used.
        if let Ok(key) = env::var("OPEN_API_KEY") {
            settings = settings.set_override("transcription.api_key", key)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    ///
    /// A missing API credential is NOT a validation failure: the server must
    /// start without it and surface the problem per-request instead.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.transcription.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Transcription timeout must be greater than 0"));
        }

        if self.transcription.connect_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "Transcription connect timeout must be greater than 0"
            ));
        }

        if self.transcription.api_url.trim().is_empty() {
            return Err(anyhow::anyhow!("Transcription API URL cannot be empty"));
        }

        Ok(())
    }

    /// Whether the transcription provider credential is present and non-empty.
    pub fn api_key_configured(&self) -> bool {
        self.transcription
            .api_key
            .as_deref()
            .map_or(false, |key| !key.trim().is_empty())
    }
}
