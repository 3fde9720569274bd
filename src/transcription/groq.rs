//! Groq Whisper client.
//!
//! Groq's transcription API is a plain REST endpoint: one multipart POST
//! per recording, transcript in the JSON response. Practice recordings are
//! single words, so there is no buffering or chunking to do here; the whole
//! upload fits in one request well under the provider's size limit.

use crate::config::TranscriptionSettings;
use crate::error::AppError;
use crate::transcription::gateway::TranscriptionGateway;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Successful transcription response. `verbose_json` carries more fields
/// (segments, language, duration); only the text matters here.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Provider error envelope: `{"error": {"message": "...", "type": "..."}}`.
#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Client for the Groq audio transcription endpoint.
pub struct GroqTranscriber {
    http: reqwest::Client,
    settings: TranscriptionSettings,
}

impl GroqTranscriber {
    /// Build the client with the configured request and connect timeouts.
    /// A missing API key is allowed here; it is reported per-request so the
    /// server can start without a credential.
    pub fn new(settings: &TranscriptionSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .context("Failed to build transcription HTTP client")?;

        Ok(Self {
            http,
            settings: settings.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, AppError> {
        match self.settings.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::Config("API key not configured".to_string())),
        }
    }

    /// Turn a non-success provider response into the message we pass back.
    /// The provider's own message is surfaced unmodified when its error
    /// envelope parses; otherwise the status and raw body are.
    fn provider_error_message(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ProviderErrorResponse>(body) {
            Ok(envelope) => envelope.error.message,
            Err(_) => format!("Transcription provider error ({}): {}", status, body),
        }
    }
}

#[async_trait]
impl TranscriptionGateway for GroqTranscriber {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, AppError> {
        let api_key = self.api_key()?;

        let file_part = Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str("audio/wav")
            .map_err(|e| AppError::Internal(format!("Invalid MIME type: {}", e)))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.settings.model.clone())
            .text("response_format", "verbose_json");

        debug!(model = %self.settings.model, "Submitting audio for transcription");

        let response = self
            .http
            .post(&self.settings.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Gateway(format!(
                        "Transcription request timed out after {}s",
                        self.settings.timeout_secs
                    ))
                } else {
                    AppError::Gateway(format!("Transcription request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Gateway(format!("Failed to read transcription response: {}", e)))?;

        if !status.is_success() {
            let message = Self::provider_error_message(status, &body);
            warn!(status = %status.as_u16(), "Transcription provider returned an error");
            return Err(AppError::Gateway(message));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::Gateway(format!("Unexpected transcription response: {}", e))
        })?;

        debug!(transcript = %parsed.text, "Transcription completed");
        Ok(parsed.text)
    }
}
