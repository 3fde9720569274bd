//! The boundary between the drill server and whatever turns audio into text.

use crate::error::AppError;
use async_trait::async_trait;

/// Submit recorded audio, receive the raw transcript.
///
/// Implementations must treat the call as slow: it crosses the network and
/// may take seconds. Callers must not hold any lock across it.
#[async_trait]
pub trait TranscriptionGateway: Send + Sync {
    /// Transcribe `audio` (a complete recording, not a stream). `filename`
    /// is forwarded so the provider can infer the container format.
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, AppError>;
}
