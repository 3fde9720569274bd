//! # Recording Verification Handlers
//!
//! The "how did I do" half of the drill: the client uploads a recording of
//! the learner saying the prompted word, the server has it transcribed by
//! the speech-to-text provider, scores the transcript against the expected
//! word, and hands back articulation instructions for the active sound when
//! the running average is low.
//!
//! ## Available Endpoints:
//! - `POST /record` - multipart upload (field `audio`), returns transcript
//!   and accuracy percentage
//! - `GET|POST /remedy/{average}` - remedial instructions when the average
//!   score is 50 or below

use crate::error::{AppError, AppResult};
use crate::handlers::session_id;
use crate::scoring::score;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::stream::StreamExt;
use serde_json::json;
use tracing::{debug, info};

/// Upload cap; the provider rejects larger files anyway.
const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Scores at or below this trigger remedial instructions.
const REMEDY_THRESHOLD: u32 = 50;

/// Pull the `audio` field out of a multipart upload.
///
/// Returns the recording bytes and the client's filename. The bytes are a
/// transient buffer: they live for this request and are handed straight to
/// the transcription gateway.
async fn read_audio_upload(
    mut payload: actix_multipart::Multipart,
) -> AppResult<(Vec<u8>, String)> {
    let mut audio_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::Validation(format!("Multipart error: {}", e)))?;

        let Some(content_disposition) = field.content_disposition() else {
            continue;
        };

        let Some(field_name) = content_disposition.get_name() else {
            continue;
        };

        if field_name == "audio" {
            filename = content_disposition.get_filename().map(|s| s.to_string());

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk =
                    chunk.map_err(|e| AppError::Validation(format!("Chunk error: {}", e)))?;
                if bytes.len() + chunk.len() > MAX_AUDIO_BYTES {
                    return Err(AppError::Validation(format!(
                        "Audio file too large (max {} bytes)",
                        MAX_AUDIO_BYTES
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }

            audio_data = Some(bytes);
        }
    }

    let audio_bytes =
        audio_data.ok_or_else(|| AppError::Validation("No audio file provided".to_string()))?;

    let filename = filename.unwrap_or_default();
    if filename.is_empty() {
        return Err(AppError::Validation("No audio file selected".to_string()));
    }

    Ok((audio_bytes, filename))
}

/// Run the verification flow for one recording.
///
/// 1. The session must have an active sound
/// 2. The recording must be non-empty
/// 3. The gateway transcribes the audio (the slow step; no locks held)
/// 4. The transcript is scored against the active sound's example word
///
/// Returns the raw transcript and the accuracy percentage.
pub(crate) async fn verify_recording(
    state: &AppState,
    session: &str,
    audio: Vec<u8>,
    filename: &str,
) -> AppResult<(String, u8)> {
    let symbol = state.sessions.active_symbol(session).ok_or_else(|| {
        AppError::Validation("No letter selected. Please call /test/<letter> first".to_string())
    })?;

    if audio.is_empty() {
        return Err(AppError::Validation("No audio file provided".to_string()));
    }

    // Selection guarantees the entry exists; a miss here means the dataset
    // changed out from under a live session.
    let expected_word = state
        .dataset
        .get(&symbol)
        .map(|entry| entry.word.clone())
        .ok_or_else(|| {
            AppError::Internal(format!("No example word registered for letter {}", symbol))
        })?;

    debug!(session = %session, letter = %symbol, bytes = audio.len(), "Audio received");

    let transcript = state.transcriber.transcribe(audio, filename).await?;

    let percentage = score(&expected_word, &transcript);
    state.record_verification(percentage);

    info!(
        session = %session,
        letter = %symbol,
        expected = %expected_word,
        transcript = %transcript,
        percentage = percentage,
        "Recording scored"
    );

    Ok((transcript, percentage))
}

/// Score an uploaded recording against the session's active sound.
///
/// ## Endpoint: `POST /record`
///
/// ## Request:
/// Multipart form data with the recording in a field named "audio".
/// Requires a prior `/test/{letter}` or `/generate_word/{letter}` call.
///
/// ## Response:
/// ```json
/// {
///   "transcript": "Apple.",
///   "percentage": 100
/// }
/// ```
pub async fn record(
    state: web::Data<AppState>,
    payload: actix_multipart::Multipart,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let session = session_id(&req);

    // Fail before draining the upload; verify_recording re-checks after
    if state.sessions.active_symbol(&session).is_none() {
        return Err(AppError::Validation(
            "No letter selected. Please call /test/<letter> first".to_string(),
        ));
    }

    let (audio, filename) = read_audio_upload(payload).await?;
    let (transcript, percentage) = verify_recording(&state, &session, audio, &filename).await?;

    Ok(HttpResponse::Ok().json(json!({
        "transcript": transcript,
        "percentage": percentage
    })))
}

/// Return remedial instructions for the session's active sound.
///
/// ## Endpoint: `GET|POST /remedy/{average}`
///
/// `average` is the learner's average percentage over recent attempts.
/// At or below 50 the response carries the sound's instruction list
/// (falling back to a generic practice message); above 50 the remedy is an
/// empty string, meaning no instructions are needed.
///
/// ## Response:
/// ```json
/// {"remedy": ["Put your lips together to make the sound."]}
/// ```
pub async fn remedy(
    state: web::Data<AppState>,
    path: web::Path<u32>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let average = path.into_inner();
    let session = session_id(&req);

    let symbol = state
        .sessions
        .active_symbol(&session)
        .ok_or_else(|| AppError::Validation("No letter selected".to_string()))?;

    if average <= REMEDY_THRESHOLD {
        let instructions = state
            .dataset
            .get(&symbol)
            .map(|entry| entry.remedy_instructions())
            .unwrap_or_else(|| vec![crate::dataset::DEFAULT_REMEDY.to_string()]);

        Ok(HttpResponse::Ok().json(json!({ "remedy": instructions })))
    } else {
        Ok(HttpResponse::Ok().json(json!({ "remedy": "" })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::dataset::PhonemeDataset;
    use crate::session::DEFAULT_SESSION;
    use crate::transcription::TranscriptionGateway;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Gateway double that returns a canned transcript.
    struct FixedTranscriber(String);

    #[async_trait]
    impl TranscriptionGateway for FixedTranscriber {
        async fn transcribe(&self, _audio: Vec<u8>, _filename: &str) -> Result<String, AppError> {
            Ok(self.0.clone())
        }
    }

    /// Gateway double that always fails like the provider would.
    struct FailingTranscriber;

    #[async_trait]
    impl TranscriptionGateway for FailingTranscriber {
        async fn transcribe(&self, _audio: Vec<u8>, _filename: &str) -> Result<String, AppError> {
            Err(AppError::Gateway("Invalid API Key".to_string()))
        }
    }

    fn state_with_transcript(transcript: &str) -> AppState {
        AppState::new(
            AppConfig::default(),
            PhonemeDataset::default(),
            Arc::new(FixedTranscriber(transcript.to_string())),
        )
    }

    #[tokio::test]
    async fn test_verify_requires_selection() {
        let state = state_with_transcript("apple");
        let result = verify_recording(&state, DEFAULT_SESSION, vec![1, 2, 3], "clip.wav").await;
        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "No letter selected. Please call /test/<letter> first")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_requires_audio() {
        let state = state_with_transcript("apple");
        state.sessions.select(DEFAULT_SESSION, "A");
        let result = verify_recording(&state, DEFAULT_SESSION, Vec::new(), "clip.wav").await;
        match result {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "No audio file provided"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_scores_exact_transcript() {
        let state = state_with_transcript("Apple. Great job!");
        state.sessions.select(DEFAULT_SESSION, "A");

        let (transcript, percentage) =
            verify_recording(&state, DEFAULT_SESSION, vec![1, 2, 3], "clip.wav")
                .await
                .unwrap();

        // Transcript is returned raw; only the score sees the normalization
        assert_eq!(transcript, "Apple. Great job!");
        assert_eq!(percentage, 100);
        assert_eq!(state.get_metrics_snapshot().verification_count, 1);
    }

    #[tokio::test]
    async fn test_verify_uses_latest_selection() {
        let state = state_with_transcript("zebra");
        state.sessions.select(DEFAULT_SESSION, "A");
        state.sessions.select(DEFAULT_SESSION, "Z");

        let (_, percentage) =
            verify_recording(&state, DEFAULT_SESSION, vec![1, 2, 3], "clip.wav")
                .await
                .unwrap();

        // Scored against Z's word "zebra", not A's "apple"
        assert_eq!(percentage, 100);
    }

    #[tokio::test]
    async fn test_verify_propagates_gateway_error() {
        let state = AppState::new(
            AppConfig::default(),
            PhonemeDataset::default(),
            Arc::new(FailingTranscriber),
        );
        state.sessions.select(DEFAULT_SESSION, "A");

        let result = verify_recording(&state, DEFAULT_SESSION, vec![1, 2, 3], "clip.wav").await;
        match result {
            Err(AppError::Gateway(msg)) => assert_eq!(msg, "Invalid API Key"),
            other => panic!("expected gateway error, got {:?}", other),
        }
        // Failed verifications are not counted
        assert_eq!(state.get_metrics_snapshot().verification_count, 0);
    }

    #[actix_web::test]
    async fn test_remedy_requires_selection() {
        let state = web::Data::new(state_with_transcript("apple"));
        let req = actix_web::test::TestRequest::default().to_http_request();

        let result = remedy(state, web::Path::from(40u32), req).await;
        match result {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "No letter selected"),
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[actix_web::test]
    async fn test_remedy_threshold_boundary() {
        let state = web::Data::new(state_with_transcript("apple"));
        state.sessions.select(DEFAULT_SESSION, "P");
        let req = actix_web::test::TestRequest::default().to_http_request();

        // At the threshold: instructions come back
        let response = remedy(state.clone(), web::Path::from(50u32), req.clone())
            .await
            .unwrap();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let instructions = json["remedy"].as_array().expect("remedy should be a list");
        assert!(!instructions.is_empty());

        // Above the threshold: empty remedy
        let response = remedy(state, web::Path::from(51u32), req).await.unwrap();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["remedy"], "");
    }

    #[tokio::test]
    async fn test_verify_scores_wrong_word_as_zero() {
        let state = state_with_transcript("banana");
        state.sessions.select(DEFAULT_SESSION, "A");

        let (_, percentage) =
            verify_recording(&state, DEFAULT_SESSION, vec![1, 2, 3], "clip.wav")
                .await
                .unwrap();
        assert_eq!(percentage, 0);
    }
}
