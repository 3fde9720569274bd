//! # Phoneme Selection Handlers
//!
//! Endpoints that start a drill: the client picks a sound, the server
//! remembers it for the session and returns the prompt the learner should
//! read out loud.
//!
//! ## Available Endpoints:
//! - `GET /test/{letter}` - select a sound, prompt includes the image link
//! - `GET /generate_word/{letter}` - same selection, prompt without image
//! - `GET /letters` - list the advertised sounds and their example words
//!
//! Both selection variants mutate the session identically; they differ only
//! in what the prompt view carries.

use crate::dataset::PhonemeEntry;
use crate::error::AppError;
use crate::handlers::session_id;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::info;

/// Look the symbol up and make it the session's active sound.
///
/// Unknown symbols fail without touching the session, so a learner's
/// current drill survives a typo.
fn select_phoneme<'a>(
    state: &'a AppState,
    session: &str,
    symbol: &str,
) -> Result<&'a PhonemeEntry, AppError> {
    let entry = state
        .dataset
        .get(symbol)
        .ok_or_else(|| AppError::NotFound(format!("No example found for letter {}", symbol)))?;

    state.sessions.select(session, symbol);
    info!(session = %session, letter = %symbol, word = %entry.word, "Phoneme selected");

    Ok(entry)
}

/// Select a sound and return the full prompt, image included.
///
/// ## Endpoint: `GET /test/{letter}`
///
/// ## Response:
/// ```json
/// {
///   "word1": "apple",
///   "letter": "A",
///   "pronunciation": "ˈæp.əl",
///   "image_link": "https://..."
/// }
/// ```
pub async fn select_with_image(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let symbol = path.into_inner();
    let session = session_id(&req);
    let entry = select_phoneme(&state, &session, &symbol)?;

    Ok(HttpResponse::Ok().json(json!({
        "word1": entry.word,
        "letter": symbol,
        "pronunciation": entry.pronunciation,
        "image_link": entry.image
    })))
}

/// Select a sound and return the word-only prompt.
///
/// ## Endpoint: `GET /generate_word/{letter}`
///
/// Identical to `/test/{letter}` except the response omits `image_link`.
pub async fn select_word_only(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let symbol = path.into_inner();
    let session = session_id(&req);
    let entry = select_phoneme(&state, &session, &symbol)?;

    Ok(HttpResponse::Ok().json(json!({
        "word1": entry.word,
        "letter": symbol,
        "pronunciation": entry.pronunciation
    })))
}

/// List the advertised sounds and every selectable example word.
///
/// ## Endpoint: `GET /letters`
///
/// ## Response:
/// ```json
/// {
///   "letters": ["S", "F", "L", "B", "P", "T", "A", "Z"],
///   "examples": {"S": "sunday", "B2": "ball", ...}
/// }
/// ```
pub async fn list_letters(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "letters": state.dataset.letters,
        "examples": state.dataset.example_words()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::dataset::PhonemeDataset;
    use crate::session::DEFAULT_SESSION;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopTranscriber;

    #[async_trait]
    impl crate::transcription::TranscriptionGateway for NoopTranscriber {
        async fn transcribe(&self, _audio: Vec<u8>, _filename: &str) -> Result<String, AppError> {
            Err(AppError::Internal("not under test".to_string()))
        }
    }

    fn test_state() -> AppState {
        AppState::new(
            AppConfig::default(),
            PhonemeDataset::default(),
            Arc::new(NoopTranscriber),
        )
    }

    #[test]
    fn test_selection_sets_session_symbol() {
        let state = test_state();
        let entry = select_phoneme(&state, DEFAULT_SESSION, "A").unwrap();
        assert_eq!(entry.word, "apple");
        assert_eq!(
            state.sessions.active_symbol(DEFAULT_SESSION),
            Some("A".to_string())
        );
    }

    #[test]
    fn test_unknown_symbol_leaves_session_unchanged() {
        let state = test_state();
        select_phoneme(&state, DEFAULT_SESSION, "A").unwrap();

        let result = select_phoneme(&state, DEFAULT_SESSION, "Q");
        assert!(matches!(result, Err(AppError::NotFound(_))));
        // Prior selection survives the failed lookup
        assert_eq!(
            state.sessions.active_symbol(DEFAULT_SESSION),
            Some("A".to_string())
        );
    }

    #[test]
    fn test_reselection_overwrites() {
        let state = test_state();
        select_phoneme(&state, DEFAULT_SESSION, "A").unwrap();
        select_phoneme(&state, DEFAULT_SESSION, "Z").unwrap();
        assert_eq!(
            state.sessions.active_symbol(DEFAULT_SESSION),
            Some("Z".to_string())
        );
    }

    #[test]
    fn test_selection_is_per_session() {
        let state = test_state();
        select_phoneme(&state, "learner-1", "A").unwrap();
        select_phoneme(&state, "learner-2", "Z").unwrap();
        assert_eq!(state.sessions.active_symbol("learner-1"), Some("A".to_string()));
        assert_eq!(state.sessions.active_symbol("learner-2"), Some("Z".to_string()));
    }
}
