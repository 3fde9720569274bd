pub mod phonemes;
pub mod recording;

pub use phonemes::*;
pub use recording::*;

use crate::session::DEFAULT_SESSION;
use actix_web::HttpRequest;

/// Header a client uses to name its practice session. Requests without it
/// share one default session, where the last selection wins.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// The session a request belongs to.
pub fn session_id(req: &HttpRequest) -> String {
    req.headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}
