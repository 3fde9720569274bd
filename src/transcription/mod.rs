//! # Transcription Module
//!
//! Speech-to-text for recorded practice audio, delegated to an external
//! provider (Groq's hosted Whisper API). Nothing in this module interprets
//! audio itself; it ships the bytes out and returns the transcript text.
//!
//! ## Key Components:
//! - **Gateway trait**: the seam the request orchestrator depends on, so
//!   tests can substitute a canned transcript
//! - **Groq client**: multipart upload to the provider with bounded
//!   timeouts and provider error pass-through
//!
//! ## Failure Semantics:
//! - Missing credential → configuration error, detected before any request
//! - Provider rejection, network failure, or timeout → gateway error with
//!   the provider's message; never retried here

pub mod gateway;
pub mod groq;

pub use gateway::TranscriptionGateway;
pub use groq::GroqTranscriber;
