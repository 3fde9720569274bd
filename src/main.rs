//! # Phonemes Backend - Main Application Entry Point
//!
//! Entry point for the pronunciation-practice drill server. A client picks
//! a target sound, gets back an example word to read aloud, uploads a
//! recording of the attempt, and receives an accuracy percentage plus
//! remedial articulation guidance when scores stay low.
//!
//! ## Application Architecture:
//! - **config**: layered configuration (TOML file + environment variables)
//! - **dataset**: phoneme reference data (words, IPA, remedies, images)
//! - **scoring**: the transcript-vs-expected-word accuracy heuristic
//! - **session**: per-session active-sound state
//! - **transcription**: the external speech-to-text gateway
//! - **state**: shared application state and metrics
//! - **handlers**: HTTP request handlers for the drill endpoints
//! - **health**: health and metrics endpoints
//! - **middleware**: request logging and metrics collection
//! - **error**: error types and their HTTP responses

mod config;
mod dataset;
mod error;
mod handlers;
mod health;
mod middleware;
mod scoring;
mod session;
mod state;
mod transcription;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Result;
use config::AppConfig;
use dataset::PhonemeDataset;
use state::AppState;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transcription::GroqTranscriber;

/// Global shutdown signal, set by the signal handler task and polled by the
/// main task so the server can stop gracefully.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

/// The main application entry point.
///
/// ## Startup sequence:
/// 1. Load environment variables from .env (if present) and set up logging
/// 2. Load and validate configuration
/// 3. Load and validate the phoneme dataset (built-in or from file)
/// 4. Build the shared application state, including the transcription client
/// 5. Start the HTTP server and wait for a shutdown signal
///
/// A missing transcription credential is only a warning here: the server
/// must come up and keep serving prompts; recording verification reports
/// the configuration error per-request.
#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting phonemes-backend v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {}:{}", config.server.host, config.server.port);

    if !config.api_key_configured() {
        warn!("OPEN_API_KEY not configured; recording verification will be unavailable");
    }

    let dataset = match &config.dataset.path {
        Some(path) => {
            info!("Loading phoneme dataset from {}", path);
            PhonemeDataset::from_path(Path::new(path))?
        }
        None => {
            let dataset = PhonemeDataset::default();
            dataset.validate()?;
            dataset
        }
    };
    info!("Phoneme dataset ready: {} letters advertised", dataset.letters.len());

    let transcriber = Arc::new(GroqTranscriber::new(&config.transcription)?);
    let app_state = AppState::new(config.clone(), dataset, transcriber);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        // The two frontends this service has always served
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::RequestTelemetry)
            .route("/test/{letter}", web::get().to(handlers::select_with_image))
            .route("/generate_word/{letter}", web::get().to(handlers::select_word_only))
            .route("/record", web::post().to(handlers::record))
            .route("/remedy/{average}", web::get().to(handlers::remedy))
            .route("/remedy/{average}", web::post().to(handlers::remedy))
            .route("/letters", web::get().to(handlers::list_letters))
            .route("/health", web::get().to(health::health_check))
            .route("/metrics", web::get().to(health::detailed_metrics))
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    // Race the server against the shutdown signal
    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Initialize the tracing (logging) system.
///
/// `RUST_LOG` controls verbosity; the default keeps this crate at debug and
/// the framework at info.
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phonemes_backend=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Listen for SIGTERM/SIGINT and flip the global shutdown flag.
fn setup_signal_handlers() {
    tokio::spawn(async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

/// Poll the shutdown flag without busy-waiting.
async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
