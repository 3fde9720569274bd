//! # Application State Management
//!
//! Shared state every HTTP request handler can reach: the configuration,
//! the phoneme reference dataset, the per-session practice state, the
//! transcription gateway handle, and process metrics.
//!
//! ## Sharing Pattern:
//! - **Arc**: many handlers hold references to the same data at once
//! - **RwLock**: many readers or one writer, never both
//! - Immutable pieces (dataset, start time) are shared without a lock;
//!   the dataset never changes after startup
//!
//! ## Lock Discipline:
//! Every lock in this module is held only long enough to copy data in or
//! out. Nothing slow ever runs under a lock, least of all the transcription
//! provider call.

use crate::config::AppConfig;
use crate::dataset::PhonemeDataset;
use crate::session::SessionStore;
use crate::transcription::TranscriptionGateway;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// The main application state shared across all HTTP request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<RwLock<AppConfig>>,

    /// Phoneme reference data, immutable after startup
    pub dataset: Arc<PhonemeDataset>,

    /// Per-session active phoneme selections
    pub sessions: SessionStore,

    /// Speech-to-text provider handle
    pub transcriber: Arc<dyn TranscriptionGateway>,

    /// Request and verification counters
    pub metrics: Arc<RwLock<AppMetrics>>,

    /// When the server started (never changes, no lock needed)
    pub start_time: Instant,
}

/// Counters collected across all HTTP requests.
#[derive(Debug, Default)]
pub struct AppMetrics {
    /// Total number of HTTP requests processed since server start
    pub request_count: u64,

    /// Total number of requests that ended in an error response
    pub error_count: u64,

    /// Number of recordings scored since server start
    pub verification_count: u64,

    /// Sum of all verification percentages, for the running average
    pub verification_score_total: u64,

    /// Per-endpoint statistics, keyed by "METHOD /path"
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

impl AppMetrics {
    /// Running average of all verification scores, or 0 before any.
    pub fn average_score(&self) -> f64 {
        if self.verification_count > 0 {
            self.verification_score_total as f64 / self.verification_count as f64
        } else {
            0.0
        }
    }
}

/// Statistics for a single API endpoint.
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}

impl AppState {
    /// Assemble the state from its startup-built pieces. The transcriber is
    /// injected as a trait object so tests can supply a canned one.
    pub fn new(
        config: AppConfig,
        dataset: PhonemeDataset,
        transcriber: Arc<dyn TranscriptionGateway>,
    ) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            dataset: Arc::new(dataset),
            sessions: SessionStore::new(),
            transcriber,
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            start_time: Instant::now(),
        }
    }

    /// A copy of the current configuration. Cloning releases the read lock
    /// immediately so other requests are never blocked on it.
    pub fn get_config(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    /// Whether the transcription provider credential is configured.
    pub fn api_key_configured(&self) -> bool {
        self.config.read().unwrap().api_key_configured()
    }

    pub fn increment_request_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.request_count += 1;
    }

    pub fn increment_error_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.error_count += 1;
    }

    /// Record one request against its endpoint's statistics.
    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap();

        let endpoint_metric = metrics.endpoint_metrics.entry(endpoint.to_string()).or_default();
        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;

        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Record a completed scoring run so the metrics endpoint can report
    /// how learners are doing overall.
    pub fn record_verification(&self, percentage: u8) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.verification_count += 1;
        metrics.verification_score_total += percentage as u64;
    }

    /// Snapshot of the metrics, cloned out so the lock is not held while
    /// the response serializes.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        let metrics = self.metrics.read().unwrap();
        AppMetrics {
            request_count: metrics.request_count,
            error_count: metrics.error_count,
            verification_count: metrics.verification_count,
            verification_score_total: metrics.verification_score_total,
            endpoint_metrics: metrics.endpoint_metrics.clone(),
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
