//! # Application State Management
//!
//! Shared state handed to every request handler: the configuration, the
//! transcription engine handle, and the metrics the observability layer
//! collects.
//!
//! ## Thread Safety:
//! Handlers run concurrently on the actix worker pool, so everything mutable
//! lives behind `Arc<RwLock<>>`. Reads are frequent (every request), writes
//! are short (counter updates), which is exactly the RwLock trade-off.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::config::AppConfig;
use crate::transcriber::Transcriber;

/// State shared across all HTTP workers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, read by handlers on every request.
    pub config: Arc<RwLock<AppConfig>>,

    /// Request and transcription counters.
    pub metrics: Arc<RwLock<AppMetrics>>,

    /// When the server started. Instant is Copy, so no lock needed.
    pub start_time: Instant,

    /// The engine every upload is forwarded to.
    transcriber: Arc<dyn Transcriber>,
}

/// Counters collected across all HTTP requests.
#[derive(Debug, Default, Clone)]
pub struct AppMetrics {
    /// Total HTTP requests processed since server start.
    pub request_count: u64,

    /// Total requests that ended in a 4xx/5xx response.
    pub error_count: u64,

    /// Uploads currently inside the transcription engine.
    pub inflight_transcriptions: u32,

    /// Uploads that produced a transcript.
    pub transcriptions_completed: u64,

    /// Uploads where the engine failed.
    pub transcriptions_failed: u64,

    /// Per-endpoint breakdown, keyed like "POST /api/transcribe".
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

/// Counters for a single endpoint.
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

impl AppState {
    pub fn new(config: AppConfig, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            start_time: Instant::now(),
            transcriber,
        }
    }

    pub fn transcriber(&self) -> Arc<dyn Transcriber> {
        Arc::clone(&self.transcriber)
    }

    /// Copy of the current configuration. Cloning releases the lock
    /// immediately so other workers are never blocked on a slow handler.
    pub fn get_config(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    /// Record one finished HTTP request in the global and per-endpoint
    /// counters. Called by the request tracking middleware.
    pub fn record_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.request_count += 1;
        if is_error {
            metrics.error_count += 1;
        }

        let entry = metrics
            .endpoint_metrics
            .entry(endpoint.to_string())
            .or_default();
        entry.request_count += 1;
        entry.total_duration_ms += duration_ms;
        if is_error {
            entry.error_count += 1;
        }
    }

    /// Mark an upload as handed to the engine.
    pub fn begin_transcription(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.inflight_transcriptions += 1;
    }

    /// Mark an engine call as finished, successfully or not.
    pub fn finish_transcription(&self, success: bool) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.inflight_transcriptions = metrics.inflight_transcriptions.saturating_sub(1);
        if success {
            metrics.transcriptions_completed += 1;
        } else {
            metrics.transcriptions_failed += 1;
        }
    }

    /// Point-in-time copy of the metrics for the health endpoint.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        self.metrics.read().unwrap().clone()
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
