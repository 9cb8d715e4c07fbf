//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

use crate::capture::CaptureSink;
use crate::platform::MediaPlatform;
use crate::session::CameraSession;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of camera state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether a stream is feeding the preview.
    pub is_active: bool,
    /// Starts attempted.
    pub starts: u64,
    /// Starts that reached the active state.
    pub activations: u64,
    /// Starts that failed.
    pub failures: u64,
    /// Streams released because their start was superseded.
    pub late_releases: u64,
    /// Streams released by a stop.
    pub stops: u64,
    /// Stills captured.
    pub captures: u64,
}

/// Prometheus metrics registry for the camera layer.
pub struct MetricsRegistry {
    registry: Registry,

    // Session metrics
    session_active: IntGauge,
    starts_total: IntCounter,
    activations_total: IntCounter,
    failures_total: IntCounter,
    late_releases_total: IntCounter,
    stops_total: IntCounter,

    // Capture metrics
    captures_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all camera metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let session_active = IntGauge::new(
            "camera_capture_session_active",
            "Whether a camera stream is active (1=active, 0=idle)",
        )?;
        let starts_total = IntCounter::new(
            "camera_capture_starts_total",
            "Total number of camera starts attempted",
        )?;
        let activations_total = IntCounter::new(
            "camera_capture_activations_total",
            "Total number of camera starts that became active",
        )?;
        let failures_total = IntCounter::new(
            "camera_capture_failures_total",
            "Total number of camera starts that failed",
        )?;
        let late_releases_total = IntCounter::new(
            "camera_capture_late_releases_total",
            "Streams released because they arrived after a stop",
        )?;
        let stops_total = IntCounter::new(
            "camera_capture_stops_total",
            "Total number of streams released by a stop",
        )?;
        let captures_total = IntCounter::new(
            "camera_capture_captures_total",
            "Total number of still images captured",
        )?;

        registry.register(Box::new(session_active.clone()))?;
        registry.register(Box::new(starts_total.clone()))?;
        registry.register(Box::new(activations_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(late_releases_total.clone()))?;
        registry.register(Box::new(stops_total.clone()))?;
        registry.register(Box::new(captures_total.clone()))?;

        Ok(Self {
            registry,
            session_active,
            starts_total,
            activations_total,
            failures_total,
            late_releases_total,
            stops_total,
            captures_total,
        })
    }

    /// Updates all metrics from a snapshot of camera state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.session_active.set(if snapshot.is_active { 1 } else { 0 });

        // Counters only move forward, so add the difference
        advance(&self.starts_total, snapshot.starts);
        advance(&self.activations_total, snapshot.activations);
        advance(&self.failures_total, snapshot.failures);
        advance(&self.late_releases_total, snapshot.late_releases);
        advance(&self.stops_total, snapshot.stops);
        advance(&self.captures_total, snapshot.captures);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from the current state of the camera components.
    pub fn from_components<P: MediaPlatform>(
        session: &CameraSession<P>,
        sink: &CaptureSink,
    ) -> Self {
        let stats = session.stats();
        Self {
            is_active: session.is_active(),
            starts: stats.starts,
            activations: stats.activations,
            failures: stats.failures,
            late_releases: stats.late_releases,
            stops: stats.stops,
            captures: sink.captures(),
        }
    }
}
