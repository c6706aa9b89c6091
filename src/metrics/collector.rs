//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Underlying Prometheus registry error.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics for the capture-to-delivery pipeline.
///
/// Counters are incremented at the point the event happens: capture and
/// retake on the kiosk side, delivery and consumption in the server
/// handlers. All share one registry exposed at `/metrics`.
pub struct KioskMetrics {
    registry: Registry,

    photos_captured: IntCounter,
    photos_retaken: IntCounter,
    photos_delivered: IntCounter,
    photos_consumed: IntCounter,
    upload_failures: IntCounter,
    photos_held: IntGauge,
}

impl KioskMetrics {
    /// Creates a registry with all pipeline metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let photos_captured = IntCounter::new(
            "kiosk_photos_captured_total",
            "Total photos captured and stored",
        )?;
        let photos_retaken = IntCounter::new(
            "kiosk_photos_retaken_total",
            "Total photos discarded by the visitor retaking",
        )?;
        let photos_delivered = IntCounter::new(
            "kiosk_photos_delivered_total",
            "Total photos fetched by a remote viewer for the first time",
        )?;
        let photos_consumed = IntCounter::new(
            "kiosk_photos_consumed_total",
            "Total photos removed by single-use consumption",
        )?;
        let upload_failures = IntCounter::new(
            "kiosk_upload_failures_total",
            "Total failed remote handoff uploads",
        )?;
        let photos_held = IntGauge::new(
            "kiosk_photos_held",
            "Photos currently held in the ephemeral store",
        )?;

        registry.register(Box::new(photos_captured.clone()))?;
        registry.register(Box::new(photos_retaken.clone()))?;
        registry.register(Box::new(photos_delivered.clone()))?;
        registry.register(Box::new(photos_consumed.clone()))?;
        registry.register(Box::new(upload_failures.clone()))?;
        registry.register(Box::new(photos_held.clone()))?;

        Ok(Self {
            registry,
            photos_captured,
            photos_retaken,
            photos_delivered,
            photos_consumed,
            upload_failures,
            photos_held,
        })
    }

    /// Records a successful capture.
    pub fn record_capture(&self) {
        self.photos_captured.inc();
    }

    /// Records a visitor retake.
    pub fn record_retake(&self) {
        self.photos_retaken.inc();
    }

    /// Records a first-time delivery fetch.
    pub fn record_delivery(&self) {
        self.photos_delivered.inc();
    }

    /// Records a single-use consumption.
    pub fn record_consumption(&self) {
        self.photos_consumed.inc();
    }

    /// Records a failed remote upload.
    pub fn record_upload_failure(&self) {
        self.upload_failures.inc();
    }

    /// Updates the held-photos gauge.
    pub fn set_held(&self, held: usize) {
        self.photos_held.set(held as i64);
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
