//! Pipeline metrics.
//!
//! A single Prometheus registry tracks capture, retake, delivery,
//! consumption, and upload-failure counts. The delivery server exposes
//! it at `/metrics`; there is no separate metrics listener.

mod collector;

pub use collector::{KioskMetrics, MetricsError};
