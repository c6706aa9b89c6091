//! Camera input and frame handling.
//!
//! This module provides abstractions for acquiring a live video stream
//! and grabbing raw frames from it, plus the kiosk's file configuration.
//! The camera is treated as an opaque platform capability: acquisition
//! failure is a user-visible condition, never a pipeline fault.

mod camera;
mod config;
mod frame;

#[cfg(feature = "camera")]
pub use camera::NokhwaCamera;
pub use camera::{Camera, CameraError, MockCamera};
pub use config::{
    CaptureConfig, ConfigError, DeliveryConfig, EncodingConfig, FileConfig, SessionConfig,
};
pub use frame::Frame;
