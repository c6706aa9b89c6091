//! Orientation-correct still encoding.
//!
//! This module turns a raw sensor frame into the JPEG that visitors take
//! home. The sensor always delivers landscape frames; the encoder rotates
//! to match how the device was actually held and decides whether the
//! preview's selfie-mirror effect survives into the saved photo.

mod still;

pub use still::{EncodeError, EncodedStill, Orientation, StillEncoder};
