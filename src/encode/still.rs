//! Still encoder: orientation correction and JPEG output.

use crate::capture::{EncodingConfig, Frame};
use image::{imageops, RgbImage};
use std::io::Cursor;
use thiserror::Error;

/// Errors that can occur while encoding a still.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The source frame has no dimensions or a short pixel buffer.
    /// Happens when capture fires before the stream finishes negotiating.
    #[error("frame not ready: stream has no usable dimensions yet")]
    FrameNotReady,
    /// JPEG encoding failed.
    #[error("jpeg encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Display orientation of the device at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Viewport taller than wide; the landscape sensor frame must be
    /// rotated to come out upright.
    Portrait,
    /// Viewport wider than tall; no rotation.
    Landscape,
}

impl Orientation {
    /// Derives the orientation from viewport dimensions.
    pub fn from_viewport(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// An encoded still image ready for storage.
///
/// Dimensions are post-rotation: a portrait capture reports
/// height > width here regardless of the sensor's native shape.
#[derive(Debug, Clone)]
pub struct EncodedStill {
    /// JPEG bytes.
    pub data: Vec<u8>,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Encodes raw frames into orientation-correct JPEG stills.
pub struct StillEncoder {
    jpeg_quality: u8,
    preserve_preview_mirror: bool,
}

impl StillEncoder {
    /// Creates an encoder from the encoding configuration.
    pub fn new(config: &EncodingConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            preserve_preview_mirror: config.preserve_preview_mirror,
        }
    }

    /// Encodes a frame into a JPEG still for the given device orientation.
    ///
    /// The sensor frame itself is unmirrored; the selfie-mirror effect
    /// exists only in the live preview. By default the saved still shows
    /// the scene as the camera saw it, so text in the photo reads
    /// correctly. `preserve_preview_mirror` flips the output to match the
    /// preview instead.
    pub fn encode(
        &self,
        frame: &Frame,
        orientation: Orientation,
    ) -> Result<EncodedStill, EncodeError> {
        if !frame.is_ready() {
            return Err(EncodeError::FrameNotReady);
        }

        let image = RgbImage::from_raw(frame.width(), frame.height(), frame.pixels().to_vec())
            .ok_or(EncodeError::FrameNotReady)?;

        let image = if self.preserve_preview_mirror {
            imageops::flip_horizontal(&image)
        } else {
            image
        };

        let image = match orientation {
            Orientation::Portrait => imageops::rotate90(&image),
            Orientation::Landscape => image,
        };

        let (width, height) = image.dimensions();
        let mut data = Vec::new();
        let mut cursor = Cursor::new(&mut data);
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut cursor,
            self.jpeg_quality,
        );
        encoder.encode(
            image.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )?;

        tracing::debug!(
            width,
            height,
            bytes = data.len(),
            ?orientation,
            "Still encoded"
        );

        Ok(EncodedStill {
            data,
            width,
            height,
        })
    }
}

impl Default for StillEncoder {
    fn default() -> Self {
        Self::new(&EncodingConfig::default())
    }
}
