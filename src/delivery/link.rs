//! Download link minting and scannable-code rendering.

use crate::store::PhotoId;
use qrcode::render::unicode;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

/// Errors that can occur while rendering a scannable code.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The payload could not be encoded as a QR code.
    #[error("qr encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),
}

/// Builds the download URL for a photo: `<origin>/download/<id>`.
///
/// Deterministic, no signature: the id's unpredictability is the only
/// access control on the link.
pub fn mint_link(origin: &str, id: PhotoId) -> String {
    format!("{}/download/{}", origin.trim_end_matches('/'), id)
}

/// Renders a URL as a QR code raster.
///
/// Error correction is fixed at level H: kiosk screens get smudged and
/// photographed at angles, and the payload is short enough that the
/// redundancy costs nothing.
pub fn scannable_code(url: &str) -> Result<image::GrayImage, LinkError> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::H)?;
    Ok(code
        .render::<image::Luma<u8>>()
        .min_dimensions(256, 256)
        .build())
}

/// Renders a URL as a QR code in half-block unicode, for terminals.
pub fn scannable_code_text(url: &str) -> Result<String, LinkError> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::H)?;
    Ok(code.render::<unicode::Dense1x2>().build())
}
