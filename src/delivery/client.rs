//! Kiosk-side upload to a remote delivery endpoint.
//!
//! Uploading is one of two independent side effects of capture; the
//! other is the local store write. Neither waits for the other, and
//! an upload failure never rolls the local photo back: the kiosk can
//! still preview and retake, the remote link just won't resolve until
//! a later upload succeeds.

use crate::delivery::server::{UploadRequest, UploadResponse};
use crate::store::PhotoId;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Errors from the remote handoff.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request itself failed (connect, timeout, malformed response).
    #[error("upload failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("upload rejected with status {0}")]
    Rejected(StatusCode),
}

/// HTTP client for handing captured stills to a remote delivery endpoint.
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UploadClient {
    /// Creates a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Uploads JPEG bytes under the photo's id.
    ///
    /// Returns the download URL minted by the remote side.
    pub async fn upload(&self, id: PhotoId, jpeg: &[u8]) -> Result<String, UploadError> {
        let request = UploadRequest {
            image: BASE64.encode(jpeg),
            filename: format!("{id}.jpg"),
        };

        let response = self.http.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%id, %status, "Upload rejected by remote endpoint");
            return Err(UploadError::Rejected(status));
        }

        let body: UploadResponse = response.json().await?;
        tracing::info!(%id, url = %body.image_url, "Photo uploaded");
        Ok(body.image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_payload_shape() {
        let id = PhotoId::generate();
        let request = UploadRequest {
            image: BASE64.encode(b"jpeg"),
            filename: format!("{id}.jpg"),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["filename"], format!("{id}.jpg"));
        assert_eq!(value["image"], BASE64.encode(b"jpeg"));
    }
}
