//! HTTP server implementing the remote delivery contract.
//!
//! The server is the viewer-facing role over the shared photo store:
//! the kiosk writes, remote phones read and consume. Payloads are JSON
//! with base64 image bodies, matching what the download page expects.
//!
//! Single-use semantics live here: fetching never destroys anything
//! (prefetches and transport retries are welcome). Only the explicit
//! consume call, tied to the visitor's download action, removes the
//! photo, after which the id is gone for good.

use crate::delivery::link::mint_link;
use crate::metrics::KioskMetrics;
use crate::store::{PhotoId, PhotoStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;

/// Errors that can occur while running the delivery server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Could not bind the listen address.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    /// The server loop failed.
    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the delivery server.
#[derive(Debug, Clone)]
pub struct DeliveryServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for DeliveryServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 8080).into(),
        }
    }
}

impl DeliveryServerConfig {
    /// Creates a config with a custom port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

/// Shared state for the delivery handlers.
#[derive(Clone)]
pub struct DeliveryState {
    /// The photo store shared with the kiosk session.
    pub store: Arc<PhotoStore>,
    /// Pipeline metrics.
    pub metrics: Arc<KioskMetrics>,
    /// Public origin used when minting returned links.
    pub public_origin: String,
}

/// Upload request: base64 image bytes keyed by an id-bearing filename.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Base64 image payload; a `data:` URL prefix is tolerated.
    pub image: String,
    /// Filename whose stem is the photo id, e.g. `<uuid>.jpg`.
    pub filename: String,
}

/// Upload response carrying the minted download link.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Download URL for the stored photo.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Fetch response carrying the photo as a data URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct FetchResponse {
    /// `data:image/jpeg;base64,...` payload for direct display.
    #[serde(rename = "imageDataURL")]
    pub image_data_url: String,
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable failure description.
    pub message: String,
}

impl ApiError {
    fn response(status: StatusCode, message: &str) -> Response {
        (
            status,
            Json(ApiError {
                message: message.to_string(),
            }),
        )
            .into_response()
    }
}

/// HTTP server bridging kiosk photos to remote viewers.
pub struct DeliveryServer {
    config: DeliveryServerConfig,
    state: DeliveryState,
}

impl DeliveryServer {
    /// Creates a new delivery server over the shared store.
    pub fn new(config: DeliveryServerConfig, state: DeliveryState) -> Self {
        Self { config, state }
    }

    /// Starts the HTTP server.
    ///
    /// This method runs the server until it is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = router(self.state);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            "Delivery server listening"
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Builds the delivery router over the given state.
///
/// CORS is permissive: the download page is served from whatever origin
/// the venue parked it at, not from the kiosk.
pub fn router(state: DeliveryState) -> Router {
    Router::new()
        .route("/photos", post(upload_photo))
        .route("/photos/:id", get(fetch_photo))
        .route("/photos/:id/consume", post(consume_photo))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for `POST /photos`: stores uploaded bytes under the id
/// carried in the filename stem.
async fn upload_photo(
    State(state): State<DeliveryState>,
    Json(request): Json<UploadRequest>,
) -> Response {
    let stem = request
        .filename
        .split('.')
        .next()
        .unwrap_or(&request.filename);
    let id: PhotoId = match stem.parse() {
        Ok(id) => id,
        Err(_) => return ApiError::response(StatusCode::BAD_REQUEST, "invalid photo id"),
    };

    let bytes = match decode_image_payload(&request.image) {
        Ok(bytes) => bytes,
        Err(_) => return ApiError::response(StatusCode::BAD_REQUEST, "invalid base64 payload"),
    };

    match state.store.insert(id, bytes) {
        Ok(()) => {
            state.metrics.set_held(state.store.len());
            let url = mint_link(&state.public_origin, id);
            (StatusCode::OK, Json(UploadResponse { image_url: url })).into_response()
        }
        Err(e) => {
            tracing::warn!(%id, error = %e, "Upload rejected");
            ApiError::response(StatusCode::CONFLICT, "photo id already present")
        }
    }
}

/// Handler for `GET /photos/:id`: resolves a scanned link to the photo.
async fn fetch_photo(State(state): State<DeliveryState>, Path(id): Path<String>) -> Response {
    let id: PhotoId = match id.parse() {
        Ok(id) => id,
        Err(_) => return ApiError::response(StatusCode::BAD_REQUEST, "invalid photo id"),
    };

    match state.store.open_for_delivery(id) {
        Some((bytes, first)) => {
            if first {
                state.metrics.record_delivery();
            }
            let data_url = format!("data:image/jpeg;base64,{}", BASE64.encode(&bytes));
            (
                StatusCode::OK,
                Json(FetchResponse {
                    image_data_url: data_url,
                }),
            )
                .into_response()
        }
        None => ApiError::response(StatusCode::NOT_FOUND, "link invalid or already used"),
    }
}

/// Handler for `POST /photos/:id/consume`: the visitor confirmed the
/// download, so the photo is removed for good.
async fn consume_photo(State(state): State<DeliveryState>, Path(id): Path<String>) -> Response {
    let id: PhotoId = match id.parse() {
        Ok(id) => id,
        Err(_) => return ApiError::response(StatusCode::BAD_REQUEST, "invalid photo id"),
    };

    if state.store.delete(id) {
        state.metrics.record_consumption();
        state.metrics.set_held(state.store.len());
        StatusCode::NO_CONTENT.into_response()
    } else {
        ApiError::response(StatusCode::GONE, "photo already consumed or unknown")
    }
}

/// Handler for the `/health` endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Handler for the `/metrics` endpoint.
async fn metrics_handler(State(state): State<DeliveryState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

/// Decodes a base64 image payload, tolerating a `data:` URL prefix.
fn decode_image_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = match payload.find("base64,") {
        Some(index) => &payload[index + "base64,".len()..],
        None => payload,
    };
    BASE64.decode(encoded.trim())
}
