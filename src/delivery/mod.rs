//! QR-mediated photo delivery.
//!
//! Bridges a kiosk-local photo to a remote viewer: mint a download URL
//! embedding the photo id, render it as a scannable code, serve the
//! bytes over HTTP, and enforce exactly-one-successful-delivery by
//! deleting on the visitor's explicit consume action.

mod client;
mod link;
mod server;

pub use client::{UploadClient, UploadError};
pub use link::{mint_link, scannable_code, scannable_code_text, LinkError};
pub use server::{
    ApiError, DeliveryServer, DeliveryServerConfig, DeliveryState, FetchResponse, ServerError,
    UploadRequest, UploadResponse,
};
