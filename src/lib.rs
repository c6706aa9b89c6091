//! Photo Kiosk Core Library
//!
//! The capture-to-delivery pipeline of a walk-up photo kiosk: a visitor
//! triggers a countdown, one still frame is captured from the live
//! camera feed, and the photo is handed off through a scannable QR code
//! that resolves to a one-time download.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! capture → encode → store → delivery
//!              ↑                 ↓
//!           session        remote viewer
//!        (countdown)     (fetch + consume)
//! ```
//!
//! # Design Principles
//!
//! - **One delivery per photo**: consumption deletes the record; a used
//!   link is indistinguishable from one that never existed
//! - **Ephemeral by default**: the store is in-memory and volatile;
//!   kiosk sessions are short-lived and restarts lose nothing of value
//! - **Explicit ownership**: the store is constructed and injected, one
//!   `Arc` shared by the kiosk writer and the delivery server
//! - **Independent side effects**: local storage and remote upload are
//!   separately fallible; an upload failure never loses the local photo
//!
//! # Example
//!
//! ```no_run
//! use photo_kiosk::{
//!     capture::{CaptureConfig, MockCamera},
//!     delivery::mint_link,
//!     encode::StillEncoder,
//!     session::{ContactRecord, KioskSession, TickOutcome},
//!     store::PhotoStore,
//! };
//! use std::sync::Arc;
//!
//! let store = Arc::new(PhotoStore::new());
//! let contact = ContactRecord {
//!     name: "Ada".to_string(),
//!     phone: "5550001234".to_string(),
//!     email: "ada@example.com".to_string(),
//! };
//!
//! let mut session = KioskSession::new(
//!     MockCamera::new(),
//!     StillEncoder::default(),
//!     store.clone(),
//!     5,
//!     contact,
//! );
//! session.open_camera(&CaptureConfig::default()).unwrap();
//! session.start().unwrap();
//!
//! // One tick per second; the final tick captures.
//! loop {
//!     if let TickOutcome::Captured(id) = session.tick().unwrap() {
//!         println!("{}", mint_link("http://localhost:8080", id));
//!         break;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod delivery;
pub mod encode;
pub mod metrics;
pub mod session;
pub mod store;

// Re-export commonly used types at crate root
pub use capture::{Camera, CaptureConfig, FileConfig, Frame, MockCamera};
pub use delivery::{mint_link, scannable_code, DeliveryServer, DeliveryState, UploadClient};
pub use encode::{EncodedStill, Orientation, StillEncoder};
pub use metrics::KioskMetrics;
pub use session::{CaptureMachine, CapturePhase, ContactRecord, KioskSession, TickOutcome};
pub use store::{Photo, PhotoId, PhotoState, PhotoStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
