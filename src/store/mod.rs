//! Ephemeral, at-most-one-delivery photo storage.
//!
//! The store is the single owner of captured image bytes for their whole
//! lifetime. It is explicitly constructed and injected, one `Arc` shared
//! by the kiosk session (writer) and the delivery server (reader/deleter),
//! never a module-level singleton.

mod photo;
#[allow(clippy::module_inception)]
mod store;

pub use photo::{Photo, PhotoId, PhotoState};
pub use store::{PhotoStore, StoreError};
