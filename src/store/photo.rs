//! Photo record and lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque photo identifier: a v4 UUID.
///
/// The identifier's unpredictability is the download link's only access
/// control, so it must come from a real 128-bit random source and never
/// be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(Uuid);

impl PhotoId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for PhotoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a stored photo.
///
/// Transitions are strictly monotonic: `Captured` → `Delivered` on the
/// first remote fetch, and deletion is terminal. A deleted photo is
/// removed from the store entirely, so "deleted" is observable only as
/// the id resolving to nothing, exactly like an id that never existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoState {
    /// Stored, not yet fetched by a remote viewer.
    Captured,
    /// Fetched at least once for remote delivery; awaiting consumption.
    Delivered,
}

/// A captured still and its lifecycle state.
#[derive(Debug, Clone)]
pub struct Photo {
    pub(crate) bytes: Vec<u8>,
    pub(crate) state: PhotoState,
    pub(crate) captured_at: DateTime<Utc>,
}

impl Photo {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            state: PhotoState::Captured,
            captured_at: Utc::now(),
        }
    }

    /// Encoded image bytes. Immutable once created.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PhotoState {
        self.state
    }

    /// When the photo was stored.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_through_display() {
        let id = PhotoId::generate();
        let parsed: PhotoId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_bad_id_rejected() {
        assert!("not-a-uuid".parse::<PhotoId>().is_err());
    }

    #[test]
    fn test_new_photo_starts_captured() {
        let photo = Photo::new(vec![1, 2, 3]);
        assert_eq!(photo.state(), PhotoState::Captured);
        assert_eq!(photo.bytes(), &[1, 2, 3]);
    }
}
