//! Ephemeral keyed photo storage.
//!
//! One shared map, two roles: the kiosk session writes and retakes,
//! the delivery server reads and consumes. Storage is process-local
//! and volatile; a restart loses undelivered photos, which is
//! acceptable for short-lived kiosk sessions.

use super::photo::{Photo, PhotoId, PhotoState};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert targeted an id that is already present.
    #[error("photo id already present: {0}")]
    DuplicateId(PhotoId),
}

/// In-memory photo store shared between the kiosk and the delivery server.
///
/// All methods take `&self`; interior mutability lets one
/// `Arc<PhotoStore>` serve both roles.
#[derive(Debug, Default)]
pub struct PhotoStore {
    photos: Mutex<HashMap<PhotoId, Photo>>,
}

impl PhotoStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PhotoId, Photo>> {
        self.photos.lock().expect("photo store mutex poisoned")
    }

    /// Stores encoded bytes under a fresh identifier and returns it.
    ///
    /// Never overwrites: in the vanishingly unlikely event of a UUID
    /// collision with a live entry, another id is drawn.
    pub fn put(&self, bytes: Vec<u8>) -> PhotoId {
        let mut photos = self.lock();
        let mut id = PhotoId::generate();
        while photos.contains_key(&id) {
            id = PhotoId::generate();
        }
        let size = bytes.len();
        photos.insert(id, Photo::new(bytes));
        tracing::info!(%id, bytes = size, held = photos.len(), "Photo stored");
        id
    }

    /// Stores bytes under a caller-provided identifier.
    ///
    /// Used by the upload endpoint, where the kiosk already minted the id.
    /// Fails rather than overwrite an existing entry.
    pub fn insert(&self, id: PhotoId, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut photos = self.lock();
        if photos.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        photos.insert(id, Photo::new(bytes));
        tracing::info!(%id, held = photos.len(), "Photo stored under uploaded id");
        Ok(())
    }

    /// Read-only fetch for on-kiosk preview. Does not change state.
    pub fn get(&self, id: PhotoId) -> Option<Vec<u8>> {
        self.lock().get(&id).map(|photo| photo.bytes.clone())
    }

    /// Fetch for remote delivery resolution.
    ///
    /// The first successful call moves the photo `Captured` → `Delivered`
    /// and reports `true` in the second tuple slot; later calls still
    /// succeed. There is no reservation at fetch time, so concurrent
    /// viewers and transport-level retries are all served until the
    /// explicit consume step removes the record.
    pub fn open_for_delivery(&self, id: PhotoId) -> Option<(Vec<u8>, bool)> {
        let mut photos = self.lock();
        let photo = photos.get_mut(&id)?;
        let first = photo.state == PhotoState::Captured;
        if first {
            photo.state = PhotoState::Delivered;
            tracing::info!(%id, captured_at = %photo.captured_at, "Photo delivered");
        }
        Some((photo.bytes.clone(), first))
    }

    /// Removes a photo and releases its bytes.
    ///
    /// Idempotent: deleting an unknown or already-deleted id is a no-op.
    /// Returns whether an entry was actually removed. After this returns,
    /// the id permanently resolves to nothing.
    pub fn delete(&self, id: PhotoId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            tracing::info!(%id, "Photo deleted");
        }
        removed
    }

    /// Returns the lifecycle state of a stored photo, if present.
    pub fn state(&self, id: PhotoId) -> Option<PhotoState> {
        self.lock().get(&id).map(|photo| photo.state)
    }

    /// Returns a snapshot of the full record, for inspection.
    pub fn photo(&self, id: PhotoId) -> Option<Photo> {
        self.lock().get(&id).cloned()
    }

    /// Number of photos currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no photos are held.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_put_then_get() {
        let store = PhotoStore::new();
        let id = store.put(vec![1, 2, 3]);

        assert_eq!(store.get(id), Some(vec![1, 2, 3]));
        assert_eq!(store.state(id), Some(PhotoState::Captured));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_photo_snapshot() {
        let store = PhotoStore::new();
        let id = store.put(vec![1, 2, 3]);

        let photo = store.photo(id).unwrap();
        assert_eq!(photo.bytes(), &[1, 2, 3]);
        assert_eq!(photo.state(), PhotoState::Captured);
        assert!(photo.captured_at() <= chrono::Utc::now());
    }

    #[test]
    fn test_get_does_not_change_state() {
        let store = PhotoStore::new();
        let id = store.put(vec![7]);

        store.get(id);
        store.get(id);
        assert_eq!(store.state(id), Some(PhotoState::Captured));
    }

    #[test]
    fn test_delivery_transition_happens_once() {
        let store = PhotoStore::new();
        let id = store.put(vec![7]);

        assert_eq!(store.open_for_delivery(id), Some((vec![7], true)));
        assert_eq!(store.state(id), Some(PhotoState::Delivered));

        // Repeat fetches keep succeeding; the state does not move again.
        assert_eq!(store.open_for_delivery(id), Some((vec![7], false)));
        assert_eq!(store.state(id), Some(PhotoState::Delivered));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = PhotoStore::new();
        let id = store.put(vec![7]);

        assert!(store.delete(id));
        assert!(!store.delete(id));
        assert!(store.get(id).is_none());
        assert!(store.open_for_delivery(id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let store = PhotoStore::new();
        assert!(!store.delete(PhotoId::generate()));
    }

    #[test]
    fn test_insert_refuses_duplicate() {
        let store = PhotoStore::new();
        let id = store.put(vec![1]);

        assert!(matches!(
            store.insert(id, vec![2]),
            Err(StoreError::DuplicateId(_))
        ));
        // Original payload untouched.
        assert_eq!(store.get(id), Some(vec![1]));
    }

    #[test]
    fn test_insert_then_deliver() {
        let store = PhotoStore::new();
        let id = PhotoId::generate();

        store.insert(id, vec![9, 9]).unwrap();
        assert_eq!(store.open_for_delivery(id), Some((vec![9, 9], true)));
    }

    proptest! {
        #[test]
        fn prop_delete_is_permanent(payload in proptest::collection::vec(any::<u8>(), 0..64)) {
            let store = PhotoStore::new();
            let id = store.put(payload);

            prop_assert!(store.delete(id));
            prop_assert!(store.get(id).is_none());
            prop_assert!(store.open_for_delivery(id).is_none());
            prop_assert!(!store.delete(id));
            prop_assert!(store.get(id).is_none());
        }

        #[test]
        fn prop_put_never_reuses_live_ids(count in 1usize..32) {
            let store = PhotoStore::new();
            let ids: std::collections::HashSet<_> =
                (0..count).map(|i| store.put(vec![i as u8])).collect();

            prop_assert_eq!(ids.len(), count);
            prop_assert_eq!(store.len(), count);
        }
    }
}
