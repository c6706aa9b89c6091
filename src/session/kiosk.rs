//! Kiosk session: one visitor from shutter press to delivery handoff.

use super::machine::{CaptureMachine, CapturePhase, MachineError, TickStep};
use crate::capture::{Camera, CameraError, CaptureConfig};
use crate::encode::{EncodeError, Orientation, StillEncoder};
use crate::store::{PhotoId, PhotoStore};
use std::sync::Arc;
use thiserror::Error;

/// Contact details collected by the form screen.
///
/// Opaque to the pipeline: the form collaborator validates these before
/// the session is created, and nothing here re-checks them.
#[derive(Debug, Clone)]
pub struct ContactRecord {
    /// Visitor's full name.
    pub name: String,
    /// Visitor's phone number.
    pub phone: String,
    /// Visitor's email address.
    pub email: String,
}

/// Errors surfaced by the kiosk session.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The camera stream could not be acquired or failed mid-capture.
    /// Surfaced as a user-visible notice; not retried automatically.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(#[from] CameraError),
    /// Encoding rejected the frame; the attempt is aborted and the
    /// visitor may start again.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// An operation was called in the wrong phase.
    #[error(transparent)]
    Phase(#[from] MachineError),
}

/// What one countdown tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No countdown is active; the tick was ignored.
    Quiet,
    /// Countdown now shows this value.
    Counting(u32),
    /// The capture fired; the photo is stored under this id and the
    /// session is now reviewing it.
    Captured(PhotoId),
}

/// Owns the live camera, the countdown, and the current photo id for
/// one visitor interaction.
///
/// Created after the contact form is submitted; destroyed on
/// return-to-idle. At most one photo exists per session at a time, which
/// is what keeps capture and retake from ever interleaving on one id.
pub struct KioskSession<C: Camera> {
    camera: C,
    encoder: StillEncoder,
    store: Arc<PhotoStore>,
    machine: CaptureMachine,
    countdown_start: u32,
    orientation: Orientation,
    contact: ContactRecord,
}

impl<C: Camera> KioskSession<C> {
    /// Creates a session over an already-constructed (not necessarily
    /// open) camera.
    pub fn new(
        camera: C,
        encoder: StillEncoder,
        store: Arc<PhotoStore>,
        countdown_start: u32,
        contact: ContactRecord,
    ) -> Self {
        Self {
            camera,
            encoder,
            store,
            machine: CaptureMachine::new(),
            countdown_start,
            // Kiosk displays are mounted portrait; the UI collaborator
            // can override per device.
            orientation: Orientation::Portrait,
            contact,
        }
    }

    /// Opens the camera stream.
    pub fn open_camera(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        self.camera.open(config)?;
        Ok(())
    }

    /// Sets the device orientation used for the next capture.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Starts the countdown.
    ///
    /// Fails with [`CaptureError::CameraUnavailable`], staying in
    /// `Idle`, when the stream is not open. Fails with a phase error if
    /// a capture is already in flight.
    pub fn start(&mut self) -> Result<u32, CaptureError> {
        if !self.camera.is_open() {
            return Err(CaptureError::CameraUnavailable(CameraError::NotInitialized));
        }
        self.machine.start(self.countdown_start)?;
        tracing::info!(countdown = self.countdown_start, "Countdown started");
        Ok(self.countdown_start)
    }

    /// Advances the countdown by one second.
    ///
    /// On the final tick this grabs a frame, encodes it, and stores the
    /// still in one step, so capture happens exactly once per countdown.
    /// Camera or encoding failures abort the attempt and return the
    /// session to `Idle`.
    pub fn tick(&mut self) -> Result<TickOutcome, CaptureError> {
        match self.machine.tick() {
            None => Ok(TickOutcome::Quiet),
            Some(TickStep::Counting(n)) => {
                tracing::debug!(remaining = n, "Countdown tick");
                Ok(TickOutcome::Counting(n))
            }
            Some(TickStep::Fire) => self.capture_now(),
        }
    }

    fn capture_now(&mut self) -> Result<TickOutcome, CaptureError> {
        let frame = match self.camera.capture() {
            Ok(frame) => frame,
            Err(e) => {
                self.machine.capture_failed();
                return Err(e.into());
            }
        };

        let still = match self.encoder.encode(&frame, self.orientation) {
            Ok(still) => still,
            Err(e) => {
                self.machine.capture_failed();
                return Err(e.into());
            }
        };

        let id = self.store.put(still.data);
        self.machine.photo_ready(id)?;
        tracing::info!(%id, width = still.width, height = still.height, "Photo captured");
        Ok(TickOutcome::Captured(id))
    }

    /// Discards the photo under review and returns to `Idle`.
    pub fn retake(&mut self) -> Result<(), CaptureError> {
        let id = self.machine.retake()?;
        self.store.delete(id);
        tracing::info!(%id, "Retake: photo discarded");
        Ok(())
    }

    /// Ends the review keeping the photo stored for delivery; returns
    /// its id.
    pub fn finish(&mut self) -> Result<PhotoId, CaptureError> {
        let id = self.machine.finish()?;
        Ok(id)
    }

    /// External cancellation (idle timeout): stops any countdown and
    /// releases the camera stream. No photo is produced; a photo already
    /// under review stays stored, since its QR code may be in use.
    pub fn cancel(&mut self) {
        self.machine.cancel();
        self.camera.close();
        tracing::info!("Session cancelled");
    }

    /// Current capture phase.
    pub fn phase(&self) -> CapturePhase {
        self.machine.phase()
    }

    /// Id of the photo under review, if any.
    pub fn photo_id(&self) -> Option<PhotoId> {
        match self.machine.phase() {
            CapturePhase::Reviewing(id) => Some(id),
            _ => None,
        }
    }

    /// The visitor's contact record.
    pub fn contact(&self) -> &ContactRecord {
        &self.contact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Frame, MockCamera};

    fn test_contact() -> ContactRecord {
        ContactRecord {
            name: "Test Visitor".to_string(),
            phone: "5550001234".to_string(),
            email: "visitor@example.com".to_string(),
        }
    }

    fn open_session(store: Arc<PhotoStore>) -> KioskSession<MockCamera> {
        let mut session = KioskSession::new(
            MockCamera::new(),
            StillEncoder::default(),
            store,
            5,
            test_contact(),
        );
        session
            .open_camera(&CaptureConfig::with_dimensions(64, 32))
            .unwrap();
        session
    }

    /// Camera whose stream never produces usable dimensions.
    struct NotReadyCamera {
        open: bool,
    }

    impl Camera for NotReadyCamera {
        fn open(&mut self, _config: &CaptureConfig) -> Result<(), CameraError> {
            self.open = true;
            Ok(())
        }
        fn capture(&mut self) -> Result<Frame, CameraError> {
            Ok(Frame::new(Vec::new(), 0, 0, 1))
        }
        fn is_open(&self) -> bool {
            self.open
        }
        fn close(&mut self) {
            self.open = false;
        }
    }

    #[test]
    fn test_full_countdown_produces_one_photo() {
        let store = Arc::new(PhotoStore::new());
        let mut session = open_session(store.clone());

        assert_eq!(session.start().unwrap(), 5);

        let mut captured = None;
        for _ in 0..5 {
            match session.tick().unwrap() {
                TickOutcome::Counting(_) => {}
                TickOutcome::Captured(id) => captured = Some(id),
                TickOutcome::Quiet => panic!("countdown went quiet early"),
            }
        }

        let id = captured.expect("capture did not fire on the final tick");
        assert_eq!(store.len(), 1);
        assert!(store.get(id).is_some());
        assert_eq!(session.photo_id(), Some(id));
    }

    #[test]
    fn test_start_without_camera_stays_idle() {
        let store = Arc::new(PhotoStore::new());
        let mut session = KioskSession::new(
            MockCamera::new(),
            StillEncoder::default(),
            store,
            5,
            test_contact(),
        );

        assert!(matches!(
            session.start(),
            Err(CaptureError::CameraUnavailable(_))
        ));
        assert_eq!(session.phase(), CapturePhase::Idle);
    }

    #[test]
    fn test_double_start_rejected_one_photo_total() {
        let store = Arc::new(PhotoStore::new());
        let mut session = open_session(store.clone());

        session.start().unwrap();
        assert!(matches!(session.start(), Err(CaptureError::Phase(_))));

        for _ in 0..5 {
            session.tick().unwrap();
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_cancel_before_final_tick_captures_nothing() {
        let store = Arc::new(PhotoStore::new());
        let mut session = open_session(store.clone());

        session.start().unwrap();
        for _ in 0..4 {
            session.tick().unwrap();
        }
        session.cancel();

        // The racing timer tick after cancellation is quiet.
        assert_eq!(session.tick().unwrap(), TickOutcome::Quiet);
        assert!(store.is_empty());
        assert_eq!(session.phase(), CapturePhase::Idle);
    }

    #[test]
    fn test_retake_deletes_and_fresh_start_mints_new_id() {
        let store = Arc::new(PhotoStore::new());
        let mut session = open_session(store.clone());

        session.start().unwrap();
        let first = loop {
            if let TickOutcome::Captured(id) = session.tick().unwrap() {
                break id;
            }
        };

        session.retake().unwrap();
        assert!(store.is_empty());
        assert_eq!(session.phase(), CapturePhase::Idle);

        session.start().unwrap();
        let second = loop {
            if let TickOutcome::Captured(id) = session.tick().unwrap() {
                break id;
            }
        };

        assert_ne!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_not_ready_frame_aborts_attempt_only() {
        let store = Arc::new(PhotoStore::new());
        let mut session = KioskSession::new(
            NotReadyCamera { open: false },
            StillEncoder::default(),
            store.clone(),
            1,
            test_contact(),
        );
        session
            .open_camera(&CaptureConfig::with_dimensions(64, 32))
            .unwrap();

        session.start().unwrap();
        assert!(matches!(
            session.tick(),
            Err(CaptureError::Encode(EncodeError::FrameNotReady))
        ));

        // No photo, back to Idle, retry allowed.
        assert!(store.is_empty());
        assert_eq!(session.phase(), CapturePhase::Idle);
        assert!(session.start().is_ok());
    }

    #[test]
    fn test_finish_keeps_photo_for_delivery() {
        let store = Arc::new(PhotoStore::new());
        let mut session = open_session(store.clone());

        session.start().unwrap();
        let id = loop {
            if let TickOutcome::Captured(id) = session.tick().unwrap() {
                break id;
            }
        };

        assert_eq!(session.finish().unwrap(), id);
        assert_eq!(session.phase(), CapturePhase::Idle);
        assert!(store.get(id).is_some());
    }
}
