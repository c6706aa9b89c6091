//! Countdown/capture phase logic.
//!
//! The machine is deliberately free of timers and I/O: callers drive it
//! with one `tick()` per one-second interval, which makes the
//! countdown → capture sequence deterministic and directly testable.

use crate::store::PhotoId;
use thiserror::Error;

/// Errors from invalid phase transitions.
#[derive(Debug, Error)]
pub enum MachineError {
    /// `start` was called while a capture was already in flight.
    #[error("capture already in progress")]
    AlreadyActive,
    /// `photo_ready` was called outside the `Capturing` phase.
    #[error("no capture in flight")]
    NotCapturing,
    /// `retake` or `finish` was called outside the `Reviewing` phase.
    #[error("no photo under review")]
    NotReviewing,
}

/// Phase of the capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Waiting for the visitor to press the shutter.
    Idle,
    /// Counting down; the value is the number shown on screen.
    Countdown(u32),
    /// The final tick fired; frame grab and encoding are underway.
    Capturing,
    /// A photo exists and is on screen for review.
    Reviewing(PhotoId),
}

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStep {
    /// Countdown decremented to the contained value.
    Counting(u32),
    /// Countdown reached the end; capture must happen now, exactly once.
    Fire,
}

/// Drives the countdown → capture → review cycle.
#[derive(Debug, Default)]
pub struct CaptureMachine {
    phase: CapturePhase,
}

impl Default for CapturePhase {
    fn default() -> Self {
        CapturePhase::Idle
    }
}

impl CaptureMachine {
    /// Creates a machine in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current phase.
    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// Begins a countdown from `countdown` seconds.
    ///
    /// Valid only from `Idle`; at most one capture may be in flight.
    pub fn start(&mut self, countdown: u32) -> Result<(), MachineError> {
        match self.phase {
            CapturePhase::Idle => {
                self.phase = CapturePhase::Countdown(countdown.max(1));
                Ok(())
            }
            _ => Err(MachineError::AlreadyActive),
        }
    }

    /// Advances the countdown by one second.
    ///
    /// Starting from `Countdown(n)`, exactly `n` ticks occur before
    /// `TickStep::Fire`: n-1 `Counting` steps and one final `Fire`.
    /// Returns `None` outside a countdown: a timer that raced a
    /// cancellation is a no-op, not an error.
    pub fn tick(&mut self) -> Option<TickStep> {
        match self.phase {
            CapturePhase::Countdown(1) => {
                self.phase = CapturePhase::Capturing;
                Some(TickStep::Fire)
            }
            CapturePhase::Countdown(n) => {
                self.phase = CapturePhase::Countdown(n - 1);
                Some(TickStep::Counting(n - 1))
            }
            _ => None,
        }
    }

    /// Records the stored photo and moves to `Reviewing`.
    pub fn photo_ready(&mut self, id: PhotoId) -> Result<(), MachineError> {
        match self.phase {
            CapturePhase::Capturing => {
                self.phase = CapturePhase::Reviewing(id);
                Ok(())
            }
            _ => Err(MachineError::NotCapturing),
        }
    }

    /// Aborts a failed capture attempt, returning to `Idle`.
    ///
    /// The visitor may retry through `start` again.
    pub fn capture_failed(&mut self) {
        if self.phase == CapturePhase::Capturing {
            self.phase = CapturePhase::Idle;
        }
    }

    /// Leaves `Reviewing` to retake: returns the id to be deleted.
    pub fn retake(&mut self) -> Result<PhotoId, MachineError> {
        match self.phase {
            CapturePhase::Reviewing(id) => {
                self.phase = CapturePhase::Idle;
                Ok(id)
            }
            _ => Err(MachineError::NotReviewing),
        }
    }

    /// Leaves `Reviewing` with the photo kept for delivery.
    pub fn finish(&mut self) -> Result<PhotoId, MachineError> {
        match self.phase {
            CapturePhase::Reviewing(id) => {
                self.phase = CapturePhase::Idle;
                Ok(id)
            }
            _ => Err(MachineError::NotReviewing),
        }
    }

    /// External cancellation (idle timeout, navigate-away).
    ///
    /// Stops any in-flight countdown; no photo is produced. A photo
    /// already under review is left in the store, since its QR code may
    /// already be in a visitor's hands.
    pub fn cancel(&mut self) {
        self.phase = CapturePhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tick_count_before_fire() {
        let mut machine = CaptureMachine::new();
        machine.start(5).unwrap();

        let mut ticks = 0;
        loop {
            ticks += 1;
            match machine.tick() {
                Some(TickStep::Counting(_)) => continue,
                Some(TickStep::Fire) => break,
                None => panic!("countdown ended without firing"),
            }
        }
        assert_eq!(ticks, 5);
        assert_eq!(machine.phase(), CapturePhase::Capturing);
    }

    #[test]
    fn test_counting_values_descend() {
        let mut machine = CaptureMachine::new();
        machine.start(3).unwrap();

        assert_eq!(machine.tick(), Some(TickStep::Counting(2)));
        assert_eq!(machine.tick(), Some(TickStep::Counting(1)));
        assert_eq!(machine.tick(), Some(TickStep::Fire));
    }

    #[test]
    fn test_second_start_rejected() {
        let mut machine = CaptureMachine::new();
        machine.start(5).unwrap();

        assert!(matches!(machine.start(5), Err(MachineError::AlreadyActive)));

        machine.tick();
        assert!(matches!(machine.start(5), Err(MachineError::AlreadyActive)));
    }

    #[test]
    fn test_start_rejected_while_reviewing() {
        let mut machine = CaptureMachine::new();
        machine.start(1).unwrap();
        assert_eq!(machine.tick(), Some(TickStep::Fire));
        machine.photo_ready(PhotoId::generate()).unwrap();

        assert!(matches!(machine.start(5), Err(MachineError::AlreadyActive)));
    }

    #[test]
    fn test_cancel_stops_countdown() {
        let mut machine = CaptureMachine::new();
        machine.start(5).unwrap();
        machine.tick();

        machine.cancel();
        assert_eq!(machine.phase(), CapturePhase::Idle);
        // Racing timer fires once more: quietly ignored.
        assert_eq!(machine.tick(), None);
    }

    #[test]
    fn test_retake_returns_id_and_idles() {
        let mut machine = CaptureMachine::new();
        let id = PhotoId::generate();

        machine.start(1).unwrap();
        machine.tick();
        machine.photo_ready(id).unwrap();

        assert_eq!(machine.retake().unwrap(), id);
        assert_eq!(machine.phase(), CapturePhase::Idle);
    }

    #[test]
    fn test_retake_requires_reviewing() {
        let mut machine = CaptureMachine::new();
        assert!(matches!(machine.retake(), Err(MachineError::NotReviewing)));

        machine.start(5).unwrap();
        assert!(matches!(machine.retake(), Err(MachineError::NotReviewing)));
    }

    #[test]
    fn test_capture_failure_returns_to_idle() {
        let mut machine = CaptureMachine::new();
        machine.start(1).unwrap();
        machine.tick();
        assert_eq!(machine.phase(), CapturePhase::Capturing);

        machine.capture_failed();
        assert_eq!(machine.phase(), CapturePhase::Idle);
        // Retry is allowed.
        assert!(machine.start(5).is_ok());
    }

    #[test]
    fn test_photo_ready_requires_capturing() {
        let mut machine = CaptureMachine::new();
        assert!(matches!(
            machine.photo_ready(PhotoId::generate()),
            Err(MachineError::NotCapturing)
        ));
    }
}
