//! Visitor session and capture state machine.
//!
//! [`CaptureMachine`] holds the pure countdown/capture/review phase
//! logic; [`KioskSession`] wires it to a camera, the still encoder, and
//! the shared photo store for one visitor interaction.

mod kiosk;
mod machine;

pub use kiosk::{CaptureError, ContactRecord, KioskSession, TickOutcome};
pub use machine::{CaptureMachine, CapturePhase, MachineError, TickStep};
