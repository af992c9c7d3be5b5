//! Events of the acquisition state machine.
//!
//! This module is private to [`acquisition`](crate::acquisition), which
//! provides the public interface of the state machine.
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use std::fmt;

use serialport::SerialPort;

use crate::Settings;

// =============================================================================
// Crate-Public Interface
// =============================================================================

// StartRecordingEvent =========================================================

/// Fired by the `Connect` state once the spectrophotometer port is open and
/// configured. Moves the port into the `Record` state.
pub(crate) struct StartRecordingEvent {
    pub settings: Settings,
    pub port: Box<dyn SerialPort>,
}
impl fmt::Debug for StartRecordingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_fmt_port!("StartRecordingEvent", self.port, f).finish()
    }
}

// StopEvent ===================================================================

/// Fired when recording ends, either because the requested number of readings
/// was reached or because the port failed. Triggers the transition to the
/// `Done` state.
#[derive(Debug)]
pub(crate) struct StopEvent {
    pub settings: Settings,
    /// `true` when the session ended on a port error.
    pub with_errors: bool,
}

// ExitEvent ===================================================================

/// Last event of the state machine. Ends the event loop, which hands back a
/// status to its caller.
#[derive(Debug)]
pub(crate) struct ExitEvent {
    pub settings: Settings,
    pub with_errors: bool,
}

// Events enum =================================================================

/// Events that can be triggered within the acquisition state machine.
#[derive(Debug)]
pub(crate) enum Event {
    StartRecording(StartRecordingEvent),
    Stop(StopEvent),
    Exit(ExitEvent),
}
