//! Events of the supervisor state machine.
//!
//! This module is private to [`supervisor`](crate::supervisor), which provides
//! the public interface of the state machine.
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use crate::settings::Settings;

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// Fired when a device path is known and we need to hold on until it shows up
/// on the system: at startup when `--tty` was given, or after the device went
/// away during acquisition.
#[derive(Debug)]
pub(crate) struct WaitForPortEvent {
    pub settings: Settings,
}

/// Fired when the user has to pick the port: no path was given at startup,
/// waiting was canceled with `ESC`, or the previous selection was canceled to
/// refresh the list of ports.
#[derive(Debug)]
pub(crate) struct SelectPortEvent {
    pub settings: Settings,
}

/// Fired when the port exists on the system, from the `WaitForPort` or the
/// `SelectPort` state. `settings.path` holds the port to use.
#[derive(Debug)]
pub(crate) struct PortReadyEvent {
    pub settings: Settings,
}

/// Fired by the `Acquire` state when the acquisition session ended on a port
/// error, usually because the USB adapter was unplugged.
#[derive(Debug)]
pub(crate) struct PortLostEvent {
    pub settings: Settings,
}

/// Fired when the acquisition session completed normally.
#[derive(Debug)]
pub(crate) struct DoneEvent {
    pub settings: Settings,
    pub with_errors: bool,
}

/// Last event of the supervisor; ends its event loop with an exit status.
#[derive(Debug)]
pub(crate) struct ExitEvent {
    pub settings: Settings,
    pub with_errors: bool,
}

/// Events that can be triggered within the supervisor state machine.
#[derive(Debug)]
pub(crate) enum Event {
    WaitForPort(WaitForPortEvent),
    SelectPort(SelectPortEvent),
    PortReady(PortReadyEvent),
    PortLost(PortLostEvent),
    Done(DoneEvent),
    Exit(ExitEvent),
}
