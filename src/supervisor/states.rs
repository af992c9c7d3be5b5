//! States of the supervisor state machine.
//!
//! This module is private to [`supervisor`](crate::supervisor), which provides
//! the public interface of the state machine.
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use log::info;

use super::events::*;
use crate::{acquisition, settings::Settings, utils};

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// Trait adding the ability for a state to be `run` after a transition into it.
pub(crate) trait Runnable {
    /// Do the work of the state, then request the next transition by
    /// returning the appropriate event.
    fn run(&mut self, settings: &Settings) -> Event;
}

// Init State ==================================================================

/// Initial state. Goes to `WaitForPort` when a device path was configured and
/// to `SelectPort` otherwise.
#[derive(Debug)]
pub(crate) struct InitState {}
impl Runnable for InitState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!("=> Init");
        let settings = settings.clone();
        if settings.path.is_some() {
            Event::WaitForPort(WaitForPortEvent { settings })
        } else {
            Event::SelectPort(SelectPortEvent { settings })
        }
    }
}

// WaitForPort State ===========================================================

/// Waits until the configured port exists. `ESC` gives up and lets the user
/// select another one.
#[derive(Debug)]
pub(crate) struct WaitForPortState {}
impl Runnable for WaitForPortState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!("=> WaitForPort");
        let settings = settings.clone();
        let canceled = match &settings.path {
            Some(path) => utils::wait_for_port(path),
            None => true,
        };
        if canceled {
            Event::SelectPort(SelectPortEvent { settings })
        } else {
            Event::PortReady(PortReadyEvent { settings })
        }
    }
}

// SelectPort State ============================================================

/// Lets the user pick a port among the connected ones. Canceling the
/// selection refreshes the list.
#[derive(Debug)]
pub(crate) struct SelectPortState {}
impl Runnable for SelectPortState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!("=> SelectPort");
        let mut settings = settings.clone();
        match utils::select_port() {
            Some(path) => {
                settings.path = Some(path);
                Event::PortReady(PortReadyEvent { settings })
            }
            None => Event::SelectPort(SelectPortEvent { settings }),
        }
    }
}

// Acquire State ===============================================================

/// Runs an acquisition session on the ready port.
#[derive(Debug)]
pub(crate) struct AcquireState {}
impl Runnable for AcquireState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!("=> Acquire");
        let settings = settings.clone();
        match acquisition::factory(settings.clone()).run() {
            0 => Event::Done(DoneEvent {
                settings,
                with_errors: false,
            }),
            // Wait for the device to come back.
            _ => Event::PortLost(PortLostEvent { settings }),
        }
    }
}

// Done State ==================================================================

#[derive(Debug, Copy, Clone)]
pub(crate) struct DoneState {
    pub with_errors: bool,
    pub should_exit: bool,
}
impl Runnable for DoneState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!(
            "=> Done with{}errors",
            if self.with_errors { " " } else { " no " }
        );
        Event::Exit(ExitEvent {
            settings: settings.clone(),
            with_errors: self.with_errors,
        })
    }
}
