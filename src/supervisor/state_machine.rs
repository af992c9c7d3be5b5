//! Supervision of the spectrophotometer serial port.
//!
//! The spectrophotometer is usually attached through a USB serial adapter that
//! can be unplugged at any time, and whose device name may change when it is
//! plugged back. The supervisor keeps `spec20log` running across these events:
//! it waits for the configured port or lets the user pick one, runs an
//! acquisition session on it, and goes back to waiting when the port is lost.
//!
//! ```text
//!                            START
//!                              |
//!                              v
//!                          .-------.
//!                          | Init  |
//!                          '-------'
//!                              |
//!                    no  .----------.  yes
//!                  .----( port path? )----.
//!      .-----.     |     '----------'     |
//!      |     v     v                      v
//!      |    .------------.  ESC    .-------------.
//!      '----| SelectPort |<--------| WaitForPort |<---.
//!           '------------'         '-------------'    |
//!                 |                       |           |
//!               port                    port          |
//!               ready                   ready         |
//!                 |     .-----------.     |         port
//!                 '---->|  Acquire  |<----'         lost
//!                       '-----------'                 |
//!                         |       '-------------------'
//!                         v
//!                     .------.
//!                     | Done |
//!                     '------'
//!                         |
//!                         v
//!                        END
//! ```

use super::events::*;
use super::states::*;
use crate::settings::Settings;

// =============================================================================
// Public Interface
// =============================================================================

/// Something that runs to completion and returns an exit status.
pub trait Supervisor {
    /// Returns **`0`** on normal completion, non-zero otherwise.
    fn run(&mut self) -> i8;
}

/// Owns the supervisor state machine and its event loop.
pub struct PortSupervisor {
    sm: SupervisorStates,
}
impl Supervisor for PortSupervisor {
    fn run(&mut self) -> i8 {
        loop {
            self.sm = self.sm.step();
            if let SupervisorStates::Done(sm) = &self.sm {
                if sm.state.should_exit {
                    return if sm.state.with_errors { 1 } else { 0 };
                }
            }
        }
    }
}

/// Create the supervisor for the given settings, starting in the `Init`
/// state.
pub fn supervisor(settings: Settings) -> PortSupervisor {
    PortSupervisor {
        sm: SupervisorStates::Init(SupervisorSM::new(settings)),
    }
}

// =============================================================================
// Private stuff
// =============================================================================

#[derive(Debug)]
struct SupervisorSM<S: Runnable> {
    settings: Settings,
    state: S,
}
impl<S: Runnable> SupervisorSM<S> {
    fn run(&mut self) -> Event {
        self.state.run(&self.settings)
    }
}
impl SupervisorSM<InitState> {
    fn new(settings: Settings) -> Self {
        SupervisorSM {
            settings,
            state: InitState {},
        }
    }
}

enum SupervisorStates {
    Init(SupervisorSM<InitState>),
    WaitForPort(SupervisorSM<WaitForPortState>),
    SelectPort(SupervisorSM<SelectPortState>),
    Acquire(SupervisorSM<AcquireState>),
    Done(SupervisorSM<DoneState>),
}
impl SupervisorStates {
    fn step(&mut self) -> Self {
        match self {
            SupervisorStates::Init(sm) => {
                let event = sm.run();
                match event {
                    Event::WaitForPort(ev) => SupervisorStates::WaitForPort(ev.into()),
                    Event::SelectPort(ev) => SupervisorStates::SelectPort(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            SupervisorStates::WaitForPort(sm) => {
                let event = sm.run();
                match event {
                    Event::PortReady(ev) => SupervisorStates::Acquire(ev.into()),
                    Event::SelectPort(ev) => SupervisorStates::SelectPort(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            SupervisorStates::SelectPort(sm) => {
                let event = sm.run();
                match event {
                    Event::PortReady(ev) => SupervisorStates::Acquire(ev.into()),
                    Event::SelectPort(ev) => SupervisorStates::SelectPort(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            SupervisorStates::Acquire(sm) => {
                let event = sm.run();
                match event {
                    Event::Done(ev) => SupervisorStates::Done(ev.into()),
                    Event::PortLost(ev) => SupervisorStates::WaitForPort(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            SupervisorStates::Done(sm) => {
                let event = sm.run();
                match event {
                    Event::Exit(ev) => SupervisorStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// State from Event transitions
// -----------------------------------------------------------------------------

impl From<WaitForPortEvent> for SupervisorSM<WaitForPortState> {
    fn from(event: WaitForPortEvent) -> Self {
        SupervisorSM {
            settings: event.settings,
            state: WaitForPortState {},
        }
    }
}

impl From<PortLostEvent> for SupervisorSM<WaitForPortState> {
    fn from(event: PortLostEvent) -> Self {
        SupervisorSM {
            settings: event.settings,
            state: WaitForPortState {},
        }
    }
}

impl From<SelectPortEvent> for SupervisorSM<SelectPortState> {
    fn from(event: SelectPortEvent) -> Self {
        SupervisorSM {
            settings: event.settings,
            state: SelectPortState {},
        }
    }
}

impl From<PortReadyEvent> for SupervisorSM<AcquireState> {
    fn from(event: PortReadyEvent) -> Self {
        SupervisorSM {
            settings: event.settings,
            state: AcquireState {},
        }
    }
}

impl From<DoneEvent> for SupervisorSM<DoneState> {
    fn from(event: DoneEvent) -> Self {
        SupervisorSM {
            settings: event.settings,
            state: DoneState {
                with_errors: event.with_errors,
                should_exit: false,
            },
        }
    }
}

impl From<ExitEvent> for SupervisorSM<DoneState> {
    fn from(event: ExitEvent) -> Self {
        SupervisorSM {
            settings: event.settings,
            state: DoneState {
                with_errors: event.with_errors,
                should_exit: true,
            },
        }
    }
}
