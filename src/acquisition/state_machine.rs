//! Acquisition state machine.
//!
//! An acquisition session opens the spectrophotometer port, then records
//! readings until it is told to stop or the port goes away:
//!
//! ```text
//!      START
//!        |
//!        v
//!   .---------.  port open   .--------.
//!   | Connect |------------->| Record |
//!   '---------'              '--------'
//!        |                        |
//!        | open failed            | max readings / port error
//!        v                        v
//!   .-------------------------------.
//!   |             Done              |
//!   '-------------------------------'
//!                   |
//!                   v
//!                  END
//! ```

use super::events::*;
use super::states::*;
use crate::settings::Settings;

// =============================================================================
// Public Interface
// =============================================================================

/// The acquisition state machine. Get an instance with [`factory`] and run it
/// with [`Acquisition::run`].
pub struct Acquisition {
    sm: AcquisitionStates,
}
impl Acquisition {
    /// Run the event loop until the `Done` state asks to exit. Returns **`0`**
    /// when the session ended normally and **`1`** when it ended on an error.
    pub fn run(&mut self) -> i8 {
        loop {
            self.sm = self.sm.step();
            if let AcquisitionStates::Done(sm) = &self.sm {
                if sm.state.should_exit {
                    return if sm.state.with_errors { 1 } else { 0 };
                }
            }
        }
    }
}

/// Create an acquisition state machine, starting in the `Connect` state.
pub fn factory(settings: Settings) -> Acquisition {
    Acquisition {
        sm: AcquisitionStates::Connect(AcquisitionSM::new(settings)),
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// The settings shared by all states, plus the current state.
#[derive(Debug)]
struct AcquisitionSM<S: Runnable> {
    settings: Settings,
    state: S,
}
impl<S: Runnable> AcquisitionSM<S> {
    fn run(&mut self) -> Event {
        self.state.run(&self.settings)
    }
}
impl AcquisitionSM<ConnectState> {
    fn new(settings: Settings) -> Self {
        AcquisitionSM {
            settings,
            state: ConnectState {},
        }
    }
}

enum AcquisitionStates {
    Connect(AcquisitionSM<ConnectState>),
    Record(AcquisitionSM<RecordState>),
    Done(AcquisitionSM<DoneState>),
}
impl AcquisitionStates {
    /// Run the current state and map the event it returns to the next state.
    /// Only the transitions with a `From` implementation below exist.
    fn step(&mut self) -> Self {
        match self {
            AcquisitionStates::Connect(sm) => {
                let event = sm.run();
                match event {
                    Event::StartRecording(ev) => AcquisitionStates::Record(ev.into()),
                    Event::Stop(ev) => AcquisitionStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            AcquisitionStates::Record(sm) => {
                let event = sm.run();
                match event {
                    Event::Stop(ev) => AcquisitionStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            AcquisitionStates::Done(sm) => {
                let event = sm.run();
                match event {
                    Event::Exit(ev) => AcquisitionStates::Done(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// State from Event transitions
// -----------------------------------------------------------------------------

impl From<StartRecordingEvent> for AcquisitionSM<RecordState> {
    fn from(event: StartRecordingEvent) -> AcquisitionSM<RecordState> {
        AcquisitionSM {
            settings: event.settings,
            state: RecordState {
                port: Some(event.port),
            },
        }
    }
}

impl From<StopEvent> for AcquisitionSM<DoneState> {
    fn from(event: StopEvent) -> AcquisitionSM<DoneState> {
        AcquisitionSM {
            settings: event.settings,
            state: DoneState {
                with_errors: event.with_errors,
                should_exit: false,
            },
        }
    }
}

impl From<ExitEvent> for AcquisitionSM<DoneState> {
    fn from(event: ExitEvent) -> AcquisitionSM<DoneState> {
        AcquisitionSM {
            settings: event.settings,
            state: DoneState {
                with_errors: event.with_errors,
                should_exit: true,
            },
        }
    }
}
