//! `spec20log` reads a Spectronic 20 spectrophotometer over its RS-232 port
//! and publishes the readings to a cloud webhook, the way a small networked
//! data logger sitting next to the instrument would.
//!
//! The crate is made of three independent components, all advanced by a
//! cooperative polling loop and never blocking:
//!
//! * [`decoder::SerialReadingDecoder`] matches the incoming bytes against the
//!   fixed-width record grammar of the instrument, recovers from corrupted
//!   input by resynchronizing on the next record, and surfaces one
//!   [`decoder::Reading`] at a time.
//! * [`button::DebouncedButton`] turns a noisy push button line into a stable
//!   pressed/released state and one-shot push and release edges.
//! * [`webhook::Webhook`] formats key-value events as JSON and hands them to a
//!   [`webhook::Publisher`].
//!
//! The components reach the hardware through the traits in [`hal`], so they
//! run the same against a real serial port or against in-memory test doubles.
//!
//! On top of these, the `spec20log` binary runs two state machines in the
//! style used throughout the crate: states and transitions, where each
//! transition is triggered by a typed event and implemented as a `From`
//! conversion from the event into the next state. Only transitions with such
//! a conversion exist, so illegal ones are rejected at compile time.
//!
//! * The [`supervisor`](crate::supervisor) finds the serial port (waiting for
//!   it or letting the user select it) and restarts acquisition when the
//!   adapter is unplugged and plugged back.
//! * The acquisition state machine opens the port and runs the polling loop.

pub mod acquisition;
pub mod button;
pub mod decoder;
mod error;
pub mod hal;
mod settings;
mod supervisor;
mod utils;
pub mod webhook;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use settings::{Settings, SettingsBuilder};
pub use supervisor::{supervisor, PortSupervisor, Supervisor};
