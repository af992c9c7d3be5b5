//! Acquisition session over the spectrophotometer serial port.
//!
//! **Example** - Running one session:
//! ```ignore
//! use spec20log::{acquisition, SettingsBuilder};
//!
//! let settings = SettingsBuilder::new()
//!     .path("/dev/ttyUSB0")
//!     .max_readings(10)
//!     .finalize();
//! let status = acquisition::factory(settings).run();
//! ```

#[macro_use]
mod macros;

mod events;
mod recorder;
mod state_machine;
mod states;

pub use recorder::Recorder;
pub use state_machine::{factory, Acquisition};
