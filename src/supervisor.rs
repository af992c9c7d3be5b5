//! Serial port supervisor running acquisition sessions.
//!
//! **Example**
//! ```no_run
//! use spec20log::{self as s20, Supervisor};
//!
//! let settings = s20::SettingsBuilder::new().finalize();
//! let status = s20::supervisor(settings).run();
//! std::process::exit(status.into());
//! ```

mod events;
mod state_machine;
mod states;

pub use state_machine::{supervisor, PortSupervisor, Supervisor};
