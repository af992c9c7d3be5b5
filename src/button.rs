//! Debounced push button.
//!
//! Mechanical contacts bounce for a few milliseconds when they close or open.
//! [`DebouncedButton`] only accepts a new level once the raw samples have held
//! it for longer than the debounce window, and reports one-shot push and
//! release edges computed on the accepted levels.
//!
//! **Example** - Polling the button from the main loop:
//! ```ignore
//! use spec20log::{button::DebouncedButton, hal::{Level, SystemClock}};
//!
//! let mut button = DebouncedButton::new(pin, SystemClock::new(), Level::High);
//! button.init()?;
//! loop {
//!     button.update()?;
//!     if button.was_pushed() {
//!         println!("pushed");
//!     }
//! }
//! ```

use std::time::Duration;

use log::{debug, trace};

use crate::{
    error::Result,
    hal::{Clock, InputPin, Level, Pull},
};

/// Default debounce window.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(20);

/// Push button state tracker.
///
/// `update` must be called at a cadence much finer than the debounce window,
/// typically on every iteration of the main loop.
#[derive(Debug)]
pub struct DebouncedButton<P: InputPin, C: Clock> {
    pin: P,
    clock: C,
    /// The level at which the button is considered pressed.
    active_level: Level,
    debounce_window: Duration,

    /// Last sampled level and when it was first seen.
    raw_level: Level,
    last_change_ms: u64,

    /// Accepted levels, after debouncing.
    stable_level: Level,
    previous_stable_level: Level,
}

impl<P: InputPin, C: Clock> DebouncedButton<P, C> {
    /// The button starts released, with the default debounce window.
    pub fn new(pin: P, clock: C, active_level: Level) -> Self {
        DebouncedButton {
            pin,
            clock,
            active_level,
            debounce_window: DEBOUNCE_WINDOW,
            raw_level: !active_level,
            last_change_ms: 0,
            stable_level: !active_level,
            previous_stable_level: !active_level,
        }
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn set_debounce_window(&mut self, window: Duration) {
        self.debounce_window = window;
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    /// Bias the input towards the released level and start the first debounce
    /// window.
    pub fn init(&mut self) -> Result<()> {
        let pull = match self.active_level {
            Level::High => Pull::Down,
            Level::Low => Pull::Up,
        };
        debug!("button active {:?}, pull {:?}", self.active_level, pull);
        self.pin.set_pull(pull)?;
        self.last_change_ms = self.clock.now_ms();
        Ok(())
    }

    /// Sample the pin and commit its level once it held for longer than the
    /// debounce window.
    pub fn update(&mut self) -> Result<()> {
        let sampled = self.pin.level()?;
        let now = self.clock.now_ms();

        // Noise or a real press: restart the window either way.
        if sampled != self.raw_level {
            trace!("button raw level {:?} at {}ms", sampled, now);
            self.raw_level = sampled;
            self.last_change_ms = now;
        }

        let elapsed = now.wrapping_sub(self.last_change_ms);
        if u128::from(elapsed) > self.debounce_window.as_millis() {
            self.previous_stable_level = self.stable_level;
            self.stable_level = self.raw_level;
        }
        Ok(())
    }

    /// Whether the button is currently held down.
    pub fn is_active(&self) -> bool {
        self.stable_level == self.active_level
    }

    /// Whether the last `update` committed a press.
    pub fn was_pushed(&self) -> bool {
        self.previous_stable_level != self.stable_level && self.is_active()
    }

    /// Whether the last `update` committed a release.
    pub fn was_released(&self) -> bool {
        self.previous_stable_level != self.stable_level && !self.is_active()
    }

    pub fn stable_level(&self) -> Level {
        self.stable_level
    }

    pub fn active_level(&self) -> Level {
        self.active_level
    }

    pub fn into_inner(self) -> (P, C) {
        (self.pin, self.clock)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
