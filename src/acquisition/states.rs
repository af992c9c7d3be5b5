//! States of the acquisition state machine.
//!
//! This module is private to [`acquisition`](crate::acquisition), which
//! provides the public interface of the state machine.
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use std::{fmt, thread, time::Duration};

use console::style;
use log::info;
use serialport::SerialPort;

use super::events::*;
use super::recorder::Recorder;
use crate::{
    button::DebouncedButton,
    decoder::SerialReadingDecoder,
    error::Result,
    hal::{ModemLinePin, SystemClock},
    settings::Settings,
    utils::open_and_setup_port,
    webhook::{LogPublisher, Webhook},
};

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// Trait adding the ability for a state to be `run` after a transition into it.
pub(crate) trait Runnable {
    /// Do the work of the state, then request the next transition by
    /// returning the appropriate event.
    fn run(&mut self, settings: &Settings) -> Event;
}

// Connect State ===============================================================

/// Initial state: open the spectrophotometer port.
///
///  * **[`StartRecordingEvent`] => [`RecordState`]** once the port is open,
///  * **[`StopEvent`] => [`DoneState`]** if it could not be opened.
#[derive(Debug)]
pub(crate) struct ConnectState {}
impl Runnable for ConnectState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!("=> Connect");

        match open_and_setup_port(settings) {
            Ok(port) => Event::StartRecording(StartRecordingEvent {
                settings: settings.clone(),
                port,
            }),
            // Fatal for this session only; the supervisor goes back to
            // waiting for the device.
            Err(_) => Event::Stop(StopEvent {
                settings: settings.clone(),
                with_errors: true,
            }),
        }
    }
}

// Record State ================================================================

/// Polls the decoder and the push button, publishing readings and button
/// events, until `max_readings` readings were recorded or the port fails.
///
///  * **[`StopEvent`] => [`DoneState`]** in both cases.
pub(crate) struct RecordState {
    /// Moved in from the `Connect` state and consumed by the recorder.
    pub port: Option<Box<dyn SerialPort>>,
}
impl Runnable for RecordState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!("=> Record");

        let with_errors = match self.port.take() {
            Some(port) => match record(port, settings) {
                Ok(()) => false,
                Err(ref e) => {
                    info!("error: {}", e);
                    true
                }
            },
            None => unreachable!("entered the record state without a port"),
        };

        Event::Stop(StopEvent {
            settings: settings.clone(),
            with_errors,
        })
    }
}
impl fmt::Debug for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.port {
            Some(port) => debug_fmt_port!("RecordState", port, f).finish(),
            None => f.debug_tuple("RecordState").finish(),
        }
    }
}

// Done State ==================================================================

/// Reached when recording stops. Reports how it ended and then fires the
/// [`ExitEvent`] that terminates the event loop.
#[derive(Debug, Copy, Clone)]
pub(crate) struct DoneState {
    /// When `true`, the session ended on an error.
    pub with_errors: bool,
    /// When `true`, the event loop returns.
    pub should_exit: bool,
}
impl Runnable for DoneState {
    fn run(&mut self, settings: &Settings) -> Event {
        info!(
            "=> Done with{}errors",
            if self.with_errors { " " } else { " no " }
        );
        if self.with_errors {
            println!(
                "{}",
                style("[S20] 💥 Lost the connection to the spectrophotometer!").red()
            );
        }

        Event::Exit(ExitEvent {
            settings: settings.clone(),
            with_errors: self.with_errors,
        })
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// The acquisition loop proper.
fn record(port: Box<dyn SerialPort>, settings: &Settings) -> Result<()> {
    let button = match settings.button_line {
        Some(line) => {
            let pin = ModemLinePin::new(port.try_clone()?, line);
            Some(
                DebouncedButton::new(pin, SystemClock::new(), settings.button_active_level)
                    .with_debounce_window(Duration::from_millis(settings.debounce_ms)),
            )
        }
        None => None,
    };
    let webhook = Webhook::new(&settings.webhook, LogPublisher)?;

    let mut recorder = Recorder::new(SerialReadingDecoder::new(port), button, webhook);
    recorder.init()?;
    println!("[S20] 🔬 Waiting for readings...");

    let pause = Duration::from_millis(settings.poll_interval_ms);
    loop {
        if let Some(reading) = recorder.step()? {
            println!(
                "[S20] {:>5} {} {} {}",
                style(format!("#{}", recorder.readings())).dim(),
                style(format!("{}nm", reading.wavelength)).cyan(),
                style(&reading.value).green(),
                reading.mode.name()
            );
            if let Some(max) = settings.max_readings {
                if recorder.readings() >= max {
                    return Ok(());
                }
            }
        }
        thread::sleep(pause);
    }
}
