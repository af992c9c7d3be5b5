//! Non-blocking keyboard checks while waiting on the serial port.

use std::io::stdout;
use std::{process, time::Duration};

use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
    Result,
};

/// Wait up to `timeout` for a key press. Returns `true` if it was `ESC`.
///
/// The terminal is in raw mode while waiting, so `Ctrl+C` arrives here as a
/// key event and exits the process.
pub(crate) fn poll_escape(timeout: Duration) -> Result<bool> {
    enable_raw_mode()?;
    execute!(stdout(), Hide)?;
    let ready = poll(timeout);
    execute!(stdout(), MoveToColumn(0), Show)?;
    disable_raw_mode()?;

    // `read` won't block after `poll` returned `Ok(true)`.
    if !ready? {
        return Ok(false);
    }
    match read()? {
        Event::Key(KeyEvent {
            code: KeyCode::Esc, ..
        }) => Ok(true),
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers,
        }) if modifiers.contains(KeyModifiers::CONTROL) => process::exit(0),
        _ => Ok(false),
    }
}
