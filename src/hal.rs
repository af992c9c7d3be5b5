//! Hardware seams used by the decoder and the push button.
//!
//! The components in this crate never talk to a device directly. They own a
//! [`ByteSource`], an [`InputPin`] or a [`Clock`] and are advanced by the
//! caller's polling loop. Implementations are provided for the host side on
//! top of a [`SerialPort`](serialport::SerialPort) and [`std::time::Instant`].

use std::{
    fmt,
    io::Read,
    ops::Not,
    time::Instant,
};

use log::debug;
use serialport::{ClearBuffer, SerialPort};

use crate::error::Result;

// =============================================================================
// Public Interface
// =============================================================================

// Byte source =================================================================

/// A non-blocking source of bytes, consumed one byte at a time.
pub trait ByteSource {
    /// Number of bytes that can be read right now without blocking.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read the next byte. Only called after [`bytes_available`] reported at
    /// least one byte.
    ///
    /// [`bytes_available`]: ByteSource::bytes_available
    fn read_byte(&mut self) -> Result<u8>;

    /// Throw away everything currently buffered.
    fn discard_input(&mut self) -> Result<()> {
        while self.bytes_available()? > 0 {
            self.read_byte()?;
        }
        Ok(())
    }
}

impl ByteSource for Box<dyn SerialPort> {
    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn discard_input(&mut self) -> Result<()> {
        self.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

// Digital input ===============================================================

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}
impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}
impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Direction of the bias resistor on an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    Up,
    Down,
}

/// A digital input that can be sampled on demand.
pub trait InputPin {
    /// Sample the line; `true` when it is high.
    fn is_high(&mut self) -> Result<bool>;

    /// Configure the bias resistor of the line.
    fn set_pull(&mut self, pull: Pull) -> Result<()>;

    fn level(&mut self) -> Result<Level> {
        Ok(self.is_high()?.into())
    }
}

/// Modem status lines of a serial adapter that can be read as inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemLine {
    /// Clear To Send
    Cts,
    /// Data Set Ready
    Dsr,
    /// Carrier Detect
    Cd,
    /// Ring Indicator
    Ri,
}

/// A push button wired to one of the modem status lines of a serial adapter.
///
/// The handle is usually a clone of the port the spectrophotometer is
/// connected to, obtained with
/// [`try_clone`](serialport::SerialPort::try_clone).
pub struct ModemLinePin {
    port: Box<dyn SerialPort>,
    line: ModemLine,
}
impl ModemLinePin {
    pub fn new(port: Box<dyn SerialPort>, line: ModemLine) -> Self {
        ModemLinePin { port, line }
    }

    pub fn line(&self) -> ModemLine {
        self.line
    }
}
impl InputPin for ModemLinePin {
    fn is_high(&mut self) -> Result<bool> {
        let high = match self.line {
            ModemLine::Cts => self.port.read_clear_to_send()?,
            ModemLine::Dsr => self.port.read_data_set_ready()?,
            ModemLine::Cd => self.port.read_carrier_detect()?,
            ModemLine::Ri => self.port.read_ring_indicator()?,
        };
        Ok(high)
    }

    fn set_pull(&mut self, pull: Pull) -> Result<()> {
        // The bias of the status lines is fixed by the line driver.
        debug!("{:?} bias is fixed by the adapter, ignoring pull {:?}", self.line, pull);
        Ok(())
    }
}
impl fmt::Debug for ModemLinePin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModemLinePin")
            .field(&self.port.name())
            .field(&self.line)
            .finish()
    }
}

// Clock =======================================================================

/// A monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// [`Clock`] counting milliseconds since its creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}
impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            start: Instant::now(),
        }
    }
}
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSource;

    #[test]
    fn level_from_bool() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
    }

    #[test]
    fn level_not() {
        assert_eq!(!Level::High, Level::Low);
        assert_eq!(!Level::Low, Level::High);
    }

    #[test]
    fn default_discard_drains_everything() {
        let mut source = MockSource::new();
        source.push(b"630NM");
        source.discard_input().unwrap();
        assert_eq!(source.bytes_available().unwrap(), 0);
        assert_eq!(source.bytes_read(), 5);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now_ms();
        assert!(clock.now_ms() >= first);
    }
}
