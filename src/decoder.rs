//! Serial protocol decoder for the Spectronic 20 spectrophotometer.
//!
//! The instrument prints one fixed-width ASCII record per reading on its
//! RS-232 port, at 1200 baud, with no framing other than the trailing
//! `CR LF`:
//!
//! ```text
//! 630NM  -0.15 A\r\n
//! ^^^^^  ^^^^^ ^
//! |      |     '-- mode: (A)bsorbance, (T)ransmittance, (C)oncentration, (F)actor
//! |      '-------- value: digits, sign, decimal point or padding spaces
//! '--------------- wavelength in nm
//! ```
//!
//! **Example** - Polling the decoder from the main loop:
//! ```ignore
//! use spec20log::decoder::SerialReadingDecoder;
//!
//! let mut decoder = SerialReadingDecoder::new(port);
//! decoder.init()?;
//! loop {
//!     if decoder.poll_for_reading()? {
//!         let reading = decoder.reading().unwrap();
//!         println!("{} {} {}", reading.wavelength, reading.value, reading.mode);
//!         decoder.reset()?;
//!     }
//! }
//! ```

mod pattern;
mod reading;
mod serial_reading;

pub use pattern::{FieldKind, FieldSpan, Layout, SPEC20_PATTERN};
pub use reading::{Mode, Reading};
pub use serial_reading::{DecoderStats, SerialReadingDecoder};
