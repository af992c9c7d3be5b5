//! Byte-level state machine turning the serial stream into [`Reading`]s.

use hexplay::HexViewBuilder;
use log::{debug, info, log_enabled, trace, warn, Level::Debug};

use super::pattern::{FieldKind, Layout, SPEC20_PATTERN};
use super::reading::Reading;
use crate::{error::Result, hal::ByteSource};

// =============================================================================
// Public Interface
// =============================================================================

/// Counters kept across resets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecoderStats {
    /// Complete records decoded.
    pub readings: usize,
    /// Partial records thrown away after an unexpected byte.
    pub resyncs: usize,
}

/// Decoder for the fixed-width records sent by the spectrophotometer.
///
/// The decoder matches each incoming byte against the pattern position it is
/// at. Any byte outside the expected character class resets the decoder and
/// drains the stream, so a corrupted record never spills into the next one.
///
/// At most one reading is pending at any time. After
/// [`poll_for_reading`](Self::poll_for_reading) returns `true` the decoder
/// stops consuming bytes until [`reset`](Self::reset) is called.
///
/// **Example**
/// ```ignore
/// let mut decoder = SerialReadingDecoder::new(port);
/// decoder.init()?;
/// loop {
///     if decoder.poll_for_reading()? {
///         println!("{}", decoder.reading().unwrap());
///         decoder.reset()?;
///     }
/// }
/// ```
#[derive(Debug)]
pub struct SerialReadingDecoder<S: ByteSource> {
    source: S,
    pattern: &'static [FieldKind],
    layout: Layout,
    position: usize,
    accumulated: String,
    ready_to_receive: bool,
    reading: Option<Reading>,
    stats: DecoderStats,
}

impl<S: ByteSource> SerialReadingDecoder<S> {
    /// Decoder for the Spectronic 20 record grammar.
    pub fn new(source: S) -> Self {
        // The built-in pattern is known to be valid.
        let layout = match Layout::of(SPEC20_PATTERN) {
            Ok(layout) => layout,
            Err(e) => unreachable!("built-in pattern rejected: {}", e),
        };
        Self::with_layout(source, SPEC20_PATTERN, layout)
    }

    /// Decoder for a custom record grammar. Fails if no reading can be
    /// extracted from records matching `pattern`.
    pub fn with_pattern(source: S, pattern: &'static [FieldKind]) -> Result<Self> {
        let layout = Layout::of(pattern)?;
        Ok(Self::with_layout(source, pattern, layout))
    }

    /// Prepare the decoder for the first record. The underlying stream is
    /// expected to be open already.
    pub fn init(&mut self) -> Result<()> {
        debug!("decoder layout: {:?}", self.layout);
        self.reset()
    }

    /// Drop the in-progress record and any pending reading, then drain the
    /// bytes currently buffered in the stream. Must be called after consuming
    /// a reading to receive the next one.
    pub fn reset(&mut self) -> Result<()> {
        self.accumulated.clear();
        self.reading = None;
        self.position = 0;
        self.ready_to_receive = true;

        self.source.discard_input()
    }

    /// Consume the bytes currently available, without blocking. Returns `true`
    /// when a record was completed during this call; the reading is then
    /// available through [`reading`](Self::reading).
    pub fn poll_for_reading(&mut self) -> Result<bool> {
        let mut new_reading = false;

        while self.ready_to_receive && self.source.bytes_available()? > 0 {
            let byte = self.source.read_byte()?;
            let expected = self.pattern[self.position];
            trace!("byte {:#04x} at position {} ({:?})", byte, self.position, expected);

            if !expected.accepts(byte) {
                self.resync(byte)?;
                continue;
            }

            if expected.is_stored() {
                self.accumulated.push(char::from(byte));
            }
            self.position += 1;

            if expected == FieldKind::LineFeed {
                new_reading = self.complete()?;
            }
        }

        Ok(new_reading)
    }

    /// The pending reading, if a record was completed since the last reset.
    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_ready_to_receive(&self) -> bool {
        self.ready_to_receive
    }

    /// Text accepted so far for the record in progress.
    pub fn partial_message(&self) -> &str {
        &self.accumulated
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    pub fn pattern(&self) -> &'static [FieldKind] {
        self.pattern
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Give back the byte source.
    pub fn into_inner(self) -> S {
        self.source
    }

    // =========================================================================
    // Private stuff
    // =========================================================================

    fn with_layout(source: S, pattern: &'static [FieldKind], layout: Layout) -> Self {
        SerialReadingDecoder {
            source,
            pattern,
            layout,
            position: 0,
            accumulated: String::with_capacity(pattern.len()),
            ready_to_receive: true,
            reading: None,
            stats: DecoderStats::default(),
        }
    }

    /// The terminator matched: extract the fields and hold the reading until
    /// the next reset.
    fn complete(&mut self) -> Result<bool> {
        match Reading::from_record(&self.accumulated, &self.layout) {
            Some(reading) => {
                info!("reading complete: {}", self.accumulated);
                self.reading = Some(reading);
                self.position = 0;
                self.ready_to_receive = false;
                self.stats.readings += 1;
                Ok(true)
            }
            None => {
                warn!(
                    "record `{}` does not fit the reading layout, discarding it",
                    self.accumulated
                );
                self.stats.resyncs += 1;
                self.reset()?;
                Ok(false)
            }
        }
    }

    /// An unexpected byte means we lost track of the record boundaries.
    fn resync(&mut self, byte: u8) -> Result<()> {
        warn!(
            "unexpected character triggered message reset: {} = {:?}",
            byte,
            char::from(byte)
        );
        warn!("partial message to this point: {:?}", self.accumulated);

        // Dump the partial message in a hex table for debugging
        if log_enabled!(Debug) && !self.accumulated.is_empty() {
            let view = HexViewBuilder::new(self.accumulated.as_bytes())
                .address_offset(0)
                .row_width(16)
                .finish();
            debug!("\n{}", view);
        }

        self.stats.resyncs += 1;
        self.reset()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::FieldKind::{LineFeed, Separator, Value, Wavelength};
    use crate::decoder::Mode;
    use crate::testing::MockSource;

    const RECORD: &[u8] = b"630NM  -0.15 A\r\n";

    fn decoder() -> SerialReadingDecoder<MockSource> {
        let mut decoder = SerialReadingDecoder::new(MockSource::new());
        decoder.init().unwrap();
        decoder
    }

    /// Feed `bytes` one at a time, polling after each one. Returns the indices
    /// at which a reading was reported.
    fn feed(decoder: &mut SerialReadingDecoder<MockSource>, bytes: &[u8]) -> Vec<usize> {
        let mut completed = vec![];
        for (index, byte) in bytes.iter().enumerate() {
            decoder.source_mut().push(&[*byte]);
            if decoder.poll_for_reading().unwrap() {
                completed.push(index);
            }
        }
        completed
    }

    #[test]
    fn decodes_a_record_fed_byte_by_byte() {
        let mut decoder = decoder();
        assert_eq!(feed(&mut decoder, RECORD), vec![15]);

        let reading = decoder.reading().unwrap();
        assert_eq!(reading.wavelength, "630");
        assert_eq!(reading.value, "-0.15");
        assert_eq!(reading.mode, Mode::Absorbance);
        assert_eq!(decoder.position(), 0);
        assert!(!decoder.is_ready_to_receive());
        assert_eq!(decoder.stats().readings, 1);
    }

    #[test]
    fn decodes_a_record_available_at_once() {
        let mut decoder = decoder();
        decoder.source_mut().push(RECORD);
        assert!(decoder.poll_for_reading().unwrap());
        assert!(!decoder.poll_for_reading().unwrap());
        assert_eq!(decoder.reading().unwrap().value, "-0.15");
    }

    #[test]
    fn accumulates_without_terminators() {
        let mut decoder = decoder();
        feed(&mut decoder, &RECORD[..15]);
        assert_eq!(decoder.position(), 15);
        assert_eq!(decoder.partial_message(), "630NM  -0.15 A");
        assert!(decoder.reading().is_none());
    }

    #[test]
    fn single_separator_record_does_not_decode() {
        // The sign lands on the second separator position.
        let mut decoder = decoder();
        assert!(feed(&mut decoder, b"630NM -0.153 A\r\n").is_empty());
        assert!(decoder.reading().is_none());
        assert!(decoder.stats().resyncs > 0);
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn pending_reading_blocks_further_input() {
        let mut decoder = decoder();
        feed(&mut decoder, RECORD);

        decoder.source_mut().push(b"450NM   .153 T\r\n");
        assert!(!decoder.poll_for_reading().unwrap());
        assert_eq!(decoder.source_mut().bytes_available().unwrap(), 16);
        assert_eq!(decoder.reading().unwrap().wavelength, "630");

        // Resetting drains whatever arrived in between.
        decoder.reset().unwrap();
        assert_eq!(decoder.source_mut().bytes_available().unwrap(), 0);
        assert!(decoder.reading().is_none());
    }

    #[test]
    fn next_record_after_reset() {
        let mut decoder = decoder();
        feed(&mut decoder, RECORD);
        decoder.reset().unwrap();

        assert_eq!(feed(&mut decoder, b"450NM   .153 T\r\n"), vec![15]);
        let reading = decoder.reading().unwrap();
        assert_eq!(reading.wavelength, "450");
        assert_eq!(reading.value, " .153");
        assert_eq!(reading.mode, Mode::Transmittance);
        assert_eq!(decoder.stats().readings, 2);
    }

    #[test]
    fn recovers_from_a_bad_byte_at_any_position() {
        for corrupted in 0..RECORD.len() {
            let mut decoder = decoder();
            let mut bytes = RECORD.to_vec();
            bytes[corrupted] = b'X';

            assert!(
                feed(&mut decoder, &bytes).is_empty(),
                "corruption at {} produced a reading",
                corrupted
            );
            assert!(decoder.stats().resyncs >= 1);

            assert_eq!(
                feed(&mut decoder, RECORD),
                vec![15],
                "no recovery after corruption at {}",
                corrupted
            );
            assert_eq!(decoder.reading().unwrap().value, "-0.15");
        }
    }

    #[test]
    fn bad_byte_drains_the_stream() {
        let mut decoder = decoder();
        decoder.source_mut().push(b"63X");
        decoder.source_mut().push(RECORD);

        assert!(!decoder.poll_for_reading().unwrap());
        assert_eq!(decoder.source_mut().bytes_available().unwrap(), 0);
        assert_eq!(decoder.stats().resyncs, 1);
        assert_eq!(decoder.position(), 0);
        assert_eq!(decoder.partial_message(), "");
        assert!(decoder.is_ready_to_receive());
    }

    #[test]
    fn init_discards_stale_bytes() {
        let mut decoder = SerialReadingDecoder::new(MockSource::new());
        decoder.source_mut().push(b"NM  -0.15 A\r\n");
        decoder.init().unwrap();
        assert_eq!(decoder.source_mut().bytes_available().unwrap(), 0);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut decoder = decoder();
        feed(&mut decoder, &RECORD[..9]);
        for _ in 0..3 {
            decoder.reset().unwrap();
            assert_eq!(decoder.position(), 0);
            assert!(decoder.is_ready_to_receive());
            assert_eq!(decoder.partial_message(), "");
            assert!(decoder.reading().is_none());
        }
    }

    #[test]
    fn stalled_stream_is_not_an_error() {
        let mut decoder = decoder();
        feed(&mut decoder, &RECORD[..4]);
        for _ in 0..10 {
            assert!(!decoder.poll_for_reading().unwrap());
        }
        assert_eq!(decoder.position(), 4);
    }

    #[test]
    fn custom_pattern_offsets_are_derived() {
        static SHORT: &[FieldKind] = &[
            Wavelength, Wavelength, Wavelength, Separator, Value, Value, Value, Value, Separator,
            FieldKind::Mode, LineFeed,
        ];
        let mut decoder = SerialReadingDecoder::with_pattern(MockSource::new(), SHORT).unwrap();
        decoder.init().unwrap();

        assert_eq!(feed(&mut decoder, b"540 0.42 C\n"), vec![10]);
        let reading = decoder.reading().unwrap();
        assert_eq!(reading.wavelength, "540");
        assert_eq!(reading.value, "0.42");
        assert_eq!(reading.mode, Mode::Concentration);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        static NO_TERMINATOR: &[FieldKind] = &[Wavelength, Value, FieldKind::Mode];
        assert!(SerialReadingDecoder::with_pattern(MockSource::new(), NO_TERMINATOR).is_err());
    }
}
