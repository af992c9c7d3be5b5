//! One iteration of the acquisition loop.
//!
//! The [`Recorder`] glues the decoder, the optional push button and the
//! webhook together. Each call to [`Recorder::step`] advances the button and
//! the decoder once, publishes what happened and re-arms the decoder after a
//! reading. The push button tags the readings that follow it with a sample
//! number, so the operator can mark when a new cuvette goes in.

use log::{debug, warn};

use crate::{
    button::DebouncedButton,
    decoder::{Reading, SerialReadingDecoder},
    error::Result,
    hal::{ByteSource, Clock, InputPin},
    webhook::{Event, Publisher, Webhook},
};

/// Drives the acquisition components from the polling loop.
#[derive(Debug)]
pub struct Recorder<S, P, C, W>
where
    S: ByteSource,
    P: InputPin,
    C: Clock,
    W: Publisher,
{
    decoder: SerialReadingDecoder<S>,
    button: Option<DebouncedButton<P, C>>,
    webhook: Webhook<W>,
    /// Incremented on every push of the button.
    sample: usize,
    readings: usize,
}

impl<S, P, C, W> Recorder<S, P, C, W>
where
    S: ByteSource,
    P: InputPin,
    C: Clock,
    W: Publisher,
{
    pub fn new(
        decoder: SerialReadingDecoder<S>,
        button: Option<DebouncedButton<P, C>>,
        webhook: Webhook<W>,
    ) -> Self {
        Recorder {
            decoder,
            button,
            webhook,
            sample: 0,
            readings: 0,
        }
    }

    /// Arm the decoder and the button, then announce the session.
    pub fn init(&mut self) -> Result<()> {
        self.decoder.init()?;
        if let Some(button) = self.button.as_mut() {
            button.init()?;
        }
        if !self.webhook.init() {
            warn!("{}: startup event was not published", self.webhook.name());
        }
        Ok(())
    }

    /// Poll the button and the decoder once. Returns the reading completed
    /// during this step, if any.
    pub fn step(&mut self) -> Result<Option<Reading>> {
        self.update_button()?;

        if !self.decoder.poll_for_reading()? {
            return Ok(None);
        }
        let reading = self.decoder.reading().cloned();
        self.decoder.reset()?;

        if let Some(reading) = &reading {
            self.readings += 1;
            let event = Event::new("data", reading.mode.name())
                .value(reading.value.trim())
                .unit(format!("{}nm", reading.wavelength))
                .sample(self.sample_tag());
            self.publish(&event);
        }
        Ok(reading)
    }

    /// Readings recorded so far.
    pub fn readings(&self) -> usize {
        self.readings
    }

    /// Number of the current sample (0 until the button is first pushed).
    pub fn sample(&self) -> usize {
        self.sample
    }

    pub fn decoder(&self) -> &SerialReadingDecoder<S> {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut SerialReadingDecoder<S> {
        &mut self.decoder
    }

    // =========================================================================
    // Private stuff
    // =========================================================================

    fn update_button(&mut self) -> Result<()> {
        let edge = match self.button.as_mut() {
            Some(button) => {
                button.update()?;
                if button.was_pushed() {
                    Some("pushed")
                } else if button.was_released() {
                    Some("released")
                } else {
                    None
                }
            }
            None => None,
        };

        if let Some(edge) = edge {
            if edge == "pushed" {
                self.sample += 1;
            }
            debug!("button {} (sample {})", edge, self.sample);
            let event = Event::new("event", "button")
                .value(edge)
                .sample(self.sample_tag());
            self.publish(&event);
        }
        Ok(())
    }

    /// Without a button there are no samples to tell apart.
    fn sample_tag(&self) -> String {
        match self.button {
            Some(_) => self.sample.to_string(),
            None => String::new(),
        }
    }

    fn publish(&mut self, event: &Event) {
        if !self.webhook.publish(event) {
            warn!("{}: failed to publish {:?}", self.webhook.name(), event);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::Level;
    use crate::testing::{MockClock, MockPin, MockPublisher, MockSource};

    type TestRecorder = Recorder<MockSource, MockPin, MockClock, MockPublisher>;

    fn recorder(with_button: bool) -> (TestRecorder, MockPin, MockClock, MockPublisher) {
        let pin = MockPin::new(false);
        let clock = MockClock::new();
        let publisher = MockPublisher::new(true);
        let button = if with_button {
            Some(DebouncedButton::new(pin.clone(), clock.clone(), Level::High))
        } else {
            None
        };
        let mut recorder = Recorder::new(
            SerialReadingDecoder::new(MockSource::new()),
            button,
            Webhook::new("spec20", publisher.clone()).unwrap(),
        );
        recorder.init().unwrap();
        (recorder, pin, clock, publisher)
    }

    fn published(publisher: &MockPublisher) -> Vec<serde_json::Value> {
        publisher
            .sent
            .borrow()
            .iter()
            .map(|(_, payload)| serde_json::from_str(payload).unwrap())
            .collect()
    }

    #[test]
    fn init_publishes_startup() {
        let (_, _, _, publisher) = recorder(false);
        let events = published(&publisher);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["var"], "startup");
    }

    #[test]
    fn reading_is_published_and_decoder_rearmed() {
        let (mut recorder, _, _, publisher) = recorder(false);
        recorder.decoder_mut().source_mut().push(b"630NM  -0.15 A\r\n");

        let reading = recorder.step().unwrap().unwrap();
        assert_eq!(reading.value, "-0.15");
        assert_eq!(recorder.readings(), 1);
        assert!(recorder.decoder().is_ready_to_receive());

        let events = published(&publisher);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["type"], "data");
        assert_eq!(events[1]["var"], "absorbance");
        assert_eq!(events[1]["value"], "-0.15");
        assert_eq!(events[1]["units"], "630nm");
        assert_eq!(events[1]["sample"], "");
    }

    #[test]
    fn nothing_happens_without_input() {
        let (mut recorder, _, _, publisher) = recorder(false);
        for _ in 0..5 {
            assert!(recorder.step().unwrap().is_none());
        }
        assert_eq!(published(&publisher).len(), 1);
    }

    #[test]
    fn button_push_starts_a_new_sample() {
        let (mut recorder, pin, clock, publisher) = recorder(true);
        pin.set(true);
        for _ in 0..30 {
            clock.advance(1);
            recorder.step().unwrap();
        }
        assert_eq!(recorder.sample(), 1);

        recorder.decoder_mut().source_mut().push(b"450NM   .153 T\r\n");
        let reading = recorder.step().unwrap().unwrap();
        assert_eq!(reading.wavelength, "450");

        let events = published(&publisher);
        assert_eq!(events.len(), 3);
        assert_eq!(events[1]["var"], "button");
        assert_eq!(events[1]["value"], "pushed");
        assert_eq!(events[1]["sample"], "1");
        assert_eq!(events[2]["var"], "transmittance");
        assert_eq!(events[2]["value"], ".153");
        assert_eq!(events[2]["sample"], "1");
    }

    #[test]
    fn button_release_is_published() {
        let (mut recorder, pin, clock, publisher) = recorder(true);
        pin.set(true);
        for _ in 0..30 {
            clock.advance(1);
            recorder.step().unwrap();
        }
        pin.set(false);
        for _ in 0..30 {
            clock.advance(1);
            recorder.step().unwrap();
        }

        let events = published(&publisher);
        let edges: Vec<_> = events[1..].iter().map(|e| e["value"].clone()).collect();
        assert_eq!(edges, vec!["pushed", "released"]);
        assert_eq!(recorder.sample(), 1);
    }
}
