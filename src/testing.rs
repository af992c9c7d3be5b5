//! In-memory implementations of the hardware seams, for unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use crate::{
    error::Result,
    hal::{ByteSource, Clock, InputPin, Pull},
    webhook::Publisher,
};

/// Byte source fed by the test through [`push`](MockSource::push).
#[derive(Debug, Default)]
pub(crate) struct MockSource {
    rx: VecDeque<u8>,
    read: usize,
}
impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: &[u8]) {
        self.rx.extend(data.iter().copied());
    }

    /// Total bytes taken out of the source, including drained ones.
    pub fn bytes_read(&self) -> usize {
        self.read
    }
}
impl ByteSource for MockSource {
    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let byte = self.rx.pop_front().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "no data buffered")
        })?;
        self.read += 1;
        Ok(byte)
    }
}

/// Input pin whose level is driven from the test through a shared handle.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockPin {
    high: Rc<Cell<bool>>,
    pull: Rc<Cell<Option<Pull>>>,
}
impl MockPin {
    pub fn new(high: bool) -> Self {
        let pin = Self::default();
        pin.set(high);
        pin
    }

    pub fn set(&self, high: bool) {
        self.high.set(high);
    }

    pub fn pull(&self) -> Option<Pull> {
        self.pull.get()
    }
}
impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool> {
        Ok(self.high.get())
    }

    fn set_pull(&mut self, pull: Pull) -> Result<()> {
        self.pull.set(Some(pull));
        Ok(())
    }
}

/// Clock advanced by hand.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockClock {
    now_ms: Rc<Cell<u64>>,
}
impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}
impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Publisher recording every `(channel, payload)` it is handed.
#[derive(Debug, Clone)]
pub(crate) struct MockPublisher {
    pub sent: Rc<RefCell<Vec<(String, String)>>>,
    pub accept: bool,
}
impl MockPublisher {
    pub fn new(accept: bool) -> Self {
        MockPublisher {
            sent: Rc::new(RefCell::new(Vec::new())),
            accept,
        }
    }
}
impl Publisher for MockPublisher {
    fn publish(&mut self, channel: &str, payload: &str) -> bool {
        self.sent
            .borrow_mut()
            .push((channel.to_owned(), payload.to_owned()));
        self.accept
    }
}
