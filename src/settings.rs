//! Settings related to the spectrophotometer serial port, the push button and
//! the webhook the readings are published to.
//!
//! Use the [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
//! pattern to set the configurable values.

pub use serialport::{DataBits, FlowControl, Parity, StopBits};

pub use crate::hal::{Level, ModemLine};

// =============================================================================
// Public Interface
// =============================================================================

/// Groups all settings used by `spec20log` and acts as a
/// [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
/// for the settings.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    /// The port name, usually the device path.
    pub path: Option<String>,
    /// The baud rate in symbols-per-second. The Spectronic 20 talks at 1200.
    pub baud_rate: u32,
    /// Number of bits used to represent a character sent on the line.
    pub data_bits: DataBits,
    /// The type of signalling to use for controlling data transfer.
    pub flow_control: FlowControl,
    /// The type of parity to use for error checking.
    pub parity: Parity,
    /// Number of bits to use to signal the end of a character.
    pub stop_bits: StopBits,

    /// The modem status line the push button is wired to, if any.
    pub button_line: Option<ModemLine>,
    /// The line level at which the button is considered pushed.
    pub button_active_level: Level,
    /// How long the button line must hold a level before it is trusted.
    pub debounce_ms: u64,

    /// Name of the webhook channel events are published on (12 characters
    /// at most).
    pub webhook: String,
    /// Pause between two iterations of the acquisition loop.
    pub poll_interval_ms: u64,
    /// Stop the session after that many readings. Runs until interrupted when
    /// not set.
    pub max_readings: Option<usize>,

    /// Restrict creation of `Settings` instances unless through the
    /// `SettingsBuilder`.
    #[doc(hidden)]
    _private_use_builder: (),
}

/// The builder for the `Settings` values.
///
/// All values are optional and have default values that will be used if not
/// explicitly set.
///
/// **Example**
///
/// ```ignore
/// let settings = SettingsBuilder::new().path("/dev/ttyUSB0").finalize();
/// ```
pub struct SettingsBuilder {
    settings: Settings,
}
impl SettingsBuilder {
    /// Start building the settings using default values and no path for the
    /// port.
    pub fn new() -> Self {
        SettingsBuilder {
            settings: Settings {
                path: None,
                baud_rate: 1200,
                data_bits: DataBits::Eight,
                flow_control: FlowControl::None,
                parity: Parity::None,
                stop_bits: StopBits::One,
                button_line: None,
                button_active_level: Level::High,
                debounce_ms: 20,
                webhook: "spec20".into(),
                poll_interval_ms: 5,
                max_readings: None,
                _private_use_builder: (),
            },
        }
    }

    /// Set the path to the serial port
    pub fn path<'a>(mut self, path: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.settings.path = Some(path.into().as_ref().to_owned());
        self
    }

    /// Set the baud rate in symbols-per-second
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.settings.baud_rate = baud_rate;
        self
    }

    /// Set the number of bits used to represent a character sent on the line
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.settings.data_bits = data_bits;
        self
    }

    /// Set the type of signalling to use for controlling data transfer
    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.settings.flow_control = flow_control;
        self
    }

    /// Set the type of parity to use for error checking
    pub fn parity(mut self, parity: Parity) -> Self {
        self.settings.parity = parity;
        self
    }

    /// Set the number of bits to use to signal the end of a character
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.settings.stop_bits = stop_bits;
        self
    }

    /// Read the push button from the given modem status line
    pub fn button_line(mut self, line: ModemLine) -> Self {
        self.settings.button_line = Some(line);
        self
    }

    /// Set the line level meaning "pushed"
    pub fn button_active_level(mut self, level: Level) -> Self {
        self.settings.button_active_level = level;
        self
    }

    /// Set the button debounce window in milliseconds
    pub fn debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.settings.debounce_ms = debounce_ms;
        self
    }

    /// Set the webhook channel name
    pub fn webhook<'a>(mut self, webhook: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.settings.webhook = webhook.into().into_owned();
        self
    }

    /// Set the pause between acquisition loop iterations in milliseconds
    pub fn poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.settings.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Stop after the given number of readings
    pub fn max_readings(mut self, max_readings: usize) -> Self {
        self.settings.max_readings = Some(max_readings);
        self
    }

    pub fn finalize(self) -> Settings {
        self.settings
    }
}
impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[test]
fn all_default() {
    let settings = SettingsBuilder::new().finalize();
    assert_eq!(
        settings,
        Settings {
            path: None,
            baud_rate: 1200,
            data_bits: DataBits::Eight,
            flow_control: FlowControl::None,
            parity: Parity::None,
            stop_bits: StopBits::One,
            button_line: None,
            button_active_level: Level::High,
            debounce_ms: 20,
            webhook: "spec20".into(),
            poll_interval_ms: 5,
            max_readings: None,
            _private_use_builder: (),
        }
    )
}

#[test]
fn path() {
    let settings = SettingsBuilder::new().path("/dev/ttyUSB0").finalize();
    assert_eq!(settings.path.unwrap(), "/dev/ttyUSB0");
}

#[test]
fn baud_rate() {
    let baud_rate = 9_600;
    let settings = SettingsBuilder::new().baud_rate(baud_rate).finalize();
    assert_eq!(settings.baud_rate, baud_rate);
}

#[test]
fn data_bits() {
    let data_bits = DataBits::Seven;
    let settings = SettingsBuilder::new().data_bits(data_bits).finalize();
    assert_eq!(settings.data_bits, data_bits);
}

#[test]
fn parity() {
    let parity = Parity::Even;
    let settings = SettingsBuilder::new().parity(parity).finalize();
    assert_eq!(settings.parity, parity);
}

#[test]
fn button() {
    let settings = SettingsBuilder::new()
        .button_line(ModemLine::Cts)
        .button_active_level(Level::Low)
        .debounce_ms(30)
        .finalize();
    assert_eq!(settings.button_line, Some(ModemLine::Cts));
    assert_eq!(settings.button_active_level, Level::Low);
    assert_eq!(settings.debounce_ms, 30);
}

#[test]
fn webhook() {
    let settings = SettingsBuilder::new().webhook("lab_gs").finalize();
    assert_eq!(settings.webhook, "lab_gs");
}

#[test]
fn acquisition_loop() {
    let settings = SettingsBuilder::new()
        .poll_interval_ms(1)
        .max_readings(3)
        .finalize();
    assert_eq!(settings.poll_interval_ms, 1);
    assert_eq!(settings.max_readings, Some(3));
}
