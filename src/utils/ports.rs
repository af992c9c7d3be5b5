//! Finding, selecting and opening the spectrophotometer serial port.

use std::time::Duration;

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serialport::{available_ports, SerialPort, SerialPortType};

use crate::{utils::poll_escape, Settings};

/// How often the list of ports is refreshed while waiting.
const REFRESH_PERIOD: Duration = Duration::from_secs(1);

//==============================================================================
// Public Interface
//==============================================================================

/// Wait until at least one serial port is connected, then let the user pick
/// one. Returns `None` when the user canceled the selection with `ESC`, so
/// that the caller can refresh the list.
pub(crate) fn select_port() -> Option<String> {
    let pb = spinner();
    let term = Term::stdout();
    let _ = term.hide_cursor();

    let mut waited = 0;
    let ports = loop {
        let ports = enumerate_ports();
        if !ports.is_empty() {
            pb.finish_with_message("Select the port the spectrophotometer is on:");
            break ports;
        }
        pb.set_message(format!(
            "[{:03}s] ⌛ Waiting for a serial adapter to be connected...",
            style(waited).dim()
        ));
        std::thread::sleep(REFRESH_PERIOD);
        waited += REFRESH_PERIOD.as_secs();
    };
    let _ = term.show_cursor();

    let labels: Vec<String> = ports.iter().map(PortEntry::label).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .items(&labels)
        .default(0)
        .interact_on_opt(&Term::buffered_stderr());

    match selection {
        Ok(Some(index)) => {
            let path = ports[index].path.clone();
            println!("[S20] 👍 Serial port {} is ready", style(&path).green());
            Some(path)
        }
        Ok(None) => {
            println!("[S20] ❌ Selection canceled -> refreshing...");
            None
        }
        Err(ref e) => {
            info!("error: {}", e);
            None
        }
    }
}

/// Wait until the port at `path` shows up on the system. Returns `true` when
/// the user gave up waiting by pressing `ESC`.
pub(crate) fn wait_for_port(path: &str) -> bool {
    let pb = spinner();
    let mut waited = 0;

    loop {
        let ports = enumerate_ports();
        if ports.iter().any(|port| port.path.starts_with(path)) {
            pb.finish_with_message(format!("👍 Serial port {} is ready", style(path).green()));
            return false;
        }

        pb.set_message(format!(
            "[{:03}s {}] ⏳ Waiting for {} (ESC to cancel)...",
            style(waited).dim(),
            ports.len(),
            style(path).cyan()
        ));

        // Waiting for a key doubles as the pause between two refreshes.
        match poll_escape(REFRESH_PERIOD) {
            Ok(true) => {
                pb.finish_with_message(format!(
                    "❌ Waiting on port {} canceled after {} seconds",
                    style(path).cyan(),
                    style(waited).dim()
                ));
                return true;
            }
            Ok(false) => {}
            Err(ref e) => {
                debug!("keyboard polling failed: {}", e);
                std::thread::sleep(REFRESH_PERIOD);
            }
        }
        waited += REFRESH_PERIOD.as_secs();
    }
}

/// Open the port named in `settings` with its line configuration, retrying a
/// few times while the device settles after being plugged.
pub(crate) fn open_and_setup_port(
    settings: &Settings,
) -> Result<Box<dyn SerialPort>, serialport::Error> {
    use retry::{delay, retry_with_index};

    let path = match &settings.path {
        Some(path) => path.clone(),
        None => {
            return Err(serialport::Error::new(
                serialport::ErrorKind::InvalidInput,
                "no serial port selected",
            ))
        }
    };

    let result = retry_with_index(delay::Fixed::from_millis(1000).take(4), |attempt| {
        debug!("opening {} (attempt {})", path, attempt);
        serialport::new(&path, settings.baud_rate)
            .data_bits(settings.data_bits)
            .stop_bits(settings.stop_bits)
            .parity(settings.parity)
            .flow_control(settings.flow_control)
            .timeout(Duration::from_millis(100))
            .open()
    });

    let port = match result {
        Ok(port) => port,
        Err(retry::Error::Operation {
            error,
            total_delay,
            tries,
        }) => {
            info!(
                "Failed to open {} after {:?} and {} tries: {}",
                path, total_delay, tries, error
            );
            return Err(error);
        }
        Err(retry::Error::Internal(reason)) => {
            info!("Internal retry error while opening {}: {}", path, reason);
            return Err(serialport::Error::new(
                serialport::ErrorKind::Unknown,
                "internal error while retrying to open the port",
            ));
        }
    };

    let baud_rate = port.baud_rate()?;
    if baud_rate != settings.baud_rate {
        warn!(
            "{} runs at {} baud instead of the requested {}",
            path, baud_rate, settings.baud_rate
        );
        return Err(serialport::Error::new(
            serialport::ErrorKind::InvalidInput,
            format!("baud rate {} is not supported", settings.baud_rate),
        ));
    }

    info!("Connected to {} at {} baud", path, baud_rate);
    debug!("data_bits    : {:?}", port.data_bits()?);
    debug!("stop_bits    : {:?}", port.stop_bits()?);
    debug!("parity       : {:?}", port.parity()?);
    debug!("flow control : {:?}", port.flow_control()?);

    Ok(port)
}

//==============================================================================
// Private stuff
//==============================================================================

/// A serial port found on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PortEntry {
    path: String,
    /// Manufacturer and product of USB adapters.
    description: Option<String>,
}
impl PortEntry {
    fn label(&self) -> String {
        match &self.description {
            Some(description) => format!("{}: ({})", self.path, description),
            None => self.path.clone(),
        }
    }
}

fn enumerate_ports() -> Vec<PortEntry> {
    match available_ports() {
        Ok(ports) => ports
            .into_iter()
            .map(|port| {
                let description = match port.port_type {
                    SerialPortType::UsbPort(info) => Some(format!(
                        "{} / {}",
                        info.manufacturer.as_deref().unwrap_or(""),
                        info.product.as_deref().unwrap_or("")
                    )),
                    // Virtual ports are handy for testing with a simulated
                    // instrument.
                    _ => None,
                };
                PortEntry {
                    path: port.port_name,
                    description,
                }
            })
            .collect(),
        Err(ref e) => {
            info!("error: {}", e);
            vec![]
        }
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(120);
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"])
            .template("[S20] {spinner:.blue} {msg}"),
    );
    pb
}

#[test]
fn usb_port_label() {
    let entry = PortEntry {
        path: "/dev/ttyUSB0".into(),
        description: Some("FTDI / FT232R".into()),
    };
    assert_eq!(entry.label(), "/dev/ttyUSB0: (FTDI / FT232R)");
}

#[test]
fn virtual_port_label() {
    let entry = PortEntry {
        path: "/dev/pts/3".into(),
        description: None,
    };
    assert_eq!(entry.label(), "/dev/pts/3");
}
