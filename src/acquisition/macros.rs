//! Helper macros for the acquisition state machine modules.

/// Debug-format the line configuration of a
/// [`SerialPort`](serialport::SerialPort) held by a state or an event.
#[macro_export]
macro_rules! debug_fmt_port {
    ($name:expr, $port:expr, $f:ident) => {
        $f.debug_struct($name)
            .field("name", &$port.name())
            .field("baud_rate", &$port.baud_rate())
            .field("data_bits", &$port.data_bits())
            .field("parity", &$port.parity())
            .field("stop_bits", &$port.stop_bits())
    };
}
