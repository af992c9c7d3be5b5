//! Error type shared by the `spec20log` components.
//!
//! Malformed serial input is never reported here: the decoder recovers from it
//! by resynchronizing. Errors only come from the hardware seams (serial port
//! I/O), from invalid configuration and from payload serialization.

use thiserror::Error;

use crate::webhook::MAX_WEBHOOK_NAME_LEN;

/// Errors raised by the `spec20log` components.
#[derive(Debug, Error)]
pub enum Error {
    /// The serial port failed to report, read or clear its input buffer.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A message pattern cannot be used to extract readings.
    #[error("invalid message pattern: {0}")]
    Pattern(&'static str),

    /// Publish channels are limited in length by the cloud service.
    #[error("webhook name `{0}` is longer than {} characters", MAX_WEBHOOK_NAME_LEN)]
    WebhookName(String),

    #[error("failed to serialize webhook payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shorthand for results carrying the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
