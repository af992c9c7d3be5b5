//! Publishing key-value events to a cloud webhook.
//!
//! Every event is serialized with the current local time into a small JSON
//! object and handed to a [`Publisher`] under the webhook's channel name:
//!
//! ```text
//! {"datetime":"2016-10-19 14:02:11","type":"data","var":"absorbance",
//!  "value":"-0.150","units":"630nm","sample":"","msg":""}
//! ```
//!
//! Delivery is the publisher's business: [`Webhook::publish`] only reports
//! whether the publish call itself went through.
//!
//! **Example**
//! ```ignore
//! let mut gs = Webhook::new("spec20", LogPublisher)?;
//! gs.init();
//! gs.publish(&Event::new("data", "absorbance").value(-0.15).unit("630nm"));
//! ```

use chrono::Local;
use log::{info, warn};
use serde::Serialize;

use crate::error::{Error, Result};

/// Longest channel name accepted by the cloud service.
pub const MAX_WEBHOOK_NAME_LEN: usize = 12;

/// Largest JSON payload that can be published.
pub const MAX_PAYLOAD_LEN: usize = 255;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Public Interface
// =============================================================================

/// The transport primitive events are published with.
pub trait Publisher {
    /// Publish `payload` on `channel`. Returns whether the call succeeded, not
    /// whether the event was delivered.
    fn publish(&mut self, channel: &str, payload: &str) -> bool;
}

/// [`Publisher`] writing each event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPublisher;
impl Publisher for LogPublisher {
    fn publish(&mut self, channel: &str, payload: &str) -> bool {
        info!(target: "webhook", "{}: {}", channel, payload);
        true
    }
}

/// The value of an event, already formatted as text.
///
/// Integers are written in decimal and floating point numbers with three
/// decimals.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventValue(String);
impl EventValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        EventValue(value.to_owned())
    }
}
impl From<String> for EventValue {
    fn from(value: String) -> Self {
        EventValue(value)
    }
}
impl From<i32> for EventValue {
    fn from(value: i32) -> Self {
        EventValue(value.to_string())
    }
}
impl From<i64> for EventValue {
    fn from(value: i64) -> Self {
        EventValue(value.to_string())
    }
}
impl From<u32> for EventValue {
    fn from(value: u32) -> Self {
        EventValue(value.to_string())
    }
}
impl From<usize> for EventValue {
    fn from(value: usize) -> Self {
        EventValue(value.to_string())
    }
}
impl From<f64> for EventValue {
    fn from(value: f64) -> Self {
        EventValue(format!("{:.3}", value))
    }
}

/// An event to publish. Only the type and the variable name are required;
/// everything else defaults to an empty string.
///
/// **Example**
/// ```ignore
/// let event = Event::new("event", "button").value("pushed").message("sample 3");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: String,
    pub variable: String,
    pub value: EventValue,
    pub unit: String,
    pub sample: String,
    pub message: String,
}
impl Event {
    pub fn new<'a>(
        event_type: impl Into<std::borrow::Cow<'a, str>>,
        variable: impl Into<std::borrow::Cow<'a, str>>,
    ) -> Self {
        Event {
            event_type: event_type.into().into_owned(),
            variable: variable.into().into_owned(),
            ..Default::default()
        }
    }

    pub fn value(mut self, value: impl Into<EventValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn unit<'a>(mut self, unit: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.unit = unit.into().into_owned();
        self
    }

    pub fn sample<'a>(mut self, sample: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.sample = sample.into().into_owned();
        self
    }

    pub fn message<'a>(mut self, message: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.message = message.into().into_owned();
        self
    }
}

/// A named webhook channel.
#[derive(Debug)]
pub struct Webhook<P: Publisher> {
    name: String,
    publisher: P,
}

impl<P: Publisher> Webhook<P> {
    /// Fails when `name` is longer than [`MAX_WEBHOOK_NAME_LEN`].
    pub fn new(name: &str, publisher: P) -> Result<Self> {
        if name.chars().count() > MAX_WEBHOOK_NAME_LEN {
            return Err(Error::WebhookName(name.to_owned()));
        }
        Ok(Webhook {
            name: name.to_owned(),
            publisher,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Announce the start of the session.
    pub fn init(&mut self) -> bool {
        self.publish(&Event::new("event", "startup").message("complete"))
    }

    /// Publish `event` stamped with the current local time.
    pub fn publish(&mut self, event: &Event) -> bool {
        let datetime = Local::now().format(DATETIME_FORMAT).to_string();
        match payload(event, &datetime) {
            Ok(json) if json.len() <= MAX_PAYLOAD_LEN => self.publisher.publish(&self.name, &json),
            Ok(json) => {
                warn!(
                    "{}: payload of {} bytes exceeds {} bytes, not published",
                    self.name,
                    json.len(),
                    MAX_PAYLOAD_LEN
                );
                false
            }
            Err(e) => {
                warn!("{}: {}", self.name, e);
                false
            }
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}

/// Serialize `event` with the given timestamp.
pub fn payload(event: &Event, datetime: &str) -> Result<String> {
    let payload = Payload {
        datetime,
        event_type: &event.event_type,
        var: &event.variable,
        value: event.value.as_str(),
        units: &event.unit,
        sample: &event.sample,
        msg: &event.message,
    };
    Ok(serde_json::to_string(&payload)?)
}

// =============================================================================
// Private stuff
// =============================================================================

#[derive(Serialize)]
struct Payload<'a> {
    datetime: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    var: &'a str,
    value: &'a str,
    units: &'a str,
    sample: &'a str,
    msg: &'a str,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPublisher;

    #[test]
    fn payload_shape() {
        let event = Event::new("data", "absorbance")
            .value(-0.15)
            .unit("630nm")
            .sample("S1")
            .message("ok");
        let json = payload(&event, "2016-10-19 14:02:11").unwrap();
        assert_eq!(
            json,
            "{\"datetime\":\"2016-10-19 14:02:11\",\"type\":\"data\",\"var\":\"absorbance\",\
             \"value\":\"-0.150\",\"units\":\"630nm\",\"sample\":\"S1\",\"msg\":\"ok\"}"
        );
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let json = payload(&Event::new("event", "startup"), "now").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["value"], "");
        assert_eq!(value["units"], "");
        assert_eq!(value["sample"], "");
        assert_eq!(value["msg"], "");
    }

    #[test]
    fn quotes_are_escaped() {
        let json = payload(&Event::new("event", "note").message("say \"hi\""), "now").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["msg"], "say \"hi\"");
    }

    #[test]
    fn value_conversions() {
        assert_eq!(EventValue::from(42i32).as_str(), "42");
        assert_eq!(EventValue::from(-7i64).as_str(), "-7");
        assert_eq!(EventValue::from(0.1234).as_str(), "0.123");
        assert_eq!(EventValue::from("  .15").as_str(), "  .15");
        assert_eq!(EventValue::from(String::from("x")).as_str(), "x");
    }

    #[test]
    fn long_name_is_rejected() {
        assert!(Webhook::new("spec20", LogPublisher).is_ok());
        assert!(Webhook::new("twelve_chars", LogPublisher).is_ok());
        assert!(matches!(
            Webhook::new("thirteen_char", LogPublisher),
            Err(Error::WebhookName(_))
        ));
    }

    #[test]
    fn init_announces_startup() {
        let publisher = MockPublisher::new(true);
        let mut webhook = Webhook::new("spec20", publisher.clone()).unwrap();
        assert!(webhook.init());

        let sent = publisher.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "spec20");
        let value: serde_json::Value = serde_json::from_str(&sent[0].1).unwrap();
        assert_eq!(value["type"], "event");
        assert_eq!(value["var"], "startup");
        assert_eq!(value["msg"], "complete");
        assert_eq!(value["datetime"].as_str().unwrap().len(), 19);
    }

    #[test]
    fn publisher_failure_is_reported() {
        let mut webhook = Webhook::new("spec20", MockPublisher::new(false)).unwrap();
        assert!(!webhook.publish(&Event::new("event", "startup")));
    }

    #[test]
    fn oversized_payload_is_not_published() {
        let publisher = MockPublisher::new(true);
        let mut webhook = Webhook::new("spec20", publisher.clone()).unwrap();
        let event = Event::new("event", "note").message("x".repeat(MAX_PAYLOAD_LEN));
        assert!(!webhook.publish(&event));
        assert!(publisher.sent.borrow().is_empty());
    }
}
