use crate::error::{Error, Result};
use crate::frame::{Event, Payload};
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;

/// Placeholder replaced by the current counter value in text templates.
pub const COUNT_PLACEHOLDER: &str = "{count}";

/// How a counter value becomes the payload of a data event.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadFormat {
    /// The bare counter value, e.g. `data: 18`.
    Counter,
    /// A text template with `{count}` placeholders.
    Template(String),
    /// A JSON object `{"message": <template>, "timestamp": <rfc3339>}`.
    JsonMessage(String),
}

#[derive(Serialize)]
struct CounterMessage {
    message: String,
    timestamp: String,
}

impl PayloadFormat {
    pub fn render(&self, count: i64) -> Result<Payload> {
        match self {
            PayloadFormat::Counter => Ok(Payload::Text(count.to_string())),
            PayloadFormat::Template(template) => Ok(Payload::Text(fill(template, count))),
            PayloadFormat::JsonMessage(template) => Payload::json(&CounterMessage {
                message: fill(template, count),
                timestamp: Utc::now().to_rfc3339(),
            }),
        }
    }
}

fn fill(template: &str, count: i64) -> String {
    template.replace(COUNT_PLACEHOLDER, &count.to_string())
}

/// Everything a stream session needs to know about its cadence and framing.
///
/// One value describes one endpoint profile; sessions share it read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Profile name used in logs and the connection registry.
    pub name: String,
    pub initial_counter: i64,
    pub increment: i64,
    /// Data events to emit before closing; unbounded when `None`.
    pub max_events: Option<u64>,
    pub interval: Duration,
    pub send_preamble: bool,
    pub preamble_events: Vec<Event>,
    pub payload: PayloadFormat,
    /// Length of a `data: ....` filler frame sent after each data event.
    /// Some intermediaries hold small chunks back until enough bytes arrive.
    pub padding: Option<usize>,
    pub emit_terminal_notice: bool,
    pub terminal_notice: String,
    /// Best-effort notice sent when the session is cancelled.
    pub cancel_notice: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: "stream".to_string(),
            initial_counter: 1,
            increment: 1,
            max_events: None,
            interval: Duration::from_secs(1),
            send_preamble: false,
            preamble_events: Vec::new(),
            payload: PayloadFormat::Counter,
            padding: None,
            emit_terminal_notice: false,
            terminal_notice: "Stream ended".to_string(),
            cancel_notice: None,
        }
    }
}

impl StreamConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn counter_from(mut self, initial_counter: i64, increment: i64) -> Self {
        self.initial_counter = initial_counter;
        self.increment = increment;
        self
    }

    pub fn max_events(mut self, max_events: u64) -> Self {
        self.max_events = Some(max_events);
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Appends an event to the preamble and turns preamble emission on.
    pub fn preamble(mut self, event: Event) -> Self {
        self.send_preamble = true;
        self.preamble_events.push(event);
        self
    }

    pub fn payload(mut self, payload: PayloadFormat) -> Self {
        self.payload = payload;
        self
    }

    pub fn padding(mut self, len: usize) -> Self {
        self.padding = Some(len);
        self
    }

    pub fn terminal_notice(mut self, text: impl Into<String>) -> Self {
        self.emit_terminal_notice = true;
        self.terminal_notice = text.into();
        self
    }

    pub fn cancel_notice(mut self, text: impl Into<String>) -> Self {
        self.cancel_notice = Some(text.into());
        self
    }

    /// Rejects settings under which the session invariants cannot hold.
    pub fn validate(&self) -> Result<()> {
        if self.increment <= 0 {
            return Err(Error::Configuration(format!(
                "{}: increment must be positive, got {}",
                self.name, self.increment
            )));
        }
        if self.max_events == Some(0) {
            return Err(Error::Configuration(format!(
                "{}: max_events must be at least 1 when set",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_format_renders_bare_value() {
        assert_eq!(
            PayloadFormat::Counter.render(18).unwrap(),
            Payload::text("18")
        );
    }

    #[test]
    fn test_template_replaces_every_placeholder() {
        let format = PayloadFormat::Template("Message number: {count} ({count})".to_string());
        assert_eq!(
            format.render(3).unwrap(),
            Payload::text("Message number: 3 (3)")
        );
    }

    #[test]
    fn test_json_message_carries_message_and_timestamp() {
        let format = PayloadFormat::JsonMessage("Counter: {count}".to_string());
        let Payload::Json(value) = format.render(4).unwrap() else {
            panic!("expected a JSON payload");
        };
        assert_eq!(value["message"], "Counter: 4");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_validate_rejects_non_positive_increment() {
        let config = StreamConfig::new("bad").counter_from(1, 0);
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        let config = StreamConfig::new("bad").counter_from(1, -2);
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_zero_event_cap() {
        let config = StreamConfig::new("bad").max_events(0);
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_builder_enables_preamble_and_terminal_notice() {
        let config = StreamConfig::new("test")
            .preamble(Event::heartbeat())
            .terminal_notice("Stream ended");

        assert!(config.send_preamble);
        assert_eq!(config.preamble_events, vec![Event::heartbeat()]);
        assert!(config.emit_terminal_notice);
        assert!(config.validate().is_ok());
    }
}
