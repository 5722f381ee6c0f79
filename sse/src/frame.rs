//! Wire encoding for server-sent event frames.
//!
//! Every [`Event`] maps to exactly one [`Frame`]. Comment lines start with
//! `": "`, data lines with `"data: "`, and a blank line ends the frame.
//! Text containing line breaks is split so each source line gets its own
//! marker, which keeps an embedded `\n` from ending the frame early.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::Result;

const COMMENT_MARKER: &str = ": ";
const DATA_MARKER: &str = "data: ";

/// Text carried on the default heartbeat comment.
pub const HEARTBEAT_TEXT: &str = "heartbeat";

/// Body of a data frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    /// Serializes `value` up front so encoding can never fail later.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Payload::Json(serde_json::to_value(value)?))
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(text) => f.write_str(text),
            Payload::Json(value) => write!(f, "{}", value),
        }
    }
}

/// One unit of emission produced by a stream session.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Comment frame, ignored by clients; keeps intermediaries from timing out.
    Heartbeat(String),
    Data(Payload),
    /// Data frame signalling that the stream is about to end.
    TerminalNotice(String),
}

impl Event {
    pub fn heartbeat() -> Self {
        Event::Heartbeat(HEARTBEAT_TEXT.to_string())
    }

    pub fn data(text: impl Into<String>) -> Self {
        Event::Data(Payload::text(text))
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Event::TerminalNotice(text.into())
    }
}

/// Encoded bytes of a single event, ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Bytes);

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

/// Encodes an event into its wire frame.
pub fn encode(event: &Event) -> Frame {
    let mut buf = String::new();
    match event {
        Event::Heartbeat(text) => push_lines(&mut buf, COMMENT_MARKER, text),
        Event::Data(payload) => push_lines(&mut buf, DATA_MARKER, &payload.to_string()),
        Event::TerminalNotice(text) => push_lines(&mut buf, DATA_MARKER, text),
    }
    buf.push('\n');
    Frame(Bytes::from(buf))
}

fn push_lines(buf: &mut String, marker: &str, text: &str) {
    for line in text.split('\n') {
        buf.push_str(marker);
        buf.push_str(line.strip_suffix('\r').unwrap_or(line));
        buf.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_data_frame() {
        assert_eq!(encode(&Event::data("7")).as_bytes(), b"data: 7\n\n");
    }

    #[test]
    fn test_encode_heartbeat_frame() {
        assert_eq!(encode(&Event::heartbeat()).as_bytes(), b": heartbeat\n\n");
    }

    #[test]
    fn test_encode_terminal_notice_uses_data_marker() {
        assert_eq!(
            encode(&Event::notice("Stream ended")).as_bytes(),
            b"data: Stream ended\n\n"
        );
    }

    #[test]
    fn test_encode_json_payload_is_compact() {
        let payload = Payload::json(&json!({"message": "Counter: 1"})).unwrap();
        assert_eq!(
            encode(&Event::Data(payload)).as_bytes(),
            b"data: {\"message\":\"Counter: 1\"}\n\n"
        );
    }

    #[test]
    fn test_encode_splits_multiline_text() {
        assert_eq!(
            encode(&Event::data("first\r\nsecond")).as_bytes(),
            b"data: first\ndata: second\n\n"
        );
        assert_eq!(
            encode(&Event::Heartbeat("a\nb".to_string())).as_bytes(),
            b": a\n: b\n\n"
        );
    }

    #[test]
    fn test_encode_empty_text_still_produces_a_frame() {
        assert_eq!(encode(&Event::data("")).as_bytes(), b"data: \n\n");
    }

    #[test]
    fn test_encode_is_deterministic_across_calls() {
        let event = Event::data("same");
        assert_eq!(encode(&event), encode(&event));
    }
}
