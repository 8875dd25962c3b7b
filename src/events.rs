//! The stdout JSON-lines protocol consumed by the host application.

use std::io::{self, Write};

use serde::Serialize;

/// One observable line of turn output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TurnEvent {
    Token { token: String },
    Final { text: String, finish_reason: String },
    Error { message: String },
}

impl TurnEvent {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token {
            token: token.into(),
        }
    }

    pub fn final_text(text: impl Into<String>, finish_reason: impl Into<String>) -> Self {
        Self::Final {
            text: text.into(),
            finish_reason: finish_reason.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Writes one JSON document per line, flushing after each so a live consumer
/// sees tokens as they arrive.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn emit(&mut self, event: &TurnEvent) -> io::Result<()> {
        let line = serde_json::to_string(event).map_err(io::Error::other)?;
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_to_the_wire_shape() {
        let token = serde_json::to_string(&TurnEvent::token("Hel"))
            .expect("token event should serialize");
        assert_eq!(token, r#"{"type":"token","token":"Hel"}"#);

        let final_event = serde_json::to_string(&TurnEvent::final_text("Hello", "stop"))
            .expect("final event should serialize");
        assert_eq!(
            final_event,
            r#"{"type":"final","text":"Hello","finish_reason":"stop"}"#
        );

        let error = serde_json::to_string(&TurnEvent::error("boom"))
            .expect("error event should serialize");
        assert_eq!(error, r#"{"type":"error","message":"boom"}"#);
    }

    #[test]
    fn sink_writes_one_line_per_event() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(&TurnEvent::token("Hel"))
            .expect("token should emit");
        sink.emit(&TurnEvent::final_text("Hello", "stop"))
            .expect("final should emit");

        let out = String::from_utf8(sink.into_inner()).expect("output should be UTF-8");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""type":"token""#));
        assert!(lines[1].contains(r#""type":"final""#));
        assert!(out.ends_with('\n'));
    }
}
