//! Structured JSON logger
//!
//! - One log line = one event
//! - Deterministic key ordering
//! - Synchronous, no buffering

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

/// Log severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace,
    /// Normal operations
    Info,
    /// Recoverable issues
    Warn,
    /// Operation failures
    Error,
}

impl Severity {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured logger emitting one JSON object per event.
pub struct Logger;

impl Logger {
    /// Logs an event with the given severity and fields.
    ///
    /// WARN and above go to stderr, everything else to stdout.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = render(severity, event, fields);
        if severity >= Severity::Warn {
            let _ = writeln!(io::stderr(), "{}", line);
        } else {
            let _ = writeln!(io::stdout(), "{}", line);
        }
    }

    /// Logs at INFO level.
    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    /// Logs at WARN level.
    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    /// Logs at ERROR level.
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

/// Renders one event as a single JSON line.
///
/// Keys are ordered alphabetically (BTreeMap), so identical events always
/// render identically.
fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut object: BTreeMap<String, Value> = BTreeMap::new();
    object.insert("event".into(), Value::String(event.into()));
    object.insert("severity".into(), Value::String(severity.as_str().into()));
    for (key, value) in fields {
        object.insert((*key).into(), Value::String((*value).into()));
    }

    serde_json::to_string(&object).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_render_is_valid_json() {
        let line = render(Severity::Info, "VALIDATE_COMPLETE", &[("fields", "3")]);
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "VALIDATE_COMPLETE");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["fields"], "3");
    }

    #[test]
    fn test_render_event_first() {
        let line = render(Severity::Warn, "COERCE_ROLLBACK", &[("key", "geom")]);
        let event_pos = line.find("\"event\"").unwrap();
        let key_pos = line.find("\"key\"").unwrap();
        assert!(event_pos < key_pos);
    }

    #[test]
    fn test_render_deterministic() {
        let a = render(Severity::Info, "E", &[("b", "2"), ("a", "1")]);
        let b = render(Severity::Info, "E", &[("a", "1"), ("b", "2")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_escapes() {
        let line = render(Severity::Info, "E", &[("msg", "quote \" and\nnewline")]);
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["msg"], "quote \" and\nnewline");
    }
}
