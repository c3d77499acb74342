//! Structured logging boundary contract.

use codescope_shared::ErrorEnvelope;
use std::collections::BTreeMap;

/// Log level, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Parse a level name (case-insensitive; `warning` is accepted).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Lowercase level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Additional event fields.
pub type LogFields = BTreeMap<Box<str>, serde_json::Value>;

/// Structured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Stable event name (e.g. `export.completed`).
    pub event: Box<str>,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message (safe, redacted).
    pub message: Box<str>,
    /// Optional structured fields.
    pub fields: Option<LogFields>,
    /// Optional error payload.
    pub error: Option<serde_json::Value>,
}

impl LogEvent {
    fn new(level: LogLevel, event: &str, message: &str, fields: Option<LogFields>) -> Self {
        Self {
            event: Box::from(event),
            level,
            message: Box::from(message),
            fields,
            error: None,
        }
    }
}

/// Boundary contract for structured logging.
pub trait LoggerPort: Send + Sync {
    /// Emit a structured event.
    fn log(&self, event: LogEvent);

    /// Create a child logger with base fields applied to every event.
    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort>;

    /// Convenience: debug event.
    fn debug(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Debug, event, message, fields));
    }

    /// Convenience: info event.
    fn info(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Info, event, message, fields));
    }

    /// Convenience: warn event.
    fn warn(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Warn, event, message, fields));
    }

    /// Error event carrying the serialized envelope.
    fn error(&self, event: &str, error: &ErrorEnvelope, fields: Option<LogFields>) {
        let mut log_event = LogEvent::new(LogLevel::Error, event, &error.message, fields);
        log_event.error = serde_json::to_value(error).ok();
        self.log(log_event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_shared::ErrorCode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Captured(Mutex<Vec<LogEvent>>);

    impl LoggerPort for Captured {
        fn log(&self, event: LogEvent) {
            if let Ok(mut events) = self.0.lock() {
                events.push(event);
            }
        }

        fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
            Box::new(Self::default())
        }
    }

    #[test]
    fn level_parse_and_order() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
        assert!(LogLevel::Debug < LogLevel::Error);
        assert_eq!(LogLevel::Info.as_str(), "info");
    }

    #[test]
    fn error_helper_attaches_envelope() {
        let logger = Captured::default();
        let error = ErrorEnvelope::expected(ErrorCode::new("export", "no_data"), "nothing");
        logger.error("export.failed", &error, None);

        let events = logger.0.lock().map(|events| events.clone()).unwrap_or_default();
        let event = events.first();
        assert_eq!(event.map(|event| event.level), Some(LogLevel::Error));
        assert_eq!(event.map(|event| &*event.message), Some("nothing"));
        assert_eq!(
            event
                .and_then(|event| event.error.as_ref())
                .and_then(|error| error.get("message"))
                .and_then(serde_json::Value::as_str),
            Some("nothing")
        );
    }
}
