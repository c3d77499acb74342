//! Structured logger adapter emitting one line per event.

use crate::log_sink::LogSink;
use codescope_config::LogFormat;
use codescope_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use codescope_shared::{REDACTED, is_secret_key};
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Logger writing JSON (or `key=value` text) lines to a [`LogSink`].
///
/// Fields whose key looks like a secret are replaced with `[REDACTED]`,
/// recursively, before anything is written.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    base_fields: LogFields,
    min_level: LogLevel,
    format: LogFormat,
}

impl JsonLogger {
    /// Create a logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
        }
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the line format.
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn render(&self, event: LogEvent) -> String {
        let mut fields = self.base_fields.clone();
        fields.extend(event.fields.unwrap_or_default());
        redact_fields(&mut fields);

        let mut error = event.error;
        if let Some(value) = error.as_mut() {
            redact_value(value);
        }

        match self.format {
            LogFormat::Json => render_json(&event.event, event.level, &event.message, &fields, error),
            LogFormat::Text => render_text(&event.event, event.level, &event.message, &fields, error.as_ref()),
        }
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }
        let line = self.render(event);
        self.sink.write_line(&line);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            sink: Arc::clone(&self.sink),
            base_fields: merged,
            min_level: self.min_level,
            format: self.format,
        })
    }
}

fn render_json(
    event: &str,
    level: LogLevel,
    message: &str,
    fields: &LogFields,
    error: Option<Value>,
) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert("timestampMs".to_owned(), Value::from(now_epoch_ms()));
    payload.insert("level".to_owned(), Value::from(level.as_str()));
    payload.insert("event".to_owned(), Value::from(event));
    payload.insert("message".to_owned(), Value::from(message));
    if !fields.is_empty() {
        let map = fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        payload.insert("fields".to_owned(), Value::Object(map));
    }
    if let Some(error) = error {
        payload.insert("error".to_owned(), error);
    }

    serde_json::to_string(&Value::Object(payload)).map_or_else(
        |_| {
            "{\"timestampMs\":0,\"level\":\"error\",\"event\":\"logger.serialize_failed\",\"message\":\"log serialization failed\"}\n"
                .to_owned()
        },
        |mut encoded| {
            encoded.push('\n');
            encoded
        },
    )
}

fn render_text(
    event: &str,
    level: LogLevel,
    message: &str,
    fields: &LogFields,
    error: Option<&Value>,
) -> String {
    let mut line = format!("{:<5} {event}: {message}", level.as_str().to_ascii_uppercase());
    for (key, value) in fields {
        let _ = write!(line, " {key}={}", text_value(value));
    }
    if let Some(code) = error.and_then(error_code_text) {
        let _ = write!(line, " error={code}");
    }
    line.push('\n');
    line
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn error_code_text(error: &Value) -> Option<String> {
    let code = error.get("code")?;
    let namespace = code.get("namespace")?.as_str()?;
    let name = code.get("code")?.as_str()?;
    Some(format!("{namespace}:{name}"))
}

fn redact_fields(fields: &mut LogFields) {
    for (key, value) in fields.iter_mut() {
        if is_secret_key(key) {
            *value = Value::from(REDACTED);
        } else {
            redact_value(value);
        }
    }
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if is_secret_key(key) {
                    *nested = Value::from(REDACTED);
                } else {
                    redact_value(nested);
                }
            }
        },
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {},
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}
