//! Leveled logger handed explicitly to the code that reports failures.
//!
//! A [`Logger`] filters by minimum level and forwards [`LogRecord`]s to a
//! [`LogSink`]. The default sink emits `tracing` events, so output ends up
//! wherever the process-wide subscriber (see [`crate::logging`]) sends it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => anyhow::bail!("unknown log level: {}", other),
        }
    }
}

/// One log call as seen by a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub context: Map<String, Value>,
    pub error: Option<String>,
}

/// Destination for log records.
pub trait LogSink: Send + Sync {
    fn write(&self, record: &LogRecord);
}

/// Forwards records to `tracing`, with the context rendered as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, record: &LogRecord) {
        let context = Value::Object(record.context.clone());
        let error = record.error.as_deref().unwrap_or("");
        match record.level {
            LogLevel::Debug => {
                tracing::debug!(%context, error, "{}", record.message)
            }
            LogLevel::Info => tracing::info!(%context, error, "{}", record.message),
            LogLevel::Warn => tracing::warn!(%context, error, "{}", record.message),
            LogLevel::Error => {
                tracing::error!(%context, error, "{}", record.message)
            }
        }
    }
}

/// Keeps records in memory. Useful for tests and for surfacing recent log lines.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// Leveled logger. Cheap to clone; clones share the sink.
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger {
    /// Logger writing to `tracing` at or above `min_level`.
    pub fn new(min_level: LogLevel) -> Self {
        Self::with_sink(min_level, Arc::new(TracingSink))
    }

    pub fn with_sink(min_level: LogLevel, sink: Arc<dyn LogSink>) -> Self {
        Self { min_level, sink }
    }

    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub fn log(
        &self,
        level: LogLevel,
        message: &str,
        context: Map<String, Value>,
        error: Option<&dyn std::error::Error>,
    ) {
        if !self.enabled(level) {
            return;
        }
        self.sink.write(&LogRecord {
            level,
            message: message.to_string(),
            context,
            error: error.map(|e| e.to_string()),
        });
    }

    pub fn debug(&self, message: &str, context: Map<String, Value>) {
        self.log(LogLevel::Debug, message, context, None);
    }

    pub fn info(&self, message: &str, context: Map<String, Value>) {
        self.log(LogLevel::Info, message, context, None);
    }

    pub fn warn(&self, message: &str, context: Map<String, Value>, error: Option<&dyn std::error::Error>) {
        self.log(LogLevel::Warn, message, context, error);
    }

    pub fn error(&self, message: &str, context: Map<String, Value>, error: Option<&dyn std::error::Error>) {
        self.log(LogLevel::Error, message, context, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn level_parsing_and_order() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn filters_below_min_level() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::with_sink(LogLevel::Warn, sink.clone());
        logger.debug("dropped", Map::new());
        logger.info("dropped", Map::new());
        logger.warn("kept", ctx(json!({"attempt": 1})), None);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept");
        assert_eq!(records[0].context["attempt"], 1);
    }

    #[test]
    fn error_is_rendered() {
        let sink = Arc::new(MemorySink::new());
        let mut logger = Logger::with_sink(LogLevel::Error, sink.clone());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        logger.error("request failed", Map::new(), Some(&io));
        logger.set_level(LogLevel::Debug);
        logger.debug("now visible", Map::new());
        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].error.as_deref(), Some("socket closed"));
        assert_eq!(records[1].level, LogLevel::Debug);
    }

    #[test]
    fn tracing_sink_does_not_panic_without_subscriber() {
        Logger::new(LogLevel::Debug).warn("no subscriber", ctx(json!({"k": "v"})), None);
    }
}
