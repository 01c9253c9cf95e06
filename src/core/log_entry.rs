//! Log entry, channel message and dispatch record

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Name printed for entries emitted by the unnamed root logger.
pub const ROOT_LOGGER_NAME: &str = "root";

/// One structured log record as produced by a [`Logger`](crate::Logger).
///
/// Entries carry no timestamp: the backend stamps them when they are
/// dispatched. Fields are private so an entry cannot change once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLogEntry")]
pub struct LogEntry {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    logger_name: Option<String>,
    level: LogLevel,
    message: String,
}

/// Wire form, normalized through [`LogEntry::new`]
#[derive(Deserialize)]
struct RawLogEntry {
    #[serde(default)]
    logger_name: Option<String>,
    level: LogLevel,
    message: String,
}

impl From<RawLogEntry> for LogEntry {
    fn from(raw: RawLogEntry) -> Self {
        LogEntry::new(raw.logger_name, raw.level, raw.message)
    }
}

impl LogEntry {
    pub fn new(logger_name: Option<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger_name: logger_name.filter(|name| !name.is_empty()),
            level,
            message: message.into(),
        }
    }

    /// Bound logger name, `None` for the root logger
    pub fn logger_name(&self) -> Option<&str> {
        self.logger_name.as_deref()
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Logger name as printed in output
    pub fn display_name(&self) -> &str {
        self.logger_name().unwrap_or(ROOT_LOGGER_NAME)
    }
}

/// Item travelling through the log channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Entry(LogEntry),
    /// Terminal value: the listener stops after consuming it
    Shutdown,
}

impl From<LogEntry> for Message {
    fn from(entry: LogEntry) -> Self {
        Message::Entry(entry)
    }
}

/// An entry stamped with its dispatch time, handed to formatters and appenders.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub entry: &'a LogEntry,
    pub timestamp: DateTime<Local>,
}

impl<'a> LogRecord<'a> {
    pub fn stamp(entry: &'a LogEntry) -> Self {
        Self {
            entry,
            timestamp: Local::now(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.entry.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_is_root() {
        let entry = LogEntry::new(Some(String::new()), LogLevel::Info, "x");
        assert_eq!(entry.logger_name(), None);
        assert_eq!(entry.display_name(), "root");
    }

    #[test]
    fn test_wire_form_has_no_timestamp() {
        let entry = LogEntry::new(Some("db".to_string()), LogLevel::Error, "disk full");
        let json = serde_json::to_value(&entry).unwrap();

        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object["logger_name"], "db");
        assert_eq!(object["level"], "ERROR");
        assert_eq!(object["message"], "disk full");
    }

    #[test]
    fn test_root_entry_omits_name() {
        let entry = LogEntry::new(None, LogLevel::Debug, "");
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("logger_name").is_none());

        // empty message is still a real entry, distinct from Shutdown
        assert_ne!(Message::from(entry), Message::Shutdown);
    }

    #[test]
    fn test_deserialized_empty_name_is_root() {
        let entry: LogEntry =
            serde_json::from_str(r#"{"logger_name": "", "level": "INFO", "message": "m"}"#).unwrap();
        assert_eq!(entry.logger_name(), None);
        assert_eq!(entry, LogEntry::new(None, LogLevel::Info, "m"));

        let entry: LogEntry = serde_json::from_str(r#"{"level": "ERROR", "message": "x"}"#).unwrap();
        assert_eq!(entry.display_name(), "root");

        let json = serde_json::to_string(&LogEntry::new(Some("db".into()), LogLevel::Debug, "q")).unwrap();
        let named: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(named.logger_name(), Some("db"));
    }
}
