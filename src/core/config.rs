//! Backend configuration
//!
//! A [`LogConfig`] names formatters and handlers and binds handlers to the
//! root logger and to named loggers. It deserializes from JSON:
//!
//! ```
//! use cqlog::LogConfig;
//!
//! let config = LogConfig::from_json_str(r#"{
//!     "formatters": { "short": { "format": "{level} {message}" } },
//!     "handlers": {
//!         "console": { "kind": "console", "formatter": "short", "level": "DEBUG" },
//!         "file": {
//!             "kind": "rotating-file", "formatter": "short", "level": "INFO",
//!             "path": "logs/app.log", "maxBytes": 1048576, "backupCount": 3
//!         }
//!     },
//!     "root": { "level": "DEBUG", "handlers": ["console", "file"] }
//! }"#).unwrap();
//!
//! assert_eq!(config.handlers.len(), 2);
//! ```

use super::error::{LoggerError, Result};
use super::formatter::{DEFAULT_DATE_FORMAT, DEFAULT_FORMAT};
use super::log_level::LogLevel;
use crate::appenders::console::ConsoleStream;
use crate::appenders::rotating_file::{DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_VERSION: u32 = 1;
pub const FALLBACK_LOG_FILE: &str = "cqlog.log";

const DETAILED_FORMATTER: &str = "detailed";
const CONSOLE_HANDLER: &str = "console";
const FILE_HANDLER: &str = "file";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatterConfig {
    pub format: String,
    #[serde(default = "default_datefmt")]
    pub datefmt: String,
}

fn default_datefmt() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            datefmt: default_datefmt(),
        }
    }
}

/// A named sink together with its layout and threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HandlerConfig {
    Console {
        formatter: String,
        #[serde(default)]
        level: LogLevel,
        #[serde(default)]
        stream: ConsoleStream,
        #[serde(default)]
        colors: bool,
    },
    RotatingFile {
        formatter: String,
        #[serde(default)]
        level: LogLevel,
        path: PathBuf,
        #[serde(rename = "maxBytes", default = "default_max_bytes")]
        max_bytes: u64,
        #[serde(rename = "backupCount", default = "default_backup_count")]
        backup_count: usize,
        #[serde(default)]
        compress: bool,
    },
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_backup_count() -> usize {
    DEFAULT_BACKUP_COUNT
}

impl HandlerConfig {
    pub fn formatter(&self) -> &str {
        match self {
            HandlerConfig::Console { formatter, .. } | HandlerConfig::RotatingFile { formatter, .. } => {
                formatter
            }
        }
    }

    pub fn level(&self) -> LogLevel {
        match self {
            HandlerConfig::Console { level, .. } | HandlerConfig::RotatingFile { level, .. } => *level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub handlers: Vec<String>,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            handlers: Vec::new(),
        }
    }
}

/// Settings of a named logger such as `db` or `db.pool`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// Threshold consulted by direct-mode loggers; inherited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub handlers: Vec<String>,
    /// Whether entries also reach the ancestors' handlers
    #[serde(default = "default_propagate")]
    pub propagate: bool,
}

fn default_propagate() -> bool {
    true
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: None,
            handlers: Vec::new(),
            propagate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub formatters: BTreeMap<String, FormatterConfig>,
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerConfig>,
    #[serde(default)]
    pub root: RootConfig,
    #[serde(default)]
    pub loggers: BTreeMap<String, LoggerConfig>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl LogConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LogConfig = serde_json::from_str(json)
            .map_err(|e| LoggerError::config("LogConfig", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "read log configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    /// Check every cross-reference.
    ///
    /// Formatter templates themselves are compiled when the backend is built.
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(LoggerError::config(
                "version",
                format!("unsupported version {}, expected {}", self.version, CONFIG_VERSION),
            ));
        }

        for (name, handler) in &self.handlers {
            if !self.formatters.contains_key(handler.formatter()) {
                return Err(LoggerError::config(
                    format!("handlers.{}", name),
                    format!("unknown formatter '{}'", handler.formatter()),
                ));
            }
            if let HandlerConfig::RotatingFile { path, .. } = handler {
                if path.as_os_str().is_empty() {
                    return Err(LoggerError::config(format!("handlers.{}", name), "empty file path"));
                }
            }
        }

        let bindings = std::iter::once(("root".to_string(), &self.root.handlers)).chain(
            self.loggers
                .iter()
                .map(|(name, logger)| (format!("loggers.{}", name), &logger.handlers)),
        );
        for (owner, handlers) in bindings {
            if let Some(missing) = handlers.iter().find(|h| !self.handlers.contains_key(*h)) {
                return Err(LoggerError::config(owner, format!("unknown handler '{}'", missing)));
            }
        }

        if let Some(name) = self.loggers.keys().find(|name| name.is_empty()) {
            return Err(LoggerError::config(
                format!("loggers.{}", name),
                "empty logger name, configure the root logger under 'root'",
            ));
        }

        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        DefaultConfig::new().build()
    }
}

/// Builder for the stock console + rotating file configuration
///
/// ```
/// use cqlog::{DefaultConfig, LogLevel};
///
/// let config = DefaultConfig::new()
///     .file_name("logs/worker.log")
///     .max_bytes(1024 * 1024)
///     .console_level(LogLevel::Info)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct DefaultConfig {
    file_name: Option<PathBuf>,
    max_bytes: u64,
    backup_count: usize,
    console_level: LogLevel,
    file_level: LogLevel,
}

impl DefaultConfig {
    pub fn new() -> Self {
        Self {
            file_name: None,
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            console_level: LogLevel::Debug,
            file_level: LogLevel::Info,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_name = Some(path.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console_level(mut self, level: LogLevel) -> Self {
        self.console_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_level(mut self, level: LogLevel) -> Self {
        self.file_level = level;
        self
    }

    pub fn build(self) -> LogConfig {
        let path = self
            .file_name
            .unwrap_or_else(|| PathBuf::from(default_log_file_name()));

        let formatters = BTreeMap::from([(DETAILED_FORMATTER.to_string(), FormatterConfig::default())]);
        let handlers = BTreeMap::from([
            (
                CONSOLE_HANDLER.to_string(),
                HandlerConfig::Console {
                    formatter: DETAILED_FORMATTER.to_string(),
                    level: self.console_level,
                    stream: ConsoleStream::Stderr,
                    colors: false,
                },
            ),
            (
                FILE_HANDLER.to_string(),
                HandlerConfig::RotatingFile {
                    formatter: DETAILED_FORMATTER.to_string(),
                    level: self.file_level,
                    path,
                    max_bytes: self.max_bytes,
                    backup_count: self.backup_count,
                    compress: false,
                },
            ),
        ]);

        LogConfig {
            version: CONFIG_VERSION,
            formatters,
            handlers,
            root: RootConfig {
                level: LogLevel::Debug,
                handlers: vec![CONSOLE_HANDLER.to_string(), FILE_HANDLER.to_string()],
            },
            loggers: BTreeMap::new(),
        }
    }
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Log file name derived from the running program: `server` or `server.exe`
/// both give `server.log`.
pub fn default_log_file_name() -> String {
    log_file_name_for(std::env::args().next().as_deref().unwrap_or(""))
}

/// Keep the part of the program's base name before its first `.` and add
/// `.log`. A dot-file such as `.hidden` gives `.log`; only an empty base name
/// falls back to `cqlog.log`.
pub fn log_file_name_for(program: &str) -> String {
    let base = Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");

    if base.is_empty() {
        return FALLBACK_LOG_FILE.to_string();
    }
    let stem = base.split('.').next().unwrap_or("");
    format!("{}.log", stem)
}
