//! Formatting and dispatch backend
//!
//! A [`Backend`] is built once from a [`LogConfig`] and then owned by whoever
//! writes: the listener thread in concurrent mode, a mutex in direct mode.
//! Dispatch resolves the handler set from the entry's logger name, walking
//! `a.b.c` → `a.b` → `a` → root and stopping early at a logger configured
//! with `propagate: false`.

use super::{
    appender::Appender,
    config::{HandlerConfig, LogConfig},
    error::{LoggerError, Result},
    formatter::Formatter,
    log_entry::{LogEntry, LogRecord},
    log_level::LogLevel,
    metrics::FunnelMetrics,
};
use crate::appenders::{ConsoleAppender, RotatingFileAppender, RotationPolicy};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// A sink with its own threshold and layout
pub struct Handler {
    name: String,
    level: LogLevel,
    formatter: Formatter,
    appender: Box<dyn Appender>,
}

impl Handler {
    pub fn new(
        name: impl Into<String>,
        level: LogLevel,
        formatter: Formatter,
        appender: Box<dyn Appender>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            formatter,
            appender,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn emit(&mut self, record: &LogRecord<'_>) -> Result<()> {
        if record.level() < self.level {
            return Ok(());
        }
        let line = self.formatter.format(record);
        self.appender.append(record, &line)?;
        self.appender.flush()
    }
}

#[derive(Debug, Clone)]
struct LoggerNode {
    level: Option<LogLevel>,
    handlers: Vec<usize>,
    propagate: bool,
}

pub struct Backend {
    handlers: Vec<Handler>,
    root: LoggerNode,
    loggers: HashMap<String, LoggerNode>,
}

impl Backend {
    /// Root logger at DEBUG with no handlers
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            root: LoggerNode {
                level: Some(LogLevel::Debug),
                handlers: Vec::new(),
                propagate: false,
            },
            loggers: HashMap::new(),
        }
    }

    /// Build every formatter and sink described by `config`.
    ///
    /// Opens (and creates the directories of) every file sink.
    ///
    /// # Errors
    ///
    /// Configuration errors for dangling references or bad templates, IO
    /// errors when a file sink cannot be opened.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        config.validate()?;

        let mut formatters = HashMap::new();
        for (name, formatter) in &config.formatters {
            let compiled = Formatter::new(&formatter.format, &formatter.datefmt).map_err(|e| match e {
                LoggerError::InvalidConfiguration { message, .. } => {
                    LoggerError::config(format!("formatters.{}", name), message)
                }
                other => other,
            })?;
            formatters.insert(name.as_str(), compiled);
        }

        let mut backend = Self::new();
        let mut indices = HashMap::new();
        for (name, handler) in &config.handlers {
            // validate() guarantees the reference resolves
            let formatter = formatters
                .get(handler.formatter())
                .cloned()
                .ok_or_else(|| LoggerError::config(format!("handlers.{}", name), "unknown formatter"))?;
            let appender: Box<dyn Appender> = match handler {
                HandlerConfig::Console { stream, colors, .. } => Box::new(
                    ConsoleAppender::new()
                        .with_stream(*stream)
                        .with_colors(*colors),
                ),
                HandlerConfig::RotatingFile {
                    path,
                    max_bytes,
                    backup_count,
                    compress,
                    ..
                } => Box::new(RotatingFileAppender::with_policy(
                    path,
                    RotationPolicy::new()
                        .with_max_bytes(*max_bytes)
                        .with_backup_count(*backup_count)
                        .with_compression(*compress),
                )?),
            };
            indices.insert(name.as_str(), backend.handlers.len());
            backend
                .handlers
                .push(Handler::new(name.clone(), handler.level(), formatter, appender));
        }

        let resolve = |names: &[String]| -> Vec<usize> {
            names.iter().filter_map(|n| indices.get(n.as_str()).copied()).collect()
        };

        backend.root = LoggerNode {
            level: Some(config.root.level),
            handlers: resolve(&config.root.handlers),
            propagate: false,
        };
        for (name, logger) in &config.loggers {
            backend.loggers.insert(
                name.clone(),
                LoggerNode {
                    level: logger.level,
                    handlers: resolve(&logger.handlers),
                    propagate: logger.propagate,
                },
            );
        }

        Ok(backend)
    }

    /// Attach an extra handler to the root logger
    pub fn add_root_handler(&mut self, handler: Handler) {
        self.root.handlers.push(self.handlers.len());
        self.handlers.push(handler);
    }

    /// Swap the sink of a configured handler, keeping its level and formatter.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no handler has that name.
    pub fn replace_appender(&mut self, handler: &str, appender: Box<dyn Appender>) -> Result<()> {
        let slot = self
            .handlers
            .iter_mut()
            .find(|h| h.name == handler)
            .ok_or_else(|| LoggerError::config("handlers", format!("unknown handler '{}'", handler)))?;
        slot.appender = appender;
        Ok(())
    }

    /// Ancestry of a logger name, most specific first, root excluded
    fn lineage(name: Option<&str>) -> impl Iterator<Item = &str> {
        std::iter::successors(name.filter(|n| !n.is_empty()), |n| {
            let n: &str = *n;
            n.rfind('.').map(|dot| &n[..dot])
        })
    }

    /// Effective threshold of a logger: its own level or its nearest ancestor's
    pub fn effective_level(&self, name: Option<&str>) -> LogLevel {
        Self::lineage(name)
            .filter_map(|n| self.loggers.get(n).and_then(|node| node.level))
            .next()
            .or(self.root.level)
            .unwrap_or_default()
    }

    pub fn is_enabled_for(&self, name: Option<&str>, level: LogLevel) -> bool {
        level >= self.effective_level(name)
    }

    /// Indices of the handlers an entry from `name` reaches
    fn targets(&self, name: Option<&str>) -> Vec<usize> {
        let mut targets = Vec::new();
        for node in Self::lineage(name).filter_map(|n| self.loggers.get(n)) {
            targets.extend_from_slice(&node.handlers);
            if !node.propagate {
                return targets;
            }
        }
        targets.extend_from_slice(&self.root.handlers);
        targets
    }

    /// Stamp, format and write one entry to every handler it reaches.
    ///
    /// Logger levels are not consulted here; only each handler's own
    /// threshold filters. A handler that fails or panics is reported on
    /// stderr and does not stop the others. Returns the number of failures.
    pub fn handle(&mut self, entry: &LogEntry) -> usize {
        let record = LogRecord::stamp(entry);
        let mut failures = 0;

        for idx in self.targets(entry.logger_name()) {
            let handler = &mut self.handlers[idx];
            let result = catch_unwind(AssertUnwindSafe(|| handler.emit(&record)));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Handler '{}' failed: {}", handler.name, e);
                    failures += 1;
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGGER ERROR] Handler '{}' panicked: {}. Other handlers continue to function.",
                        handler.name, panic_msg
                    );
                    failures += 1;
                }
            }
        }

        failures
    }

    /// [`handle`](Self::handle), recording the outcome in `metrics`
    pub fn handle_counted(&mut self, entry: &LogEntry, metrics: &FunnelMetrics) {
        for _ in 0..self.handle(entry) {
            metrics.record_handler_failure();
        }
        metrics.record_dispatched();
    }

    pub fn flush(&mut self) -> Result<()> {
        let mut first_error = None;
        for handler in &mut self.handlers {
            if let Err(e) = handler.appender.flush() {
                eprintln!("[LOGGER ERROR] Handler '{}' flush failed: {}", handler.name, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}
