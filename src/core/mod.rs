//! Core funnel types: entries, the channel, the listener and the logger facade

pub mod appender;
pub mod backend;
pub mod channel;
pub mod config;
pub mod error;
pub mod formatter;
pub mod funnel;
pub mod listener;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;

pub use appender::Appender;
pub use backend::{Backend, Handler};
pub use channel::{LogChannel, LogReceiver, LogSender};
pub use config::{
    default_log_file_name, log_file_name_for, DefaultConfig, FormatterConfig, HandlerConfig,
    LogConfig, LoggerConfig, RootConfig,
};
pub use error::{LoggerError, Result};
pub use formatter::{Formatter, DEFAULT_DATE_FORMAT, DEFAULT_FORMAT};
pub use funnel::{init_log, Funnel, FunnelBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use listener::{Listener, ListenerState};
pub use log_entry::{LogEntry, LogRecord, Message, ROOT_LOGGER_NAME};
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::FunnelMetrics;
