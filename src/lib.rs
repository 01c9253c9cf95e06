//! # cqlog
//!
//! A concurrent log funnel: any number of producer threads emit log entries
//! into a shared channel, and one listener thread owns the sinks and writes
//! every entry in arrival order.
//!
//! ## Features
//!
//! - **Non-interleaved output**: a single consumer writes and flushes one
//!   line at a time
//! - **Hierarchical loggers**: `a.b.c` inherits handlers from `a.b`, `a` and
//!   the root unless propagation is turned off
//! - **Per-handler thresholds**: console and file can filter independently
//! - **Size-based rotation**: `app.log.1` .. `app.log.N`, optionally gzipped
//! - **JSON configuration** with a sensible default
//!
//! ## Quick start
//!
//! ```no_run
//! use cqlog::{Funnel, LogConfig};
//!
//! let funnel = Funnel::start(LogConfig::default()).unwrap();
//! let log = funnel.logger().clone();
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|id| {
//!         let log = log.child(format!("worker.{}", id));
//!         std::thread::spawn(move || log.info("hello"))
//!     })
//!     .collect();
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//!
//! funnel.shutdown().unwrap();
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, ConsoleStream, RotatingFileAppender, RotationPolicy};
    pub use crate::core::{
        init_log, Appender, DefaultConfig, Funnel, FunnelMetrics, LogConfig, LogEntry, LogLevel,
        Logger, LoggerError, Result,
    };
}

pub use crate::appenders::{ConsoleAppender, ConsoleStream, RotatingFileAppender, RotationPolicy};
pub use crate::core::{
    default_log_file_name, init_log, Appender, Backend, DefaultConfig, Formatter, FormatterConfig,
    Funnel, FunnelBuilder, FunnelMetrics, Handler, HandlerConfig, ListenerState, LogChannel,
    LogConfig, LogEntry, LogLevel, LogReceiver, LogRecord, LogSender, Logger, LoggerConfig,
    LoggerError, Message, Result, RootConfig, DEFAULT_SHUTDOWN_TIMEOUT,
};
