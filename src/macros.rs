//! Logging macros for `format!`-style messages.
//!
//! # Examples
//!
//! ```no_run
//! use cqlog::{info, init_log};
//!
//! let log = init_log(true, None).unwrap();
//!
//! info!(log, "Server started");
//!
//! let port = 8080;
//! info!(log, "Server listening on port {}", port);
//! ```

/// Log a message at an explicit level.
///
/// ```no_run
/// # let logger = cqlog::init_log(false, None).unwrap();
/// use cqlog::{log, LogLevel};
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log at the most severe level.
///
/// ```no_run
/// # let logger = cqlog::init_log(false, None).unwrap();
/// use cqlog::critical;
/// critical!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}
