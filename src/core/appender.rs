//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogRecord};

/// A sink that receives already formatted lines.
///
/// Appenders are owned by a single handler inside the backend and are only
/// ever called from the thread that owns that backend.
pub trait Appender: Send {
    /// Write one formatted line. `line` carries no trailing newline.
    fn append(&mut self, record: &LogRecord<'_>, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
