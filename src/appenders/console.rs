//! Console appender implementation

use crate::core::{Appender, LogRecord, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Standard stream a console appender writes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    #[default]
    Stderr,
    Stdout,
}

pub struct ConsoleAppender {
    stream: ConsoleStream,
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            stream: ConsoleStream::default(),
            use_colors: false,
        }
    }

    /// Color whole lines by level
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Select stdout or stderr
    ///
    /// ```
    /// use cqlog::appenders::{ConsoleAppender, ConsoleStream};
    ///
    /// let appender = ConsoleAppender::new().with_stream(ConsoleStream::Stdout);
    /// ```
    #[must_use]
    pub fn with_stream(mut self, stream: ConsoleStream) -> Self {
        self.stream = stream;
        self
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, record: &LogRecord<'_>, line: &str) -> Result<()> {
        let output = if self.use_colors {
            line.color(record.level().color_code()).to_string()
        } else {
            line.to_string()
        };

        match self.stream {
            ConsoleStream::Stderr => writeln!(std::io::stderr().lock(), "{}", output)?,
            ConsoleStream::Stdout => writeln!(std::io::stdout().lock(), "{}", output)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stderr => std::io::stderr().flush()?,
            ConsoleStream::Stdout => std::io::stdout().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
