//! Sinks the listener writes formatted lines to

pub mod console;
pub mod rotating_file;

pub use console::{ConsoleAppender, ConsoleStream};
pub use rotating_file::{RotatingFileAppender, RotationPolicy};

pub use crate::core::Appender;
