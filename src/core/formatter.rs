//! Line formatter driven by a text template
//!
//! Templates use `{placeholder}` fields:
//!
//! | Placeholder   | Value                                   |
//! |---------------|-----------------------------------------|
//! | `{level}`     | `DEBUG`, `INFO`, `WARNING`, ...         |
//! | `{timestamp}` | dispatch time rendered with `datefmt`   |
//! | `{message}`   | the entry message                       |
//! | `{name}`      | logger name, `root` for the root logger |
//!
//! Literal braces are written `{{` and `}}`.

use super::error::{LoggerError, Result};
use super::log_entry::LogRecord;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;

pub const DEFAULT_FORMAT: &str = "{level} {timestamp}  {message}";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Level,
    Timestamp,
    Message,
    Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone)]
pub struct Formatter {
    segments: Vec<Segment>,
    date_format: String,
}

impl Formatter {
    /// Compile a template and strftime date format.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown placeholders, unbalanced
    /// braces or an invalid date format.
    pub fn new(template: &str, date_format: &str) -> Result<Self> {
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "formatter",
                format!("invalid datefmt '{}'", date_format),
            ));
        }

        Ok(Self {
            segments: parse_template(template)?,
            date_format: date_format.to_string(),
        })
    }

    /// Render a record as a single line, without trailing newline
    pub fn format(&self, record: &LogRecord<'_>) -> String {
        let mut line = String::with_capacity(64 + record.entry.message().len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Field(Field::Level) => line.push_str(record.level().to_str()),
                Segment::Field(Field::Message) => line.push_str(record.entry.message()),
                Segment::Field(Field::Name) => line.push_str(record.entry.display_name()),
                Segment::Field(Field::Timestamp) => {
                    // date format was validated in new()
                    let _ = write!(line, "{}", record.timestamp.format(&self.date_format));
                }
            }
        }
        line
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            segments: vec![
                Segment::Field(Field::Level),
                Segment::Literal(" ".to_string()),
                Segment::Field(Field::Timestamp),
                Segment::Literal("  ".to_string()),
                Segment::Field(Field::Message),
            ],
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

fn parse_template(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(LoggerError::config(
                                "formatter",
                                format!("unterminated placeholder in '{}'", template),
                            ))
                        }
                    }
                }
                let field = match name.as_str() {
                    "level" => Field::Level,
                    "timestamp" => Field::Timestamp,
                    "message" => Field::Message,
                    "name" => Field::Name,
                    other => {
                        return Err(LoggerError::config(
                            "formatter",
                            format!("unknown placeholder '{{{}}}'", other),
                        ))
                    }
                };
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(field));
            }
            '}' => {
                return Err(LoggerError::config(
                    "formatter",
                    format!("unmatched '}}' in '{}'", template),
                ))
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
