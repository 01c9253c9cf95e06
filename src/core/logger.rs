//! Producer-facing logger handle

use super::{
    backend::Backend,
    channel::LogSender,
    error::Result,
    listener::Listener,
    log_entry::LogEntry,
    log_level::LogLevel,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Listener owned by a family of loggers, joined on shutdown or when the
/// last handle is dropped
#[derive(Default)]
struct ListenerSlot(Mutex<Option<Listener>>);

impl ListenerSlot {
    fn join(&self) {
        // take it out first so the lock is not held while draining
        let listener = self.0.lock().take();
        if let Some(listener) = listener {
            if let Err(e) = listener.join() {
                eprintln!("[LOGGER ERROR] Failed to join listener: {}", e);
            }
        }
    }
}

impl Drop for ListenerSlot {
    fn drop(&mut self) {
        // every sender is gone by now, so the listener drains and stops
        self.join();
    }
}

#[derive(Clone)]
enum Sink {
    /// Concurrent mode: entries go to the listener through the channel.
    /// `sender` is declared first so it is dropped before the slot is joined.
    Channel {
        sender: LogSender,
        listener: Arc<ListenerSlot>,
    },
    /// Direct mode: entries are written by the calling thread
    Direct(Arc<Mutex<Backend>>),
}

/// Handle producers log through.
///
/// Cloning is cheap and every clone, like every [`child`](Self::child),
/// shares the same channel or backend. Emission is fire-and-forget: nothing
/// reports whether an entry was eventually written.
///
/// # Example
///
/// ```no_run
/// use cqlog::init_log;
///
/// let log = init_log(true, None).unwrap();
/// log.info("service started");
///
/// let db = log.child("db");
/// db.warning("slow query");
/// ```
#[derive(Clone)]
pub struct Logger {
    sink: Sink,
    name: Option<Arc<str>>,
}

impl Logger {
    /// Root logger feeding a log channel drained by someone else
    #[must_use]
    pub fn with_channel(sender: LogSender) -> Self {
        Self {
            sink: Sink::Channel {
                sender,
                listener: Arc::default(),
            },
            name: None,
        }
    }

    /// Root logger that also owns the listener draining `sender`'s channel.
    ///
    /// [`shutdown`](Self::shutdown) on any handle derived from it waits for
    /// the listener to write everything queued before the sentinel. Dropping
    /// the last handle without a shutdown has the same effect.
    #[must_use]
    pub fn with_listener(sender: LogSender, listener: Listener) -> Self {
        Self {
            sink: Sink::Channel {
                sender,
                listener: Arc::new(ListenerSlot(Mutex::new(Some(listener)))),
            },
            name: None,
        }
    }

    /// Root logger writing straight to `backend` from the calling thread
    #[must_use]
    pub fn direct(backend: Backend) -> Self {
        Self {
            sink: Sink::Direct(Arc::new(Mutex::new(backend))),
            name: None,
        }
    }

    /// Bound logger name, `None` for the root logger
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_concurrent(&self) -> bool {
        matches!(self.sink, Sink::Channel { .. })
    }

    /// A logger bound to `name` that shares this logger's channel or backend.
    ///
    /// The name is absolute (`child("db")` on a logger named `app` is `db`,
    /// not `app.db`); use dots to place it in the hierarchy.
    #[must_use]
    pub fn child(&self, name: impl AsRef<str>) -> Logger {
        let name = name.as_ref();
        Logger {
            sink: self.sink.clone(),
            name: (!name.is_empty()).then(|| Arc::from(name)),
        }
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        match &self.sink {
            Sink::Channel { sender, .. } => {
                let entry = LogEntry::new(self.name.as_deref().map(String::from), level, message);
                // listener already gone: entries are dropped, as after a crash
                let _ = sender.enqueue(entry);
            }
            Sink::Direct(backend) => {
                let mut backend = backend.lock();
                if backend.is_enabled_for(self.name(), level) {
                    let entry = LogEntry::new(self.name.as_deref().map(String::from), level, message);
                    backend.handle(&entry);
                }
            }
        }
    }

    /// Emit through an operation chosen at runtime by name.
    ///
    /// # Errors
    ///
    /// [`LoggerError::UnknownCapability`](super::LoggerError::UnknownCapability)
    /// for anything but `debug`, `info`, `warning`, `error` and `critical`.
    /// Nothing is enqueued in that case.
    pub fn emit(&self, operation: &str, message: impl Into<String>) -> Result<()> {
        let level = LogLevel::from_operation(operation)?;
        self.log(level, message);
        Ok(())
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }

    /// Ask the listener to stop once it has written everything queued so far.
    ///
    /// If this logger family owns the listener (see
    /// [`with_listener`](Self::with_listener)), blocks until it has stopped.
    /// In direct mode this only flushes the sinks.
    pub fn shutdown(&self) {
        match &self.sink {
            Sink::Channel { sender, listener } => {
                // a closed channel means the listener already stopped
                let _ = sender.shutdown();
                listener.join();
            }
            Sink::Direct(backend) => {
                let _ = backend.lock().flush();
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("concurrent", &self.is_concurrent())
            .finish()
    }
}
