//! Startup: wiring a channel, a listener and a root logger together

use super::{
    backend::Backend,
    channel::{LogChannel, LogSender},
    config::LogConfig,
    error::Result,
    listener::{Listener, ListenerState},
    logger::Logger,
    metrics::FunnelMetrics,
};
use std::time::Duration;

/// Default time [`Funnel::shutdown_timeout`] callers are expected to allow
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Start logging in concurrent or direct mode.
///
/// In concurrent mode a listener thread is started and owned by the returned
/// logger and its children. [`Logger::shutdown`] on any of them, or dropping
/// the last of them, waits until every queued entry has been written. In
/// direct mode every call writes synchronously from the caller's thread.
///
/// Without `config`, [`LogConfig::default`] is used: console at DEBUG and a
/// rotating `<program>.log` at INFO.
///
/// # Errors
///
/// Configuration errors and sink IO errors surface here, before any entry
/// is accepted.
pub fn init_log(concurrent: bool, config: Option<LogConfig>) -> Result<Logger> {
    let config = config.unwrap_or_default();
    if concurrent {
        Ok(Funnel::start(config)?.into_logger())
    } else {
        Ok(Logger::direct(Backend::from_config(&config)?))
    }
}

/// An owned concurrent logging setup that can be shut down and joined
///
/// # Example
///
/// ```no_run
/// use cqlog::{Funnel, LogConfig};
///
/// let funnel = Funnel::start(LogConfig::default()).unwrap();
/// let log = funnel.logger().child("worker");
/// log.info("working");
///
/// let metrics = funnel.shutdown().unwrap();
/// assert_eq!(metrics.dispatched(), 1);
/// ```
pub struct Funnel {
    sender: LogSender,
    logger: Logger,
    listener: Listener,
}

impl Funnel {
    /// Unbounded funnel configured from `config`
    pub fn start(config: LogConfig) -> Result<Self> {
        Self::builder().config(config).start()
    }

    #[must_use]
    pub fn builder() -> FunnelBuilder {
        FunnelBuilder::new()
    }

    /// Root logger of this funnel
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn metrics(&self) -> &FunnelMetrics {
        self.listener.metrics()
    }

    pub fn state(&self) -> ListenerState {
        self.listener.state()
    }

    /// Enqueue the sentinel and wait until everything before it is written.
    ///
    /// Returns a snapshot of the funnel's counters.
    pub fn shutdown(self) -> Result<FunnelMetrics> {
        self.logger.shutdown();
        self.listener.join()
    }

    /// [`shutdown`](Self::shutdown) bounded by `timeout`; `false` if the
    /// listener was still draining when time ran out.
    pub fn shutdown_timeout(self, timeout: Duration) -> bool {
        self.logger.shutdown();
        self.listener.join_timeout(timeout)
    }

    /// Hand the listener over to the root logger.
    ///
    /// The returned logger (or any clone or child of it) joins the listener
    /// on [`Logger::shutdown`] or when the last handle is dropped.
    pub fn into_logger(self) -> Logger {
        Logger::with_listener(self.sender, self.listener)
    }

    /// Leave the listener running for the rest of the program.
    ///
    /// Entries still queued when the process exits are lost.
    pub fn detach(self) -> Logger {
        self.listener.detach();
        self.logger
    }
}

/// Builder for [`Funnel`]
///
/// # Example
///
/// ```no_run
/// use cqlog::{Funnel, LogConfig};
///
/// // bounded queue: producers wait once 10_000 entries are pending
/// let funnel = Funnel::builder()
///     .config(LogConfig::default())
///     .bounded(10_000)
///     .start()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct FunnelBuilder {
    config: Option<LogConfig>,
    capacity: Option<usize>,
}

impl FunnelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a bounded channel with blocking backpressure
    #[must_use = "builder methods return a new value"]
    pub fn bounded(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Start with the configured (or default) [`LogConfig`]
    pub fn start(self) -> Result<Funnel> {
        let config = self.config.clone().unwrap_or_default();
        self.start_with(move || Backend::from_config(&config))
    }

    /// Start with a backend built by `configure` on the listener thread.
    ///
    /// Any config set on the builder is ignored.
    pub fn start_with<F>(self, configure: F) -> Result<Funnel>
    where
        F: FnOnce() -> Result<Backend> + Send + 'static,
    {
        let (sender, receiver) = match self.capacity {
            Some(capacity) => LogChannel::bounded(capacity),
            None => LogChannel::unbounded(),
        };
        let listener = Listener::spawn_with(receiver, configure)?;
        Ok(Funnel {
            logger: Logger::with_channel(sender.clone()),
            sender,
            listener,
        })
    }
}
