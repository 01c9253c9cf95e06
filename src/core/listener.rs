//! The single consumer that owns all sink I/O
//!
//! A [`Listener`] runs on its own thread. It builds its [`Backend`] there,
//! reports whether that succeeded, and then drains the channel one message at
//! a time until it sees [`Message::Shutdown`]. Each entry is written and
//! flushed before the next one is dequeued, which is what keeps lines from
//! different producers from interleaving.

use super::{
    backend::Backend,
    channel::LogReceiver,
    config::LogConfig,
    error::{LoggerError, Result},
    log_entry::Message,
    metrics::FunnelMetrics,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const LISTENER_THREAD_NAME: &str = "cqlog-listener";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Running,
    Stopped,
}

pub struct Listener {
    handle: Option<thread::JoinHandle<()>>,
    running: Arc<AtomicBool>,
    metrics: Arc<FunnelMetrics>,
}

impl Listener {
    /// Spawn a listener that configures its backend from `config`.
    ///
    /// # Errors
    ///
    /// Fails before any entry is consumed if the configuration is invalid or
    /// a sink cannot be opened.
    pub fn spawn(receiver: LogReceiver, config: LogConfig) -> Result<Self> {
        Self::spawn_with(receiver, move || Backend::from_config(&config))
    }

    /// Spawn a listener whose backend is produced by `configure`.
    ///
    /// `configure` runs on the listener thread, exactly once.
    pub fn spawn_with<F>(receiver: LogReceiver, configure: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Backend> + Send + 'static,
    {
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<()>>(1);
        let running = Arc::new(AtomicBool::new(false));
        let metrics = Arc::clone(receiver.metrics());
        let running_clone = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name(LISTENER_THREAD_NAME.to_string())
            .spawn(move || {
                let backend = match configure() {
                    Ok(backend) => backend,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                running_clone.store(true, Ordering::Release);
                let _ = ready_tx.send(Ok(()));

                Self::run(backend, &receiver);
                running_clone.store(false, Ordering::Release);
            })
            .map_err(|e| {
                LoggerError::io_operation("spawn listener", "Failed to start listener thread", e)
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                handle: Some(handle),
                running,
                metrics,
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                // configure() panicked before reporting back
                let _ = handle.join();
                Err(LoggerError::listener("listener thread died during configuration"))
            }
        }
    }

    /// Consumer loop
    fn run(mut backend: Backend, receiver: &LogReceiver) {
        let metrics = receiver.metrics();
        loop {
            match receiver.dequeue() {
                Ok(Message::Entry(entry)) => backend.handle_counted(&entry, metrics),
                Ok(Message::Shutdown) => break,
                // every sender is gone, nothing more can arrive
                Err(_) => break,
            }
        }

        if let Err(e) = backend.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }

    pub fn state(&self) -> ListenerState {
        if self.running.load(Ordering::Acquire) {
            ListenerState::Running
        } else {
            ListenerState::Stopped
        }
    }

    pub fn metrics(&self) -> &FunnelMetrics {
        &self.metrics
    }

    /// Wait for the listener to stop and return its final counters.
    ///
    /// Someone must have enqueued [`Message::Shutdown`] (or dropped every
    /// sender) first, or this blocks forever.
    pub fn join(mut self) -> Result<FunnelMetrics> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| LoggerError::listener("listener thread panicked"))?;
        }
        Ok(FunnelMetrics::clone(&self.metrics))
    }

    /// Like [`join`](Self::join) but gives up after `timeout`.
    ///
    /// Returns `false` if the listener was still running when time ran out;
    /// its thread is then left detached.
    pub fn join_timeout(mut self, timeout: Duration) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if handle.join().is_err() {
                    eprintln!("[LOGGER ERROR] Listener thread panicked during shutdown");
                    return false;
                }
                return true;
            }
            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Listener did not stop within {:?}. Queued entries may be lost.",
                    timeout
                );
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Let the listener run for the rest of the program
    pub fn detach(mut self) {
        self.handle.take();
    }
}
