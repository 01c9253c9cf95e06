//! Multi-producer, single-consumer log channel
//!
//! Thin typed wrapper around `crossbeam-channel`. The sender half is cloned
//! into every [`Logger`](crate::Logger); the receiver half is moved into the
//! single listener. Delivery order is the order in which `enqueue` calls were
//! linearized by the channel.

use super::error::{LoggerError, Result};
use super::log_entry::Message;
use super::metrics::FunnelMetrics;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::Arc;

/// Constructor for a connected sender/receiver pair
pub struct LogChannel;

impl LogChannel {
    /// Unbounded channel: `enqueue` never blocks.
    #[must_use]
    pub fn unbounded() -> (LogSender, LogReceiver) {
        let (sender, receiver) = unbounded();
        Self::wrap(sender, receiver)
    }

    /// Bounded channel: `enqueue` blocks while `capacity` messages are queued.
    ///
    /// Trades producer latency for a memory ceiling. A capacity of zero makes
    /// every enqueue a rendezvous with the listener.
    #[must_use]
    pub fn bounded(capacity: usize) -> (LogSender, LogReceiver) {
        let (sender, receiver) = bounded(capacity);
        Self::wrap(sender, receiver)
    }

    fn wrap(sender: Sender<Message>, receiver: Receiver<Message>) -> (LogSender, LogReceiver) {
        let metrics = Arc::new(FunnelMetrics::new());
        (
            LogSender {
                sender,
                metrics: Arc::clone(&metrics),
            },
            LogReceiver { receiver, metrics },
        )
    }
}

/// Producer half. Cheap to clone; all clones feed the same queue.
#[derive(Debug, Clone)]
pub struct LogSender {
    sender: Sender<Message>,
    metrics: Arc<FunnelMetrics>,
}

impl LogSender {
    /// Queue a message for the listener.
    ///
    /// Fails only once the receiver has been dropped.
    pub fn enqueue(&self, message: impl Into<Message>) -> Result<()> {
        let message = message.into();
        let is_entry = matches!(message, Message::Entry(_));
        self.sender
            .send(message)
            .map_err(|_| LoggerError::ChannelClosed)?;
        if is_entry {
            self.metrics.record_enqueued();
        }
        Ok(())
    }

    /// Queue the shutdown sentinel
    pub fn shutdown(&self) -> Result<()> {
        self.enqueue(Message::Shutdown)
    }

    /// Number of messages currently queued
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    pub fn metrics(&self) -> &Arc<FunnelMetrics> {
        &self.metrics
    }
}

/// Consumer half, owned by exactly one listener.
#[derive(Debug)]
pub struct LogReceiver {
    receiver: Receiver<Message>,
    metrics: Arc<FunnelMetrics>,
}

impl LogReceiver {
    /// Block until the next message arrives.
    ///
    /// Returns [`LoggerError::ChannelClosed`] once the queue is empty and
    /// every sender has been dropped.
    pub fn dequeue(&self) -> Result<Message> {
        self.receiver.recv().map_err(|_| LoggerError::ChannelClosed)
    }

    /// Non-blocking variant of [`dequeue`](Self::dequeue)
    pub fn try_dequeue(&self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    pub fn metrics(&self) -> &Arc<FunnelMetrics> {
        &self.metrics
    }
}
