//! Funnel metrics for observability
//!
//! Counters shared between the producer side of the channel and the
//! listener. Nothing reacts to them: an unbounded channel that grows because
//! the listener is slow stays unbounded, but the backlog becomes visible.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing traffic through one log funnel
///
/// # Example
///
/// ```
/// use cqlog::FunnelMetrics;
///
/// let metrics = FunnelMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_enqueued();
/// metrics.record_dispatched();
///
/// assert_eq!(metrics.backlog(), 1);
/// ```
#[derive(Debug)]
pub struct FunnelMetrics {
    /// Entries accepted by the channel
    enqueued: AtomicU64,

    /// Entries fully handed to the backend by the listener
    dispatched: AtomicU64,

    /// Handler writes that returned an error or panicked
    handler_failures: AtomicU64,
}

impl FunnelMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }

    /// Entries accepted but not yet dispatched
    pub fn backlog(&self) -> u64 {
        self.enqueued().saturating_sub(self.dispatched())
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_handler_failure(&self) -> u64 {
        self.handler_failures.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for FunnelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FunnelMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            dispatched: AtomicU64::new(self.dispatched()),
            handler_failures: AtomicU64::new(self.handler_failures()),
        }
    }
}
