//! # Work accounting for one relayer.
//!
//! [`WorkStats`] holds lock-free counters updated from the enqueuing caller and
//! the broadcast loop; [`WorkSummary`] is a plain snapshot of them.
//!
//! ## Rules
//! - Counters only ever increase (`fetch_add`), so successive snapshots are
//!   monotonically non-decreasing field by field.
//! - `queued` counts lane pushes: a `Both` message counts twice.
//! - `broadcast` and `skipped` count per-sink outcomes, not per-message.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a relayer's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkSummary {
    /// Messages pushed onto a lane queue.
    pub queued: u64,
    /// Successful deliveries into a subscriber sink.
    pub broadcast: u64,
    /// Messages evicted from a lane queue by `resize`.
    pub discarded: u64,
    /// Deliveries dropped because the sink was full or closed.
    pub skipped: u64,
}

impl fmt::Display for WorkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queued={} broadcast={} discarded={} skipped={}",
            self.queued, self.broadcast, self.discarded, self.skipped
        )
    }
}

/// Live counters.
#[derive(Debug, Default)]
pub struct WorkStats {
    queued: AtomicU64,
    broadcast: AtomicU64,
    discarded: AtomicU64,
    skipped: AtomicU64,
}

impl WorkStats {
    #[inline]
    pub fn record_queued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_broadcast(&self) {
        self.broadcast.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_discarded(&self, n: usize) {
        self.discarded.fetch_add(n as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads every counter.
    pub fn snapshot(&self) -> WorkSummary {
        WorkSummary {
            queued: self.queued.load(Ordering::Relaxed),
            broadcast: self.broadcast.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}
