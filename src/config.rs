//! # Relay configuration.
//!
//! [`RelayConfig`] holds the tunables for one relay deployment. It is passed by
//! value at construction, so several relayers in the same process can run with
//! independent settings.
//!
//! Config is used in three places:
//! 1. **Relayer creation**: `RelayerCore::new(source, config)`
//! 2. **Subscriber creation**: `DrainingSubscriber::new(name, interest, &config)`
//! 3. **Process wiring**: `Coordinator::new(config)` (poller interval, grace)
//!
//! ## Sentinel values
//! - `grace = 0s` → wait for every task without a deadline
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use relaykit::RelayConfig;
//!
//! let mut cfg = RelayConfig::default();
//! cfg.queue_capacity = 20;
//! cfg.broadcast_interval = Duration::from_millis(200);
//!
//! assert_eq!(cfg.queue_capacity_clamped(), 20);
//! assert_eq!(cfg.shutdown_deadline(), None);
//! ```

use std::time::Duration;

/// Tunables for a relayer, its subscribers and the poller feeding it.
///
/// ## Field semantics
/// - `queue_capacity`: retention bound of each lane's recency queue (min 1)
/// - `broadcast_interval`: idle sleep of the broadcast loop when nothing was ready
/// - `sink_capacity`: default bounded size of a subscriber sink (min 1)
/// - `subscriber_wait`: idle wait of a draining subscriber between empty polls
/// - `read_interval`: how often the poller reads the source
/// - `grace`: coordinator shutdown deadline (`0s` = none)
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Maximum messages retained per lane after each broadcast pass.
    ///
    /// `resize` trims a lane down to `queue_capacity - 1` survivors (at least one).
    pub queue_capacity: usize,

    /// Sleep between broadcast passes that found nothing to deliver.
    pub broadcast_interval: Duration,

    /// Default capacity of a subscriber's per-lane sink.
    pub sink_capacity: usize,

    /// Sleep between drain attempts that found every sink empty.
    pub subscriber_wait: Duration,

    /// Interval between two source reads performed by the poller.
    pub read_interval: Duration,

    /// Maximum time the coordinator waits for tasks after cancellation.
    ///
    /// - `Duration::ZERO` = wait indefinitely
    /// - `> 0` = give up and report the stuck tasks
    pub grace: Duration,
}

impl RelayConfig {
    /// Queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Sink capacity clamped to a minimum of 1 (tokio channels reject 0).
    #[inline]
    pub fn sink_capacity_clamped(&self) -> usize {
        self.sink_capacity.max(1)
    }

    /// Coordinator deadline as an `Option`.
    ///
    /// - `None` → no deadline
    /// - `Some(d)` → stop waiting after `d`
    #[inline]
    pub fn shutdown_deadline(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for RelayConfig {
    /// Default configuration:
    ///
    /// - `queue_capacity = 50`
    /// - `broadcast_interval = 1s`
    /// - `sink_capacity = 5`
    /// - `subscriber_wait = 3s`
    /// - `read_interval = 5s`
    /// - `grace = 0s` (no deadline)
    fn default() -> Self {
        Self {
            queue_capacity: 50,
            broadcast_interval: Duration::from_secs(1),
            sink_capacity: 5,
            subscriber_wait: Duration::from_secs(3),
            read_interval: Duration::from_secs(5),
            grace: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.queue_capacity, 50);
        assert_eq!(cfg.broadcast_interval, Duration::from_secs(1));
        assert_eq!(cfg.shutdown_deadline(), None);
    }

    #[test]
    fn test_clamped_accessors() {
        let cfg = RelayConfig {
            queue_capacity: 0,
            sink_capacity: 0,
            grace: Duration::from_secs(2),
            ..RelayConfig::default()
        };
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(cfg.sink_capacity_clamped(), 1);
        assert_eq!(cfg.shutdown_deadline(), Some(Duration::from_secs(2)));
    }
}
