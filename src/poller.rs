//! # Poller: periodic `read` → `enqueue`.
//!
//! The poller is the caller the relay core expects on its input side. Every
//! `read_interval` it reads one message through [`RelayerCore::read`] and, on
//! success, enqueues it. A failed read is logged and the cycle is skipped; the
//! poller never retries within a cycle.
//!
//! ```text
//! loop {
//!   ├─► wait tick | token cancelled → stop
//!   ├─► relayer.read()
//!   │     ├─ Ok(msg) → relayer.enqueue(msg), enqueued += 1
//!   │     └─ Err(e)  → warn, skip this cycle
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::RelayerCore;
use crate::sources::Source;

/// `tokio::time::interval` rejects a zero period.
const MIN_READ_INTERVAL: Duration = Duration::from_millis(1);

/// Interval-driven reader feeding one relayer.
#[derive(Debug, Clone)]
pub struct Poller {
    name: String,
    interval: Duration,
}

impl Poller {
    /// Creates a poller reading every `interval` (min 1ms).
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval: interval.max(MIN_READ_INTERVAL),
        }
    }

    /// Poller name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns [`Poller::run`]; the handle resolves to the number of messages enqueued.
    pub fn spawn<S: Source>(
        self,
        relayer: Arc<RelayerCore<S>>,
        token: CancellationToken,
    ) -> JoinHandle<u64> {
        tokio::spawn(async move { self.run(&relayer, token).await })
    }

    /// Polls until `token` is cancelled; returns the number of messages enqueued.
    ///
    /// The first read happens one interval after the call.
    pub async fn run<S: Source>(&self, relayer: &RelayerCore<S>, token: CancellationToken) -> u64 {
        info!(poller = %self.name, interval = ?self.interval, "poller starting");

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        let mut enqueued = 0u64;

        loop {
            select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match relayer.read() {
                Ok(msg) => {
                    debug!(poller = %self.name, class = %msg.class(), payload = %msg.text(), "got new message");
                    relayer.enqueue(msg);
                    enqueued += 1;
                }
                Err(e) => {
                    warn!(poller = %self.name, error = %e, "unable to process message");
                }
            }
        }

        info!(poller = %self.name, enqueued, "closing poller");
        enqueued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use crate::error::SourceError;
    use crate::messages::{Message, PriorityClass};
    use crate::sources::ScriptedSource;

    #[tokio::test]
    async fn test_failed_reads_are_skipped() {
        let source = Arc::new(ScriptedSource::from_results([
            Ok(Message::new(PriorityClass::ClassA, "a")),
            Err(SourceError::Unavailable {
                reason: "flaky".into(),
            }),
            Ok(Message::new(PriorityClass::ClassB, "b")),
        ]));
        let relayer = RelayerCore::new(Arc::clone(&source), RelayConfig::default());
        let token = CancellationToken::new();
        let handle = Poller::new("poller", Duration::from_millis(2)).spawn(Arc::clone(&relayer), token.clone());

        let deadline = time::Instant::now() + Duration::from_secs(5);
        while source.read_count() < 4 && time::Instant::now() < deadline {
            time::sleep(Duration::from_millis(2)).await;
        }
        token.cancel();
        let enqueued = handle.await.expect("join");

        assert_eq!(enqueued, 2);
        assert_eq!(relayer.summary().queued, 2);
        assert_eq!(relayer.pending(PriorityClass::ClassA), 1);
        assert_eq!(relayer.pending(PriorityClass::ClassB), 1);
    }

    #[tokio::test]
    async fn test_stops_before_first_tick() {
        let relayer = RelayerCore::new(ScriptedSource::default(), RelayConfig::default());
        let token = CancellationToken::new();
        token.cancel();

        let poller = Poller::new("idle", Duration::from_secs(60));
        assert_eq!(poller.run(&relayer, token).await, 0);
    }

    #[test]
    fn test_zero_interval_clamped() {
        assert_eq!(Poller::new("p", Duration::ZERO).interval(), MIN_READ_INTERVAL);
    }
}
