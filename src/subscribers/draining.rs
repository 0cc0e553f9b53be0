//! # DrainingSubscriber: consumes and counts.
//!
//! Owns one sink per lane it is interested in and drains them in a loop,
//! preferring class A when both lanes have something waiting. When every sink is
//! empty it idles for its configured wait (cancellable) before looking again.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► token cancelled?      → stop
//!   ├─► class A has message?  → processed += 1, continue
//!   ├─► class B has message?  → processed += 1, continue
//!   └─► idle: sleep(wait) | token cancelled → stop
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::{select, sync::Mutex, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::sink::{self, Sink, SinkReceiver};
use super::Subscribe;
use crate::config::RelayConfig;
use crate::messages::{Message, PriorityClass};

/// Floor for the idle wait so a zero wait does not spin.
const MIN_IDLE_WAIT: Duration = Duration::from_millis(1);

/// Per-lane sink pair owned by the subscriber.
struct Lane {
    sink: Sink,
    rx: Mutex<SinkReceiver>,
}

/// Subscriber that drains its sinks and counts every message.
pub struct DrainingSubscriber {
    name: String,
    interest: PriorityClass,
    wait: Duration,
    class_a: Option<Lane>,
    class_b: Option<Lane>,
    processed: AtomicU64,
}

impl DrainingSubscriber {
    /// Creates a subscriber with sinks sized by `cfg.sink_capacity` and idle wait
    /// `cfg.subscriber_wait`.
    pub fn new(name: impl Into<String>, interest: PriorityClass, cfg: &RelayConfig) -> Self {
        Self::with_capacity(
            name,
            interest,
            cfg.sink_capacity_clamped(),
            cfg.subscriber_wait,
        )
    }

    /// Creates a subscriber with an explicit sink capacity and idle wait.
    pub fn with_capacity(
        name: impl Into<String>,
        interest: PriorityClass,
        capacity: usize,
        wait: Duration,
    ) -> Self {
        let name = name.into();
        let make_lane = |lane: PriorityClass| {
            interest.includes(lane).then(|| {
                let (sink, rx) = sink::channel(name.as_str(), capacity);
                Lane {
                    sink,
                    rx: Mutex::new(rx),
                }
            })
        };
        let class_a = make_lane(PriorityClass::ClassA);
        let class_b = make_lane(PriorityClass::ClassB);

        Self {
            name,
            interest,
            wait,
            class_a,
            class_b,
            processed: AtomicU64::new(0),
        }
    }

    /// Idle wait between empty drain attempts.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    fn handle(&self, msg: &Message) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        debug!(
            subscriber = %self.name,
            class = %msg.class(),
            payload = %msg.text(),
            "message processed"
        );
    }
}

#[async_trait]
impl Subscribe for DrainingSubscriber {
    fn name(&self) -> &str {
        &self.name
    }

    fn interest(&self) -> PriorityClass {
        self.interest
    }

    fn sink(&self, lane: PriorityClass) -> Option<Sink> {
        match lane {
            PriorityClass::ClassA => self.class_a.as_ref().map(|l| l.sink.clone()),
            PriorityClass::ClassB => self.class_b.as_ref().map(|l| l.sink.clone()),
            PriorityClass::Both => None,
        }
    }

    async fn drain(&self, token: CancellationToken) {
        info!(subscriber = %self.name, interest = %self.interest, "subscriber starting");

        let mut rx_a = match &self.class_a {
            Some(lane) => Some(lane.rx.lock().await),
            None => None,
        };
        let mut rx_b = match &self.class_b {
            Some(lane) => Some(lane.rx.lock().await),
            None => None,
        };

        loop {
            if token.is_cancelled() {
                break;
            }

            let next = rx_a
                .as_mut()
                .and_then(|rx| rx.try_recv())
                .or_else(|| rx_b.as_mut().and_then(|rx| rx.try_recv()));

            match next {
                Some(msg) => self.handle(&msg),
                None => {
                    let sleep = time::sleep(self.wait.max(MIN_IDLE_WAIT));
                    tokio::pin!(sleep);
                    select! {
                        biased;
                        _ = token.cancelled() => break,
                        _ = &mut sleep => {}
                    }
                }
            }
        }

        info!(
            subscriber = %self.name,
            processed = self.processed(),
            "closing subscriber"
        );
    }

    fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}
