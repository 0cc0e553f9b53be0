//! # RelayerCore: priority-ordered broadcast of queued messages.
//!
//! A relayer owns one [`BoundedRecencyQueue`] per lane, a
//! [`SubscriptionRegistry`], and a background broadcast loop.
//!
//! ## State machine
//! ```text
//! Idle ──start()──► Running ──token cancelled──► ShuttingDown ──► Closed
//!                                                 (freeze summary)  (done signalled)
//! ```
//!
//! ## Broadcast loop
//! ```text
//! loop {
//!   ├─► token cancelled?            → shut down
//!   ├─► pop class A → deliver to class A sinks
//!   ├─► pop class B → deliver to class B sinks
//!   ├─► resize both queues          → discarded += evicted
//!   └─► nothing delivered?          → sleep(broadcast_interval) | token cancelled
//! }
//! ```
//!
//! ## Rules
//! - Class A is always popped before class B in the same pass.
//! - Within a lane, delivery follows pop order (most recent first).
//! - A full or closed sink skips **this message for this subscriber only**;
//!   its existing backlog is untouched and other sinks still receive it.
//! - Cancellation is observed at the top of an iteration; a pass in flight
//!   finishes delivering to all sinks first.
//! - `enqueue`, `read`, `subscribe_to` and `tick` never block on delivery.
//! - Only `Idle` and `Running` accept work. The shutdown transition and every
//!   accepted `enqueue`/`tick` are serialized by one gate, so nothing is counted
//!   after the summary is frozen.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use relaykit::{sink, Message, PriorityClass, RelayConfig, RelayerCore, ScriptedSource};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = RelayConfig::default();
//!     cfg.broadcast_interval = Duration::from_millis(10);
//!
//!     let relayer = RelayerCore::new(ScriptedSource::default(), cfg);
//!     let (tx, mut rx) = sink::channel("bob", 4);
//!     relayer.subscribe_to(PriorityClass::ClassA, tx);
//!
//!     let token = CancellationToken::new();
//!     let handle = relayer.start(token.clone());
//!     relayer.enqueue(Message::new(PriorityClass::ClassA, "round started"));
//!
//!     let msg = rx.recv().await.expect("delivered");
//!     assert_eq!(msg.text(), "round started");
//!
//!     token.cancel();
//!     let summary = handle.wait().await;
//!     assert_eq!(summary.broadcast, 1);
//! }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tokio::{select, sync::watch, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::registry::SubscriptionRegistry;
use super::summary::{WorkStats, WorkSummary};
use crate::config::RelayConfig;
use crate::messages::{Message, PriorityClass};
use crate::queue::BoundedRecencyQueue;
use crate::sources::Source;
use crate::subscribers::{Delivery, Sink, Subscribe};

/// Lifecycle of a relayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RelayerState {
    /// Constructed; loop not started.
    Idle = 0,
    /// Broadcast loop running.
    Running = 1,
    /// Cancellation observed; freezing the summary.
    ShuttingDown = 2,
    /// Loop exited and completion signalled. Terminal.
    Closed = 3,
}

impl RelayerState {
    fn accepts_work(self) -> bool {
        matches!(self, RelayerState::Idle | RelayerState::Running)
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => RelayerState::Idle,
            1 => RelayerState::Running,
            2 => RelayerState::ShuttingDown,
            _ => RelayerState::Closed,
        }
    }
}

impl fmt::Display for RelayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelayerState::Idle => "idle",
            RelayerState::Running => "running",
            RelayerState::ShuttingDown => "shutting_down",
            RelayerState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Handle returned by [`RelayerCore::start`]; resolves once the relayer is closed.
#[derive(Debug)]
pub struct RelayerHandle {
    name: String,
    done: watch::Receiver<Option<WorkSummary>>,
}

impl RelayerHandle {
    /// Name of the relayer this handle waits on.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the relayer has reached [`RelayerState::Closed`].
    pub fn is_done(&self) -> bool {
        self.done.borrow().is_some()
    }

    /// Waits for the relayer to close and returns its frozen summary.
    ///
    /// No deadline is applied; callers wanting one wrap this in
    /// `tokio::time::timeout`.
    pub async fn wait(mut self) -> WorkSummary {
        match self.done.wait_for(Option::is_some).await {
            Ok(summary) => (*summary).unwrap_or_default(),
            // Sender dropped with the relayer before completion; nothing was frozen.
            Err(_) => WorkSummary::default(),
        }
    }
}

/// Priority relay between one source and many subscriber sinks.
pub struct RelayerCore<S: Source> {
    name: String,
    source: S,
    cfg: RelayConfig,
    class_a: BoundedRecencyQueue,
    class_b: BoundedRecencyQueue,
    registry: SubscriptionRegistry,
    stats: WorkStats,
    state: AtomicU8,
    /// Read side: accepted enqueues and ticks. Write side: the freeze.
    gate: RwLock<()>,
    frozen: OnceLock<WorkSummary>,
    done: watch::Sender<Option<WorkSummary>>,
}

impl<S: Source> RelayerCore<S> {
    /// Creates an idle relayer named `"relayer"`.
    pub fn new(source: S, cfg: RelayConfig) -> Arc<Self> {
        Self::named("relayer", source, cfg)
    }

    /// Creates an idle relayer with a name used in logs and shutdown reports.
    pub fn named(name: impl Into<String>, source: S, cfg: RelayConfig) -> Arc<Self> {
        let capacity = cfg.queue_capacity_clamped();
        let (done, _) = watch::channel(None);
        Arc::new(Self {
            name: name.into(),
            source,
            class_a: BoundedRecencyQueue::new(capacity),
            class_b: BoundedRecencyQueue::new(capacity),
            registry: SubscriptionRegistry::new(),
            stats: WorkStats::default(),
            state: AtomicU8::new(RelayerState::Idle as u8),
            gate: RwLock::new(()),
            frozen: OnceLock::new(),
            done,
            cfg,
        })
    }

    /// Relayer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the relayer was built with.
    pub fn config(&self) -> &RelayConfig {
        &self.cfg
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RelayerState {
        RelayerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Reads one message from the source, returning its error untouched.
    pub fn read(&self) -> Result<Message, S::Error> {
        self.source.read()
    }

    /// Routes `msg` onto its lane queue(s). Never blocks.
    ///
    /// A `Both` message is pushed onto each lane and counted as queued twice.
    /// Once shutdown has begun, messages are dropped and not counted.
    pub fn enqueue(&self, msg: Message) {
        let _gate = self.gate.read();
        let state = self.state();
        if !state.accepts_work() {
            warn!(relayer = %self.name, class = %msg.class(), %state, "relayer stopping; message dropped");
            return;
        }
        for lane in msg.class().lanes() {
            self.queue(lane).push(msg.for_lane(lane));
            self.stats.record_queued();
            debug!(relayer = %self.name, class = %lane, "message queued");
        }
    }

    /// Registers `sink` for `class` (`Both` registers it on each lane).
    pub fn subscribe_to(&self, class: PriorityClass, sink: Sink) {
        debug!(relayer = %self.name, class = %class, sink = %sink.name(), "sink subscribed");
        self.registry.subscribe(class, sink);
    }

    /// Registers every sink `sub` exposes for the lanes it is interested in.
    ///
    /// Returns the number of lanes registered.
    pub fn register(&self, sub: &dyn Subscribe) -> usize {
        let mut registered = 0;
        for lane in sub.interest().lanes() {
            if let Some(sink) = sub.sink(lane) {
                self.subscribe_to(lane, sink);
                registered += 1;
            }
        }
        registered
    }

    /// Number of sinks registered on one concrete lane.
    pub fn subscriber_count(&self, lane: PriorityClass) -> usize {
        self.registry.len(lane)
    }

    /// Messages currently retained on one concrete lane.
    pub fn pending(&self, lane: PriorityClass) -> usize {
        match lane {
            PriorityClass::ClassA => self.class_a.len(),
            PriorityClass::ClassB => self.class_b.len(),
            PriorityClass::Both => self.class_a.len() + self.class_b.len(),
        }
    }

    /// Live counters, or the frozen final values once the relayer has shut down.
    pub fn summary(&self) -> WorkSummary {
        self.frozen
            .get()
            .copied()
            .unwrap_or_else(|| self.stats.snapshot())
    }

    /// One broadcast pass: class A, then class B, then trim both queues.
    ///
    /// Returns `true` if a message was popped from either lane. Does nothing
    /// once shutdown has begun.
    pub fn tick(&self) -> bool {
        let _gate = self.gate.read();
        if !self.state().accepts_work() {
            return false;
        }
        let mut sent = false;

        if let Some(msg) = self.class_a.pop() {
            self.broadcast(PriorityClass::ClassA, &msg);
            sent = true;
        }
        if let Some(msg) = self.class_b.pop() {
            self.broadcast(PriorityClass::ClassB, &msg);
            sent = true;
        }

        let evicted = self.class_a.resize() + self.class_b.resize();
        if evicted > 0 {
            self.stats.record_discarded(evicted);
            debug!(relayer = %self.name, evicted, "evicted oldest queued messages");
        }
        sent
    }

    /// Starts the broadcast loop on the current tokio runtime.
    ///
    /// Only the first call spawns the loop; later calls log a warning and return
    /// a handle to the same completion.
    pub fn start(self: &Arc<Self>, token: CancellationToken) -> RelayerHandle {
        let started = self
            .state
            .compare_exchange(
                RelayerState::Idle as u8,
                RelayerState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if started {
            let me = Arc::clone(self);
            tokio::spawn(async move { me.run(token).await });
        } else {
            warn!(relayer = %self.name, state = %self.state(), "relayer already started");
        }
        self.handle()
    }

    /// A fresh handle on this relayer's completion.
    pub fn handle(&self) -> RelayerHandle {
        RelayerHandle {
            name: self.name.clone(),
            done: self.done.subscribe(),
        }
    }

    async fn run(self: Arc<Self>, token: CancellationToken) {
        info!(
            relayer = %self.name,
            class_a_subscribers = self.registry.len(PriorityClass::ClassA),
            class_b_subscribers = self.registry.len(PriorityClass::ClassB),
            "message relayer starting"
        );

        loop {
            if token.is_cancelled() {
                break;
            }
            if self.tick() {
                continue;
            }
            if self.cfg.broadcast_interval.is_zero() {
                tokio::task::yield_now().await;
                continue;
            }

            let sleep = time::sleep(self.cfg.broadcast_interval);
            tokio::pin!(sleep);
            select! {
                biased;
                _ = token.cancelled() => {}
                _ = &mut sleep => {}
            }
        }

        let summary = {
            let _gate = self.gate.write();
            self.state
                .store(RelayerState::ShuttingDown as u8, Ordering::Release);
            *self.frozen.get_or_init(|| self.stats.snapshot())
        };
        info!(relayer = %self.name, %summary, "cancellation observed; closing message relayer");

        self.state.store(RelayerState::Closed as u8, Ordering::Release);
        self.done.send_replace(Some(summary));
    }

    fn queue(&self, lane: PriorityClass) -> &BoundedRecencyQueue {
        match lane {
            PriorityClass::ClassA => &self.class_a,
            // lanes() never yields Both
            PriorityClass::ClassB | PriorityClass::Both => &self.class_b,
        }
    }

    fn broadcast(&self, lane: PriorityClass, msg: &Message) {
        self.registry.with_sinks(lane, |sinks| {
            for sink in sinks {
                if sink.is_full() {
                    self.stats.record_skipped();
                    debug!(relayer = %self.name, class = %lane, sink = %sink.name(), "sink full; message skipped");
                    continue;
                }
                match sink.try_deliver(msg.clone()) {
                    Delivery::Delivered => self.stats.record_broadcast(),
                    Delivery::Full | Delivery::Closed => {
                        self.stats.record_skipped();
                        debug!(relayer = %self.name, class = %lane, sink = %sink.name(), "delivery rejected; message skipped");
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::SourceError;
    use crate::sources::ScriptedSource;
    use crate::subscribers::{sink, NoopSubscriber};

    fn cfg(interval_ms: u64) -> RelayConfig {
        RelayConfig {
            broadcast_interval: Duration::from_millis(interval_ms),
            ..RelayConfig::default()
        }
    }

    fn relayer() -> Arc<RelayerCore<ScriptedSource>> {
        RelayerCore::new(ScriptedSource::default(), cfg(1))
    }

    fn msg(class: PriorityClass, text: &str) -> Message {
        Message::new(class, text.to_string())
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        let deadline = time::Instant::now() + Duration::from_secs(5);
        while !cond() && time::Instant::now() < deadline {
            time::sleep(Duration::from_millis(2)).await;
        }
    }

    #[test]
    fn test_class_a_delivered_before_class_b() {
        let relayer = relayer();
        let (tx, mut rx) = sink::channel("both", 10);
        relayer.subscribe_to(PriorityClass::Both, tx);

        relayer.enqueue(msg(PriorityClass::ClassB, "receivedAnswer"));
        relayer.enqueue(msg(PriorityClass::ClassA, "startNewRound"));
        assert!(relayer.tick());

        let first = rx.try_recv().expect("first delivery");
        assert_eq!(first.text(), "startNewRound");
        assert_eq!(first.class(), PriorityClass::ClassA);
        assert_eq!(rx.try_recv().expect("second delivery").text(), "receivedAnswer");
    }

    #[test]
    fn test_most_recent_broadcast_first() {
        let relayer = relayer();
        let (tx, mut rx) = sink::channel("b", 10);
        relayer.subscribe_to(PriorityClass::ClassB, tx);

        for i in 1..=5 {
            relayer.enqueue(msg(PriorityClass::ClassB, &format!("receivedAns{i}")));
        }
        relayer.tick();

        assert_eq!(rx.try_recv().expect("delivery").text(), "receivedAns5");
    }

    #[test]
    fn test_skips_when_sink_full() {
        let relayer = relayer();
        let noop = NoopSubscriber::new(2);
        relayer.subscribe_to(
            PriorityClass::ClassA,
            noop.sink(PriorityClass::ClassA).expect("sink"),
        );

        for i in 0..8 {
            relayer.enqueue(msg(PriorityClass::ClassA, &format!("mock {i}")));
        }
        while relayer.tick() {}

        let summary = relayer.summary();
        assert_eq!(summary.queued, 8);
        assert_eq!(summary.broadcast, 2);
        assert_eq!(summary.skipped, 6);
        assert_eq!(noop.backlog(PriorityClass::ClassA), 2);
    }

    #[test]
    fn test_full_sink_does_not_block_others() {
        let relayer = relayer();
        let (full, _full_rx) = sink::channel("full", 1);
        let (open, mut open_rx) = sink::channel("open", 4);
        assert_eq!(
            full.try_deliver(msg(PriorityClass::ClassA, "backlog")),
            Delivery::Delivered
        );
        relayer.subscribe_to(PriorityClass::ClassA, full);
        relayer.subscribe_to(PriorityClass::ClassA, open);

        relayer.enqueue(msg(PriorityClass::ClassA, "fresh"));
        relayer.tick();

        assert_eq!(open_rx.try_recv().expect("delivered").text(), "fresh");
        let summary = relayer.summary();
        assert_eq!(summary.broadcast, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_closed_sink_counts_as_skip() {
        let relayer = relayer();
        let (tx, rx) = sink::channel("gone", 4);
        drop(rx);
        relayer.subscribe_to(PriorityClass::ClassB, tx);

        relayer.enqueue(msg(PriorityClass::ClassB, "x"));
        relayer.tick();

        assert_eq!(relayer.summary().skipped, 1);
        assert_eq!(relayer.summary().broadcast, 0);
    }

    #[test]
    fn test_no_subscribers() {
        let relayer = relayer();
        for i in 0..6 {
            relayer.enqueue(msg(PriorityClass::ClassA, &format!("m{i}")));
        }
        while relayer.tick() {}

        let summary = relayer.summary();
        assert_eq!(summary.queued, 6);
        assert_eq!(summary.broadcast, 0);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn test_both_counts_twice_and_delivers_per_lane() {
        let relayer = relayer();
        let (a, mut a_rx) = sink::channel("a", 2);
        let (b, mut b_rx) = sink::channel("b", 2);
        relayer.subscribe_to(PriorityClass::ClassA, a);
        relayer.subscribe_to(PriorityClass::ClassB, b);

        relayer.enqueue(msg(PriorityClass::Both, "everyone"));
        assert_eq!(relayer.summary().queued, 2);
        assert_eq!(relayer.pending(PriorityClass::Both), 2);
        relayer.tick();

        assert_eq!(a_rx.try_recv().expect("a").class(), PriorityClass::ClassA);
        assert_eq!(b_rx.try_recv().expect("b").class(), PriorityClass::ClassB);
        assert_eq!(relayer.summary().broadcast, 2);
    }

    #[test]
    fn test_tick_evicts_backlog_beyond_capacity() {
        let relayer = RelayerCore::new(
            ScriptedSource::default(),
            RelayConfig {
                queue_capacity: 5,
                ..cfg(1)
            },
        );
        for i in 0..10 {
            relayer.enqueue(msg(PriorityClass::ClassA, &format!("msg_{i}")));
        }

        // pop msg_9, then trim 9 → 4 survivors
        assert!(relayer.tick());
        assert_eq!(relayer.pending(PriorityClass::ClassA), 4);
        assert_eq!(relayer.summary().discarded, 5);
    }

    #[test]
    fn test_read_propagates_source_error() {
        let relayer = RelayerCore::new(
            ScriptedSource::from_results([
                Ok(msg(PriorityClass::ClassA, "ok")),
                Err(SourceError::Unavailable {
                    reason: "eof".into(),
                }),
            ]),
            cfg(1),
        );

        assert_eq!(relayer.read().expect("first").text(), "ok");
        assert_eq!(
            relayer.read().expect_err("second"),
            SourceError::Unavailable {
                reason: "eof".into()
            }
        );
        assert_eq!(relayer.read().expect_err("third"), SourceError::Exhausted);
    }

    #[test]
    fn test_register_follows_interest() {
        let relayer = relayer();
        let noop = NoopSubscriber::new(1);
        assert_eq!(relayer.register(&noop), 2);
        assert_eq!(relayer.subscriber_count(PriorityClass::ClassA), 1);
        assert_eq!(relayer.subscriber_count(PriorityClass::ClassB), 1);
    }

    #[tokio::test]
    async fn test_loop_delivers_and_freezes_on_shutdown() {
        let relayer = relayer();
        let noop = NoopSubscriber::new(2);
        relayer.register(&noop);
        for i in 0..8 {
            relayer.enqueue(msg(PriorityClass::ClassA, &format!("mock {i}")));
        }

        let token = CancellationToken::new();
        let handle = relayer.start(token.clone());
        assert_eq!(relayer.state(), RelayerState::Running);

        wait_until(|| {
            let s = relayer.summary();
            s.broadcast + s.skipped == 8
        })
        .await;
        token.cancel();
        let summary = handle.wait().await;

        assert_eq!(relayer.state(), RelayerState::Closed);
        assert_eq!(summary.queued, 8);
        assert_eq!(summary.broadcast, 2);
        assert_eq!(summary.skipped, 6);

        relayer.enqueue(msg(PriorityClass::ClassA, "late"));
        assert_eq!(relayer.summary(), summary);
    }

    #[tokio::test]
    async fn test_summary_monotonic_while_running() {
        let relayer = relayer();
        let (tx, mut rx) = sink::channel("drain", 4);
        relayer.subscribe_to(PriorityClass::Both, tx);

        let token = CancellationToken::new();
        let handle = relayer.start(token.clone());

        let mut prev = relayer.summary();
        for i in 0..50 {
            let class = if i % 3 == 0 {
                PriorityClass::ClassA
            } else {
                PriorityClass::ClassB
            };
            relayer.enqueue(msg(class, &format!("m{i}")));
            if i % 2 == 0 {
                let _ = rx.try_recv();
            }
            tokio::task::yield_now().await;

            let now = relayer.summary();
            assert!(now.queued >= prev.queued);
            assert!(now.broadcast >= prev.broadcast);
            assert!(now.discarded >= prev.discarded);
            assert!(now.skipped >= prev.skipped);
            prev = now;
        }

        token.cancel();
        let last = handle.wait().await;
        assert!(last.queued >= prev.queued);
        assert_eq!(relayer.summary(), last);
    }

    #[tokio::test]
    async fn test_second_start_waits_on_same_completion() {
        let relayer = relayer();
        let token = CancellationToken::new();
        let first = relayer.start(token.clone());
        let second = relayer.start(token.clone());
        assert!(!second.is_done());

        token.cancel();
        assert_eq!(first.wait().await, second.wait().await);
    }

    #[tokio::test]
    async fn test_idle_loop_wakes_on_cancel() {
        let relayer = RelayerCore::new(ScriptedSource::default(), cfg(60_000));
        let token = CancellationToken::new();
        let handle = relayer.start(token.clone());

        tokio::task::yield_now().await;
        token.cancel();
        let summary = time::timeout(Duration::from_secs(2), handle.wait())
            .await
            .expect("loop should exit promptly");
        assert_eq!(summary, WorkSummary::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_during_concurrent_enqueue_keeps_summary_monotonic() {
        use std::sync::atomic::AtomicBool;

        for _ in 0..100 {
            let relayer = relayer();
            let (first, first_rx) = sink::channel("first", 4096);
            let (second, second_rx) = sink::channel("second", 4096);
            relayer.subscribe_to(PriorityClass::ClassA, first);
            relayer.subscribe_to(PriorityClass::ClassA, second);

            let token = CancellationToken::new();
            let handle = relayer.start(token.clone());
            let stop = Arc::new(AtomicBool::new(false));

            let writer = {
                let relayer = Arc::clone(&relayer);
                let stop = Arc::clone(&stop);
                std::thread::spawn(move || {
                    for i in 0..4000 {
                        if stop.load(Ordering::Relaxed) {
                            break;
                        }
                        let class = if i % 2 == 0 {
                            PriorityClass::ClassA
                        } else {
                            PriorityClass::ClassB
                        };
                        relayer.enqueue(msg(class, &format!("m{i}")));
                    }
                })
            };
            let reader = {
                let relayer = Arc::clone(&relayer);
                let stop = Arc::clone(&stop);
                std::thread::spawn(move || {
                    let mut prev = relayer.summary();
                    let mut decreased = false;
                    while !stop.load(Ordering::Relaxed) {
                        let now = relayer.summary();
                        decreased |= now.queued < prev.queued
                            || now.broadcast < prev.broadcast
                            || now.discarded < prev.discarded
                            || now.skipped < prev.skipped;
                        prev = now;
                    }
                    decreased
                })
            };

            tokio::task::yield_now().await;
            token.cancel();
            let last = handle.wait().await;
            stop.store(true, Ordering::Relaxed);
            writer.join().expect("writer");
            let decreased = reader.join().expect("reader");

            assert!(!decreased, "summary went backwards during shutdown");
            assert_eq!(relayer.state(), RelayerState::Closed);
            assert_eq!(relayer.summary(), last);

            // a pass in flight finishes delivering to every sink
            assert_eq!(first_rx.len(), second_rx.len());
            assert_eq!((first_rx.len() + second_rx.len()) as u64, last.broadcast);
            assert_eq!(last.skipped, 0);
        }
    }
}
