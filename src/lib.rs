//! # relaykit
//!
//! **relaykit** is an in-process priority message relay for Rust.
//!
//! Messages are read from a [`Source`], classified as class A (higher
//! priority) or class B, held in bounded recency queues, and fanned out to
//! subscriber sinks. A slow subscriber never slows the relay down: when its
//! sink is full, the message is skipped for that subscriber only.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                   ┌──────────────┐
//!                   │    Source    │ (RandomSource, ScriptedSource, ...)
//!                   └──────┬───────┘
//!                          ▼ read()
//!                   ┌──────────────┐
//!                   │    Poller    │ every RelayConfig::read_interval
//!                   └──────┬───────┘
//!                          ▼ enqueue()
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  RelayerCore                                                      │
//! │  - BoundedRecencyQueue (class A)    most recent first             │
//! │  - BoundedRecencyQueue (class B)    oldest evicted on resize      │
//! │  - SubscriptionRegistry             per-lane ordered sinks        │
//! │  - WorkSummary                      queued/broadcast/discarded/   │
//! │                                     skipped                       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼ try_deliver      ▼ try_deliver      ▼ try_deliver
//!     ┌──────────┐       ┌──────────┐       ┌──────────┐
//!     │  Sink A  │       │  Sink B  │       │ Sink A+B │   full → skipped
//!     └────┬─────┘       └────┬─────┘       └────┬─────┘
//!          ▼                  ▼                  ▼
//!       sub1.drain()       sub2.drain()       sub3.drain()
//! ```
//!
//! ### Broadcast pass
//! ```text
//! loop {
//!   ├─► token cancelled?   → freeze summary, close, signal done
//!   ├─► pop class A        → deliver to every class A sink
//!   ├─► pop class B        → deliver to every class B sink
//!   ├─► resize both queues → discarded += evicted
//!   └─► idle?              → sleep(broadcast_interval) | cancelled
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                          |
//! |-------------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Relay**         | Priority routing, recency queues, drop-on-full fan-out.   | [`RelayerCore`], [`RelayerHandle`]          |
//! | **Queues**        | Bounded most-recent-first storage with oldest eviction.   | [`BoundedRecencyQueue`], [`RecencyBuffer`]  |
//! | **Subscribers**   | Bounded sinks and pluggable drain loops.                  | [`Subscribe`], [`Sink`], [`DrainingSubscriber`] |
//! | **Sources**       | Pluggable reads with caller-defined error types.          | [`Source`], [`RandomSource`], [`ScriptedSource`] |
//! | **Coordination**  | Start everything, stop on signal, rendezvous on shutdown. | [`Coordinator`], [`Poller`]                 |
//! | **Errors**        | Typed errors for the runtime and bundled sources.         | [`RuntimeError`], [`SourceError`]           |
//! | **Configuration** | Centralize capacities and intervals.                      | [`RelayConfig`]                             |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use relaykit::{Coordinator, DrainingSubscriber, PriorityClass, RandomSource, RelayConfig, RelayerCore};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), relaykit::RuntimeError> {
//!     let mut cfg = RelayConfig::default();
//!     cfg.read_interval = Duration::from_millis(5);
//!     cfg.broadcast_interval = Duration::from_millis(5);
//!
//!     let relayer = RelayerCore::named("relay", RandomSource::seeded(7), cfg.clone());
//!     let bob = Arc::new(DrainingSubscriber::new("bob", PriorityClass::ClassA, &cfg));
//!     relayer.register(bob.as_ref());
//!
//!     let mut coord = Coordinator::new(cfg);
//!     coord.add_subscriber(bob).add_relayer(&relayer).add_poller("poller", &relayer);
//!
//!     let report = coord
//!         .run_until(async {
//!             tokio::time::sleep(Duration::from_millis(50)).await;
//!             Ok(())
//!         })
//!         .await?;
//!     assert!(report.relayer("relay").is_some());
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod messages;
mod poller;
mod queue;
mod sources;
mod subscribers;

// ---- Public re-exports ----

pub use config::RelayConfig;
pub use core::{
    Coordinator, RelayerCore, RelayerHandle, RelayerState, RunReport,
    SubscriptionRegistry, WorkSummary,
};
pub use error::{RuntimeError, SourceError};
pub use messages::{Message, PriorityClass};
pub use poller::Poller;
pub use queue::{BoundedRecencyQueue, RecencyBuffer};
pub use sources::{RandomSource, ScriptedSource, Source};
pub use subscribers::{
    sink, spawn_subscriber, Delivery, DrainingSubscriber, NoopSubscriber, Sink, SinkReceiver,
    Subscribe,
};
