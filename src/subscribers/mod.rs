//! # Relay subscribers.
//!
//! A subscriber owns one bounded [`Sink`] per lane it cares about, registers
//! those sinks with one or more relayers, and drains them at its own pace.
//!
//! ## Architecture
//! ```text
//! RelayerCore ──► try_deliver ──► [sink A] ──┐
//!                                            ├──► Subscribe::drain() ──► processed += 1
//! RelayerCore ──► try_deliver ──► [sink B] ──┘
//!                     │
//!                     └─ full / closed → skipped (counted by the relayer)
//! ```
//!
//! ## Subscriber types
//! - [`DrainingSubscriber`] consumes and counts, preferring class A
//! - [`NoopSubscriber`] never reads; its sinks stay full (backpressure tests)
//!
//! Both are interchangeable behind the [`Subscribe`] trait and are run by
//! [`spawn_subscriber`].

mod draining;
mod noop;
pub mod sink;
mod subscribe;
mod worker;

pub use draining::DrainingSubscriber;
pub use noop::NoopSubscriber;
pub use sink::{Delivery, Sink, SinkReceiver};
pub use subscribe::Subscribe;
pub use worker::spawn_subscriber;
