//! # Core subscriber trait
//!
//! `Subscribe` is the capability set a relay consumer offers: it exposes
//! **registerable sinks** (one bounded handle per lane it cares about) and it is
//! **drainable** (a long-running loop that consumes those sinks at its own pace).
//!
//! ## Contract
//! - `sink(lane)` returns `Some` for every concrete lane in `interest()`.
//! - Every sink is registered with a relayer before the relayer's broadcast loop
//!   is relied on to deliver to it.
//! - `drain` returns once the token is cancelled; completion is reported exactly
//!   once by the worker that runs it (see [`spawn_subscriber`](crate::spawn_subscriber)).
//!
//! ## Example
//! ```rust
//! use relaykit::{sink, PriorityClass, Sink, SinkReceiver, Subscribe};
//! use tokio::sync::Mutex;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Audit {
//!     sink: Sink,
//!     rx: Mutex<SinkReceiver>,
//! }
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Audit {
//!     fn name(&self) -> &str {
//!         "audit"
//!     }
//!     fn interest(&self) -> PriorityClass {
//!         PriorityClass::ClassB
//!     }
//!     fn sink(&self, lane: PriorityClass) -> Option<Sink> {
//!         (lane == PriorityClass::ClassB).then(|| self.sink.clone())
//!     }
//!     async fn drain(&self, token: CancellationToken) {
//!         let mut rx = self.rx.lock().await;
//!         loop {
//!             tokio::select! {
//!                 _ = token.cancelled() => break,
//!                 msg = rx.recv() => match msg {
//!                     Some(msg) => println!("audit: {}", msg.text()),
//!                     None => break,
//!                 },
//!             }
//!         }
//!     }
//! }
//!
//! let (tx, rx) = sink::channel("audit", 8);
//! let audit = Audit { sink: tx, rx: Mutex::new(rx) };
//! assert!(audit.sink(PriorityClass::ClassA).is_none());
//! assert_eq!(audit.sink(PriorityClass::ClassB).map(|s| s.max_capacity()), Some(8));
//! ```

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::sink::Sink;
use crate::messages::PriorityClass;

/// Contract for relay consumers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Human-readable name (for logs).
    fn name(&self) -> &str;

    /// Classes this subscriber wants (`Both` for every lane).
    fn interest(&self) -> PriorityClass;

    /// Sink handle for one concrete lane, if subscribed to it.
    fn sink(&self, lane: PriorityClass) -> Option<Sink>;

    /// Consumes sinks until `token` is cancelled.
    async fn drain(&self, token: CancellationToken);

    /// Messages consumed so far.
    fn processed(&self) -> u64 {
        0
    }
}
