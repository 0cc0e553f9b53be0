//! Relay core: queues in, sinks out, and the process wiring around it.
//!
//! - [`relayer`]: the broadcast loop, routing and counters;
//! - [`registry`]: per-lane subscription lists;
//! - [`summary`]: the four work counters and their frozen snapshot;
//! - [`coordinator`]: starts relayers, subscribers and pollers, waits for a
//!   termination signal and shuts them down together.

mod coordinator;
mod registry;
mod relayer;
mod summary;

pub use coordinator::{Coordinator, RunReport};
pub use registry::SubscriptionRegistry;
pub use relayer::{RelayerCore, RelayerHandle, RelayerState};
pub use summary::WorkSummary;
