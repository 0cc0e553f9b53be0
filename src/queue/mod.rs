//! Bounded recency queues.
//!
//! One queue per priority lane. The queue always surfaces the most recently
//! pushed message first and, when trimmed, discards from the oldest end.
//!
//! ```text
//!   push ──►┌──────┬──────┬──────┬──────┐
//!   pop  ◄──│ m5   │ m4   │ m3   │ m2   │──► resize() evicts here
//!           └──────┴──────┴──────┴──────┘
//!          most-recent end       oldest end
//! ```
//!
//! ## Contents
//! - [`RecencyBuffer`] the single-owner ring buffer (no locking)
//! - [`BoundedRecencyQueue`] the shared, mutex-guarded queue used by the relayer

mod bounded;
mod buffer;

pub use bounded::BoundedRecencyQueue;
pub use buffer::RecencyBuffer;
