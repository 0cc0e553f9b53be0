//! Message sources feeding a relayer.
//!
//! The relay core only needs [`Source::read`]; transport, format and retry
//! policy all live on the caller's side. Two simulated feeds ship with the crate:
//!
//! - [`ScriptedSource`] replays a fixed script, then a default message
//! - [`RandomSource`] produces numbered mock messages with a random class

mod random;
mod scripted;
mod source;

pub use random::RandomSource;
pub use scripted::ScriptedSource;
pub use source::Source;
