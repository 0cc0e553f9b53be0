//! Relay messages: payload and priority classification.
//!
//! ## Contents
//! - [`PriorityClass`] class A / class B and the `Both` routing alias
//! - [`Message`] immutable payload tagged with its class
//!
//! `Both` only exists on the way in. [`PriorityClass::lanes`] expands it into the
//! concrete lanes, and every copy that sits in a queue or reaches a sink carries
//! `ClassA` or `ClassB`.

mod message;

pub use message::{Message, PriorityClass};
