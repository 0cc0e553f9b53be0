//! # Source abstraction.
//!
//! A [`Source`] hands out one message per `read` call, synchronously. The error
//! type is chosen by the implementation and travels back to the caller
//! untouched: [`RelayerCore::read`](crate::RelayerCore::read) neither retries nor
//! wraps it.
//!
//! # Example
//! ```
//! use relaykit::{Message, PriorityClass, Source};
//!
//! struct Fixed;
//!
//! impl Source for Fixed {
//!     type Error = std::io::Error;
//!
//!     fn read(&self) -> Result<Message, Self::Error> {
//!         Ok(Message::new(PriorityClass::ClassA, "tick"))
//!     }
//! }
//!
//! assert_eq!(Fixed.read().unwrap().text(), "tick");
//! ```

use std::sync::Arc;

use crate::messages::Message;

/// Producer of relay messages.
pub trait Source: Send + Sync + 'static {
    /// Error surfaced verbatim to the caller of `read`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the next message, or the source's own error.
    fn read(&self) -> Result<Message, Self::Error>;
}

impl<S: Source> Source for Arc<S> {
    type Error = S::Error;

    fn read(&self) -> Result<Message, Self::Error> {
        (**self).read()
    }
}
