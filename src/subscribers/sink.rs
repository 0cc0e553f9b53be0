//! # Sink: the bounded handle a subscriber receives messages through.
//!
//! A [`Sink`] is the sending half the relayer holds; the [`SinkReceiver`] is the
//! half the subscriber owns and drains. Both wrap a bounded
//! [`tokio::sync::mpsc`] channel.
//!
//! ## Rules
//! - [`Sink::is_full`] never blocks; it checks the remaining permits.
//! - [`Sink::try_deliver`] never blocks; a full or closed sink rejects the
//!   message and the caller counts it as skipped.
//! - The subscriber's existing backlog is never touched by a rejected delivery.
//!
//! ## Example
//! ```rust
//! use relaykit::{sink, Delivery, Message, PriorityClass};
//!
//! let (tx, mut rx) = sink::channel("bob", 1);
//! let msg = Message::new(PriorityClass::ClassA, "hello");
//!
//! assert_eq!(tx.try_deliver(msg.clone()), Delivery::Delivered);
//! assert!(tx.is_full());
//! assert_eq!(tx.try_deliver(msg), Delivery::Full);
//! assert_eq!(rx.try_recv().map(|m| m.text().into_owned()), Some("hello".to_string()));
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::messages::Message;

/// Outcome of a non-blocking delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Message is now in the subscriber's backlog.
    Delivered,
    /// Sink was at capacity; message dropped for this subscriber.
    Full,
    /// Receiver was dropped; message dropped for this subscriber.
    Closed,
}

/// Builds a bounded sink pair. Capacity is clamped to a minimum of 1.
pub fn channel(name: impl Into<Arc<str>>, capacity: usize) -> (Sink, SinkReceiver) {
    let name = name.into();
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        Sink {
            name: Arc::clone(&name),
            tx,
        },
        SinkReceiver { name, rx },
    )
}

/// Sending half of a subscriber sink. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Sink {
    name: Arc<str>,
    tx: mpsc::Sender<Message>,
}

impl Sink {
    /// Name of the owning subscriber (for logs).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the backlog is at capacity.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.tx.capacity() == 0
    }

    /// True if the receiver is gone.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Bound the sink was created with.
    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Best-effort, non-blocking delivery.
    pub fn try_deliver(&self, msg: Message) -> Delivery {
        match self.tx.try_send(msg) {
            Ok(()) => Delivery::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// True if both handles feed the same receiver.
    pub fn same_channel(&self, other: &Sink) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

/// Receiving half of a subscriber sink.
#[derive(Debug)]
pub struct SinkReceiver {
    name: Arc<str>,
    rx: mpsc::Receiver<Message>,
}

impl SinkReceiver {
    /// Name of the owning subscriber.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the next message; `None` once every sink handle is dropped.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Takes the next message if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Messages currently waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// True if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
