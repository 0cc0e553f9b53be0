//! # NoopSubscriber: never reads.
//!
//! Holds a sink for both lanes but never drains them, so its backlog fills up to
//! capacity and stays there. Useful for exercising relay backpressure.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::sink::{self, Sink, SinkReceiver};
use super::Subscribe;
use crate::messages::PriorityClass;

/// Subscriber that keeps its sinks open and never consumes them.
pub struct NoopSubscriber {
    name: String,
    class_a: (Sink, SinkReceiver),
    class_b: (Sink, SinkReceiver),
}

impl NoopSubscriber {
    /// Creates a noop subscriber whose sinks hold `capacity` messages each.
    pub fn new(capacity: usize) -> Self {
        Self::named("noop subscriber", capacity)
    }

    /// Same as [`NoopSubscriber::new`] with a custom name.
    pub fn named(name: impl Into<String>, capacity: usize) -> Self {
        let name = name.into();
        Self {
            class_a: sink::channel(name.as_str(), capacity),
            class_b: sink::channel(name.as_str(), capacity),
            name,
        }
    }

    /// Messages waiting in the sink for `lane`.
    pub fn backlog(&self, lane: PriorityClass) -> usize {
        match lane {
            PriorityClass::ClassA => self.class_a.1.len(),
            PriorityClass::ClassB => self.class_b.1.len(),
            PriorityClass::Both => self.class_a.1.len() + self.class_b.1.len(),
        }
    }
}

#[async_trait]
impl Subscribe for NoopSubscriber {
    fn name(&self) -> &str {
        &self.name
    }

    fn interest(&self) -> PriorityClass {
        PriorityClass::Both
    }

    fn sink(&self, lane: PriorityClass) -> Option<Sink> {
        match lane {
            PriorityClass::ClassA => Some(self.class_a.0.clone()),
            PriorityClass::ClassB => Some(self.class_b.0.clone()),
            PriorityClass::Both => None,
        }
    }

    async fn drain(&self, token: CancellationToken) {
        token.cancelled().await;
        debug!(subscriber = %self.name, "noop subscriber stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Message;
    use crate::subscribers::Delivery;

    #[test]
    fn test_backlog_fills_and_stays() {
        let sub = NoopSubscriber::new(2);
        let sink = sub.sink(PriorityClass::ClassA).expect("sink");
        for _ in 0..3 {
            let _ = sink.try_deliver(Message::new(PriorityClass::ClassA, "x"));
        }
        assert!(sink.is_full());
        assert_eq!(sub.backlog(PriorityClass::ClassA), 2);
        assert_eq!(sub.backlog(PriorityClass::ClassB), 0);
        assert_eq!(
            sink.try_deliver(Message::new(PriorityClass::ClassA, "y")),
            Delivery::Full
        );
    }

    #[tokio::test]
    async fn test_drain_returns_on_cancel() {
        let sub = NoopSubscriber::new(1);
        let token = CancellationToken::new();
        token.cancel();
        sub.drain(token).await;
        assert_eq!(sub.processed(), 0);
    }
}
