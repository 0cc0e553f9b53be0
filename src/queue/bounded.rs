//! # Shared bounded recency queue.
//!
//! [`BoundedRecencyQueue`] wraps a [`RecencyBuffer`] in a [`parking_lot::Mutex`]
//! so that the enqueuing caller and the broadcast loop can mutate it concurrently.
//! Every operation holds the lock for O(1) work (O(k) for `resize`), so
//! contention stays low and nothing ever awaits while holding it.

use parking_lot::Mutex;

use super::buffer::RecencyBuffer;
use crate::messages::Message;

/// Thread-safe bounded recency queue for one priority lane.
#[derive(Debug)]
pub struct BoundedRecencyQueue {
    inner: Mutex<RecencyBuffer>,
}

impl BoundedRecencyQueue {
    /// Creates an empty queue with the given retention bound (min 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(RecencyBuffer::new(capacity)),
        }
    }

    /// Inserts at the most-recent end. Never blocks on capacity.
    pub fn push(&self, msg: Message) {
        self.inner.lock().push(msg);
    }

    /// Removes the most recent message, if any.
    pub fn pop(&self) -> Option<Message> {
        self.inner.lock().pop()
    }

    /// Evicts oldest messages down to the bound; returns the eviction count.
    pub fn resize(&self) -> usize {
        self.inner.lock().resize()
    }

    /// Size as of the last completed mutation.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Retention bound.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::messages::PriorityClass;

    #[test]
    fn test_concurrent_push_and_resize() {
        let queue = Arc::new(BoundedRecencyQueue::new(8));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let q = Arc::clone(&queue);
                std::thread::spawn(move || {
                    let mut evicted = 0;
                    for i in 0..250 {
                        q.push(Message::new(PriorityClass::ClassB, format!("{t}-{i}")));
                        evicted += q.resize();
                    }
                    evicted
                })
            })
            .collect();

        let evicted: usize = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .sum();

        assert!(queue.len() < queue.capacity());
        assert_eq!(evicted + queue.len(), 1000);
    }

    #[test]
    fn test_empty_pop_is_none() {
        let queue = BoundedRecencyQueue::new(3);
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }
}
