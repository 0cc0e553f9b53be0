//! # Ring buffer with recency-first pop and oldest-first eviction.
//!
//! [`RecencyBuffer`] is a [`VecDeque`] used as a double-ended ring:
//! the front is the most-recent end, the back is the oldest end.
//!
//! ## Rules
//! - `push` never fails and never evicts; `len` may exceed `capacity`.
//! - `pop` is LIFO: fresh messages are broadcast before stale backlog.
//! - `resize` evicts from the back while `len >= capacity && len > 1`,
//!   so a non-empty buffer is never emptied by eviction alone.

use std::collections::VecDeque;

use crate::messages::Message;

/// Single-owner recency buffer.
#[derive(Debug)]
pub struct RecencyBuffer {
    items: VecDeque<Message>,
    capacity: usize,
}

impl RecencyBuffer {
    /// Creates an empty buffer. Capacity is clamped to a minimum of 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts at the most-recent end.
    #[inline]
    pub fn push(&mut self, msg: Message) {
        self.items.push_front(msg);
    }

    /// Removes the most recently pushed message.
    #[inline]
    pub fn pop(&mut self) -> Option<Message> {
        self.items.pop_front()
    }

    /// Evicts from the oldest end and returns how many messages were dropped.
    pub fn resize(&mut self) -> usize {
        let mut evicted = 0;
        while self.items.len() >= self.capacity && self.items.len() > 1 {
            self.items.pop_back();
            evicted += 1;
        }
        evicted
    }

    /// Number of retained messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing is retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Configured retention bound.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
