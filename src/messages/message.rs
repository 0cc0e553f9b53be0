//! # Message and priority class.
//!
//! A [`Message`] is an opaque [`Bytes`] payload tagged with a [`PriorityClass`].
//! Messages are immutable once built; cloning only bumps the payload refcount,
//! so fanning one message out to many sinks never copies the bytes.
//!
//! ## Example
//! ```rust
//! use relaykit::{Message, PriorityClass};
//!
//! let msg = Message::new(PriorityClass::Both, "round 7 started");
//! let lanes: Vec<_> = msg.class().lanes().collect();
//! assert_eq!(lanes, vec![PriorityClass::ClassA, PriorityClass::ClassB]);
//!
//! let copy = msg.for_lane(PriorityClass::ClassB);
//! assert_eq!(copy.class(), PriorityClass::ClassB);
//! assert_eq!(copy.payload(), msg.payload());
//! ```

use std::fmt;

use bytes::Bytes;

/// Priority class of a message.
///
/// Class A (round-start signaling) is always broadcast ahead of class B
/// (answer notifications) within one relayer pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityClass {
    /// High-priority lane.
    ClassA,
    /// Low-priority lane.
    ClassB,
    /// Routing alias: deliver on both lanes.
    Both,
}

impl PriorityClass {
    /// Concrete lanes this class routes to, class A first.
    pub fn lanes(self) -> impl Iterator<Item = PriorityClass> {
        let lanes: &'static [PriorityClass] = match self {
            PriorityClass::ClassA => &[PriorityClass::ClassA],
            PriorityClass::ClassB => &[PriorityClass::ClassB],
            PriorityClass::Both => &[PriorityClass::ClassA, PriorityClass::ClassB],
        };
        lanes.iter().copied()
    }

    /// True if this class routes to `lane`.
    pub fn includes(self, lane: PriorityClass) -> bool {
        self.lanes().any(|l| l == lane)
    }

    /// Short stable label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            PriorityClass::ClassA => "class_a",
            PriorityClass::ClassB => "class_b",
            PriorityClass::Both => "both",
        }
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Immutable relay message.
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    class: PriorityClass,
    payload: Bytes,
}

impl Message {
    /// Builds a message from anything convertible into [`Bytes`].
    pub fn new(class: PriorityClass, payload: impl Into<Bytes>) -> Self {
        Self {
            class,
            payload: payload.into(),
        }
    }

    /// Priority class the message was created with.
    pub fn class(&self) -> PriorityClass {
        self.class
    }

    /// Raw payload.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Copy of this message re-tagged for one concrete lane.
    ///
    /// The payload is shared, not copied.
    pub fn for_lane(&self, lane: PriorityClass) -> Self {
        debug_assert!(lane != PriorityClass::Both, "lane must be concrete");
        Self {
            class: lane,
            payload: self.payload.clone(),
        }
    }

    /// Payload as UTF-8 text, lossy.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("class", &self.class)
            .field("payload", &self.text())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lanes_expand_both() {
        assert_eq!(
            PriorityClass::ClassA.lanes().collect::<Vec<_>>(),
            vec![PriorityClass::ClassA]
        );
        assert_eq!(
            PriorityClass::ClassB.lanes().collect::<Vec<_>>(),
            vec![PriorityClass::ClassB]
        );
        assert_eq!(
            PriorityClass::Both.lanes().collect::<Vec<_>>(),
            vec![PriorityClass::ClassA, PriorityClass::ClassB]
        );
    }

    #[test]
    fn test_includes() {
        assert!(PriorityClass::Both.includes(PriorityClass::ClassA));
        assert!(PriorityClass::Both.includes(PriorityClass::ClassB));
        assert!(!PriorityClass::ClassA.includes(PriorityClass::ClassB));
    }

    #[test]
    fn test_for_lane_shares_payload() {
        let msg = Message::new(PriorityClass::Both, "payload");
        let a = msg.for_lane(PriorityClass::ClassA);

        assert_eq!(a.class(), PriorityClass::ClassA);
        assert_eq!(a.payload().as_ptr(), msg.payload().as_ptr());
        assert_eq!(a.text(), "payload");
    }
}
