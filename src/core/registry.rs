//! # Subscription registry.
//!
//! Maps each concrete lane to the ordered list of sinks interested in it.
//! Insertion order is delivery order within one broadcast pass.
//!
//! ## Rules
//! - Registering with `Both` appends the same handle to both lanes.
//! - The registry holds sending halves only; subscribers own the receivers.
//! - Writers (`subscribe`) exclude each other and exclude readers during a
//!   broadcast pass (`with_sinks` holds the read lock while delivering).
//! - There is no removal: sinks live for the relayer's lifetime.

use parking_lot::RwLock;

use crate::messages::PriorityClass;
use crate::subscribers::Sink;

/// Per-lane ordered sink lists.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    class_a: RwLock<Vec<Sink>>,
    class_b: RwLock<Vec<Sink>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `sink` to every lane `class` routes to.
    pub fn subscribe(&self, class: PriorityClass, sink: Sink) {
        for lane in class.lanes() {
            if let Some(list) = self.list(lane) {
                list.write().push(sink.clone());
            }
        }
    }

    /// Insertion-ordered snapshot of the sinks for `class`.
    ///
    /// For `Both`, class A's sinks come first, followed by class B's.
    pub fn sinks_for(&self, class: PriorityClass) -> Vec<Sink> {
        class
            .lanes()
            .filter_map(|lane| self.list(lane))
            .flat_map(|list| list.read().clone())
            .collect()
    }

    /// Runs `f` over one lane's sinks while holding the read lock.
    pub fn with_sinks<R>(&self, lane: PriorityClass, f: impl FnOnce(&[Sink]) -> R) -> R {
        match self.list(lane) {
            Some(list) => f(&list.read()),
            None => f(&[]),
        }
    }

    /// Number of sinks registered on one concrete lane.
    pub fn len(&self, lane: PriorityClass) -> usize {
        self.list(lane).map_or(0, |list| list.read().len())
    }

    /// True if no lane has any sink.
    pub fn is_empty(&self) -> bool {
        self.class_a.read().is_empty() && self.class_b.read().is_empty()
    }

    fn list(&self, lane: PriorityClass) -> Option<&RwLock<Vec<Sink>>> {
        match lane {
            PriorityClass::ClassA => Some(&self.class_a),
            PriorityClass::ClassB => Some(&self.class_b),
            PriorityClass::Both => None,
        }
    }
}
