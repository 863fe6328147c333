//! Per-topic replay ring
//!
//! Each live topic keeps a bounded ring of its most recent events so a
//! tail query can replay them without any durable storage. The ring is
//! insertion-ordered, drops the oldest entry first, and is read-only on
//! query. It lives and dies with its topic entry: when the last
//! subscriber leaves, the ring is discarded with the topic.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A buffered event available for replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailEvent {
    /// Caller-supplied event id
    pub id: String,
    /// Event payload as published
    pub payload: String,
}

/// Bounded ring of recent events for one topic
#[derive(Debug)]
pub struct TailBuffer {
    events: VecDeque<TailEvent>,
    capacity: usize,
}

impl TailBuffer {
    /// Create a ring with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Append an event, evicting the oldest entry when full
    pub fn push(&mut self, event: TailEvent) {
        if self.capacity == 0 {
            return;
        }

        if self.events.len() == self.capacity {
            self.events.pop_front();
        }

        self.events.push_back(event);
    }

    /// Copy out up to `limit` of the most recent events
    ///
    /// Insertion order, most-recent last. Never mutates the ring.
    pub fn recent(&self, limit: usize) -> Vec<TailEvent> {
        let skip = self.events.len().saturating_sub(limit);
        self.events.iter().skip(skip).cloned().collect()
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check whether the ring is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
