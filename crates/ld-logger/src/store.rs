//! Arena-backed payload store.
//!
//! Payload bytes live back to back in one arena; each stored payload is a
//! `PayloadId` handle resolving to a span of that arena. The slot capacity is
//! tracked explicitly: it starts at `INITIAL_CAPACITY`, doubles whenever the
//! store is full, and never shrinks until `release`.

use std::ops::Range;

/// Slot capacity of a fresh store.
pub const INITIAL_CAPACITY: usize = 32;

/// Handle to a payload owned by a `MessageStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PayloadId(usize);

impl PayloadId {
    /// Arrival index of the payload (0-based).
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered collection of owned payloads; insertion order is arrival order.
#[derive(Debug, Clone)]
pub struct MessageStore {
    arena: Vec<u8>,
    spans: Vec<Range<usize>>,
    capacity: usize,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            spans: Vec::with_capacity(INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Number of payload slots currently reserved. Always `>= len()`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Double the capacity if every slot is taken.
    pub fn grow_if_full(&mut self) {
        if self.spans.len() < self.capacity {
            return;
        }
        self.capacity = (self.capacity * 2).max(INITIAL_CAPACITY);
        self.spans.reserve_exact(self.capacity - self.spans.len());
        tracing::trace!(capacity = self.capacity, "payload store grown");
    }

    /// Copy `payload` into the store and return its handle.
    ///
    /// Payloads are NUL-free: anything from the first NUL byte on is dropped.
    pub fn append(&mut self, payload: &[u8]) -> PayloadId {
        self.grow_if_full();
        let payload = match payload.iter().position(|&b| b == 0) {
            Some(nul) => &payload[..nul],
            None => payload,
        };
        let start = self.arena.len();
        self.arena.extend_from_slice(payload);
        self.spans.push(start..self.arena.len());
        PayloadId(self.spans.len() - 1)
    }

    /// Bytes of the payload behind `id`, if it belongs to this store.
    pub fn get(&self, id: PayloadId) -> Option<&[u8]> {
        self.spans.get(id.0).map(|span| &self.arena[span.clone()])
    }

    /// Handles of every stored payload, in arrival order.
    pub fn ids(&self) -> impl Iterator<Item = PayloadId> + '_ {
        (0..self.spans.len()).map(PayloadId)
    }

    /// Stored payloads in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.spans.iter().map(|span| &self.arena[span.clone()])
    }

    /// Free every payload and reset count and capacity to zero.
    pub fn release(&mut self) {
        self.arena = Vec::new();
        self.spans = Vec::new();
        self.capacity = 0;
    }

    pub(crate) fn bytes(&self, id: PayloadId) -> &[u8] {
        &self.arena[self.spans[id.0].clone()]
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
