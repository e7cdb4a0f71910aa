//! Priority queue of nodes ordered by key.
//!
//! Behaves like a multimap: re-inserting a node that is already queued leaves
//! the older entry in place. Equal keys pop in insertion order.

use crate::node::{DNode, Tag};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    key: FloatOrd,
    seq: u64,
    id: usize,
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Default)]
pub struct OpenList {
    heap: BinaryHeap<Reverse<OpenEntry>>,
    next_seq: u64,
}

impl OpenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `node` (stored at `id`) with path cost `new_cost`.
    ///
    /// The key depends on the node's tag: a NEW node takes `new_cost`, an OPEN
    /// node keeps the smaller of its key and `new_cost`, a CLOSED node takes the
    /// smaller of its old cost and `new_cost`.
    pub fn insert(&mut self, node: &mut DNode, id: usize, new_cost: f64) {
        node.key = match node.tag {
            Tag::New => new_cost,
            Tag::Open => node.key.min(new_cost),
            Tag::Closed => node.cost.min(new_cost),
        };
        node.cost = new_cost;
        node.tag = Tag::Open;
        self.push(node.key, id);
    }

    fn push(&mut self, key: f64, id: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(OpenEntry {
            key: FloatOrd(key),
            seq,
            id,
        }));
    }

    /// Removes the entry with the smallest key.
    pub fn pop_min(&mut self) -> Option<(f64, usize)> {
        self.heap
            .pop()
            .map(|Reverse(entry)| (entry.key.0, entry.id))
    }

    pub fn min_key(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(entry)| entry.key.0)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}
