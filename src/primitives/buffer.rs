//! Reusable scratch space for k-nearest neighbour searches.
//!
//! ## Purpose
//!
//! A KD-tree query needs a bounded max-heap of candidates and an explicit
//! traversal stack. Allocating both once per worker and clearing them between
//! queries keeps the per-query cost allocation free.
//!
//! ## Invariants
//!
//! * Buffers are only logically cleared (`clear()`), never shrunk.
//!
//! ## Non-goals
//!
//! * Thread-local automatic caching (one buffer is passed explicitly per worker).

// Feature-gated dependencies
#[cfg(not(feature = "std"))]
use alloc::collections::BinaryHeap;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BinaryHeap;
#[cfg(feature = "std")]
use std::vec::Vec;

/// Heap and traversal stack reused across KD-tree queries.
#[derive(Debug, Clone)]
pub struct NeighborhoodSearchBuffer<N> {
    /// Bounded max-heap of the best candidates seen so far.
    pub(crate) heap: BinaryHeap<N>,
    /// Pending `(node, axis)` pairs.
    pub(crate) stack: Vec<(usize, usize)>,
}

impl<N: Ord> NeighborhoodSearchBuffer<N> {
    /// Create a new search buffer for `k` neighbours.
    pub fn new(k: usize) -> Self {
        // Stack depth is bounded by tree height; 32 covers ~4G points.
        Self {
            heap: BinaryHeap::with_capacity(k),
            stack: Vec::with_capacity(32),
        }
    }

    /// Clear all internal buffers for reuse.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.stack.clear();
    }
}
