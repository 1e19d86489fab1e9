//! KD-Tree for exact k-nearest neighbour search in nD space.
//!
//! ## Purpose
//!
//! This module implements a static KD-tree over the reference points of a
//! fitted search. Organising points in a spatial hierarchy reduces the search
//! time from O(n) to approximately O(log n) per query in low dimensions.
//!
//! ## Design notes
//!
//! * **Static Construction**: The tree is built once at fit time and then only queried.
//! * **Eytzinger Layout**: Nodes are stored as a left-complete binary tree in an
//!   array; children of node `i` live at `2i+1` and `2i+2`.
//! * **Permuted Points**: Point coordinates are copied next to their node for cache locality.
//! * **Trait-based Distance**: Works with any [`PointDistance`] implementation.
//!
//! ## Key concepts
//!
//! * **Splitting Plane**: The axis cycles with depth; the node's own point is the split value.
//! * **Pruning**: A far subtree is skipped once k candidates are held and the
//!   splitting plane is farther than the current k-th best.
//!
//! ## Invariants
//!
//! * Queries always return the exact nearest neighbours (no approximation).
//! * Returned neighbours are unordered unless the caller sorts them.
//!
//! ## Non-goals
//!
//! * This module does not support dynamic insertions or deletions.
//! * This module does not support approximate nearest neighbour search.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::cmp::Ordering::{self, Equal};
use num_traits::Float;

// Internal dependencies
use crate::math::distance::PointDistance;
use crate::primitives::buffer::NeighborhoodSearchBuffer;

// ============================================================================
// Helper Types
// ============================================================================

/// Heap entry for k-nearest search: `(point index, reduced distance)`.
/// Orders by distance.
#[derive(Debug, Clone, Copy)]
pub struct NodeDistance<T>(pub usize, pub T);

impl<T: PartialEq> PartialEq for NodeDistance<T> {
    fn eq(&self, other: &Self) -> bool {
        self.1 == other.1
    }
}
impl<T: PartialEq> Eq for NodeDistance<T> {}

impl<T: PartialOrd> PartialOrd for NodeDistance<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: PartialOrd> Ord for NodeDistance<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1.partial_cmp(&other.1).unwrap_or(Equal)
    }
}

// ============================================================================
// Neighborhood Structure
// ============================================================================

/// Result container for a single k-nearest neighbour query.
#[derive(Debug, Clone)]
pub struct Neighborhood<T> {
    /// Indices of the k nearest reference points.
    pub indices: Vec<usize>,
    /// Distances to each neighbour (corresponding to `indices`).
    pub distances: Vec<T>,
}

impl<T: Float> Neighborhood<T> {
    /// Create a new empty neighborhood.
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            distances: Vec::new(),
        }
    }

    /// Pre-allocate buffers for a neighborhood of size k.
    pub fn with_capacity(k: usize) -> Self {
        Self {
            indices: Vec::with_capacity(k),
            distances: Vec::with_capacity(k),
        }
    }

    /// Remove all neighbours, keeping capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.indices.clear();
        self.distances.clear();
    }

    /// Append one neighbour.
    #[inline]
    pub fn push(&mut self, index: usize, distance: T) {
        self.indices.push(index);
        self.distances.push(distance);
    }

    /// Sort neighbours by ascending distance, ties broken by index.
    pub fn sort(&mut self) {
        let mut pairs: Vec<(usize, T)> = self
            .indices
            .iter()
            .copied()
            .zip(self.distances.iter().copied())
            .collect();
        pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Equal).then(a.0.cmp(&b.0)));
        self.clear();
        for (index, distance) in pairs {
            self.push(index, distance);
        }
    }
}

impl<T: Float> Default for Neighborhood<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// KD-Tree Implementation
// ============================================================================

/// Node of the Eytzinger-layout tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct KDNode {
    /// Index of the point in the original row order.
    pub index: usize,
}

/// KD-tree for spatial indexing of nD points.
#[derive(Debug, Clone)]
pub struct KDTree<T: Float> {
    /// The implicit Eytzinger tree nodes.
    nodes: Vec<KDNode>,
    /// Permuted points aligned with the nodes.
    points: Vec<T>,
    /// Dimensionality of the data.
    dimensions: usize,
}

impl<T: Float> KDTree<T> {
    // ------------------------------------------------------------------------
    // Public API
    // ------------------------------------------------------------------------

    /// Build a KD-tree from a row-major flattened point array.
    pub fn new(points: &[T], dimensions: usize) -> Self {
        debug_assert!(dimensions > 0);
        let n = points.len() / dimensions;
        let mut indices: Vec<usize> = (0..n).collect();

        // The Eytzinger layout needs the full node array up front.
        let mut nodes = vec![KDNode::default(); n];
        let mut permuted_points = vec![T::zero(); n * dimensions];

        Self::build_recursive(
            points,
            dimensions,
            &mut indices,
            0,
            &mut nodes,
            &mut permuted_points,
            0,
        );

        Self {
            nodes,
            points: permuted_points,
            dimensions,
        }
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dimensionality of indexed points.
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Find the k nearest indexed points to `query`.
    ///
    /// Uses the provided buffer and neighborhood to avoid allocations. The
    /// result holds `min(k, len)` unordered neighbours with true distances.
    pub fn find_k_nearest<D: PointDistance<T>>(
        &self,
        query: &[T],
        k: usize,
        dist_calc: &D,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        neighborhood: &mut Neighborhood<T>,
    ) {
        neighborhood.clear();
        if k == 0 || self.is_empty() {
            return;
        }

        buffer.clear();
        self.search_iterative(query, k, dist_calc, buffer);

        for &NodeDistance(idx, dist) in buffer.heap.iter() {
            neighborhood.push(idx, dist_calc.post_process_distance(dist));
        }
    }

    // ------------------------------------------------------------------------
    // Private Helpers & Algorithms
    // ------------------------------------------------------------------------

    /// Recursively builds the tree in Eytzinger layout.
    fn build_recursive(
        points: &[T],
        dims: usize,
        indices: &mut [usize],
        depth: usize,
        nodes: &mut [KDNode],
        permuted_points: &mut [T],
        curr_idx: usize,
    ) {
        if indices.is_empty() {
            return;
        }

        let axis = depth % dims;
        let n = indices.len();

        // Pivot rank that keeps the tree left-complete.
        let median_idx = Self::calculate_left_subtree_size(n);

        if median_idx < n {
            indices.select_nth_unstable_by(median_idx, |&a, &b| {
                points[a * dims + axis]
                    .partial_cmp(&points[b * dims + axis])
                    .unwrap_or(Equal)
            });
        }

        let point_idx = indices[median_idx];
        nodes[curr_idx] = KDNode { index: point_idx };

        let src_start = point_idx * dims;
        let dest_start = curr_idx * dims;
        permuted_points[dest_start..dest_start + dims]
            .copy_from_slice(&points[src_start..src_start + dims]);

        let (left_part, right_part_with_median) = indices.split_at_mut(median_idx);
        let right_part = &mut right_part_with_median[1..];

        Self::build_recursive(
            points,
            dims,
            left_part,
            depth + 1,
            nodes,
            permuted_points,
            2 * curr_idx + 1,
        );
        Self::build_recursive(
            points,
            dims,
            right_part,
            depth + 1,
            nodes,
            permuted_points,
            2 * curr_idx + 2,
        );
    }

    /// Depth-first search with an explicit `(node, axis)` stack.
    fn search_iterative<D: PointDistance<T>>(
        &self,
        query: &[T],
        k: usize,
        dist_calc: &D,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
    ) {
        let d = self.dimensions;
        let heap = &mut buffer.heap;
        let stack = &mut buffer.stack;
        let nodes_len = self.nodes.len();

        let mut heap_full = false;
        let mut max_dist = T::infinity();

        stack.push((0, 0));

        while let Some((node_idx, axis)) = stack.pop() {
            let node = self.nodes[node_idx];
            let offset = node_idx * d;
            let node_point = &self.points[offset..offset + d];

            // 1. Current node
            let dist = dist_calc.reduced_distance(query, node_point);
            if !heap_full {
                heap.push(NodeDistance(node.index, dist));
                if heap.len() == k {
                    heap_full = true;
                    max_dist = heap.peek().map(|nd| nd.1).unwrap_or(T::infinity());
                }
            } else if dist < max_dist {
                if let Some(mut top) = heap.peek_mut() {
                    *top = NodeDistance(node.index, dist);
                }
                max_dist = heap.peek().map(|nd| nd.1).unwrap_or(T::infinity());
            }

            // 2. Traversal order
            let left_child = 2 * node_idx + 1;
            if left_child >= nodes_len {
                continue;
            }
            let right_child = left_child + 1;
            let has_right = right_child < nodes_len;

            let split_val = node_point[axis];
            let next_axis = if axis + 1 == d { 0 } else { axis + 1 };

            // Query on the left of the plane: near = left, far = right.
            let go_left = query[axis] <= split_val;
            let (near, far, has_near, has_far) = if go_left {
                (left_child, right_child, true, has_right)
            } else {
                (right_child, left_child, has_right, true)
            };

            // 3. Far side only if it can still hold a closer point
            if has_far {
                let dist_to_plane = dist_calc.split_reduced_distance(split_val, query[axis]);
                if !heap_full || dist_to_plane < max_dist {
                    stack.push((far, next_axis));
                }
            }

            // 4. Near side is always explored (pushed last, popped first)
            if has_near {
                stack.push((near, next_axis));
            }
        }
    }

    /// Number of nodes in the left subtree of a left-complete binary tree of size n.
    pub fn calculate_left_subtree_size(n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let h = (usize::BITS - n.leading_zeros() - 1) as usize;
        if h == 0 {
            return 0;
        }

        let max_leaf_capacity = 1 << h;
        let total_nodes_above_leaf = max_leaf_capacity - 1;
        let r = n - total_nodes_above_leaf;

        let left_part_leaves = r.min(max_leaf_capacity / 2);
        let left_subtree_capacity_full = (max_leaf_capacity / 2) - 1;
        left_subtree_capacity_full + left_part_leaves
    }
}
