//! k-nearest neighbour search provider.
//!
//! ## Purpose
//!
//! This module defines the [`NeighborSearch`] seam through which estimators
//! obtain the distances (and optionally indices) of the `k` nearest reference
//! points of every query row, and ships [`Knn`], an exact implementation.
//!
//! ## Design notes
//!
//! * **Configure / fit / transform**: A provider is configured with `k`, the
//!   requested outputs and a [`SearchConfig`], bound to reference data by
//!   `fit`, and then queried any number of times.
//! * **Backends**: Coordinates are searched with an Eytzinger KD-tree or by
//!   brute force; precomputed distance rows are reduced by selection.
//! * **Parallelism**: With the `parallel` feature, query rows are answered on
//!   the rayon pool with one search buffer per worker.
//!
//! ## Key concepts
//!
//! * **Precomputed**: Reference input is a square distance matrix; query rows
//!   hold distances to every reference point.
//! * **Neighbors**: Not a search at all; [`Knn`] rejects it.
//!
//! ## Invariants
//!
//! * Results are exact and row-aligned with the query.
//! * With `sort_results`, each row is in ascending distance order (ties by index).
//!
//! ## Non-goals
//!
//! * Approximate search, GPU backends, incremental index updates.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::cmp::Ordering::Equal;
use core::fmt::Debug;
use log::{debug, trace};
use num_traits::Float;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Internal dependencies
use crate::engine::validator::Validator;
use crate::math::distance::{DistanceMetric, Metric, PointDistance};
use crate::math::neighborhood::{KDTree, Neighborhood, NodeDistance};
use crate::primitives::buffer::NeighborhoodSearchBuffer;
use crate::primitives::errors::DtmError;

/// Above this many columns `Algorithm::Auto` prefers brute force.
const KDTREE_MAX_AUTO_DIMENSIONS: usize = 16;

// ============================================================================
// Configuration
// ============================================================================

/// Search backend for coordinate input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// KD-tree for low-dimensional data, brute force otherwise.
    #[default]
    Auto,

    /// Always use a KD-tree.
    KdTree,

    /// Always compare against every reference point.
    BruteForce,
}

/// Search configuration passed through from the estimator builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig<T> {
    /// How input rows are interpreted.
    pub metric: Metric<T>,
    /// Backend for coordinate input.
    pub algorithm: Algorithm,
    /// Return each row sorted by ascending distance.
    pub sort_results: bool,
    /// Answer query rows in parallel (requires the `parallel` feature).
    pub parallel: bool,
}

impl<T: Float> Default for SearchConfig<T> {
    fn default() -> Self {
        Self {
            metric: Metric::Euclidean,
            algorithm: Algorithm::Auto,
            sort_results: false,
            parallel: false,
        }
    }
}

/// Which outputs a search should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnnOutput {
    /// Produce neighbour indices.
    pub return_index: bool,
    /// Produce neighbour distances.
    pub return_distance: bool,
}

impl KnnOutput {
    /// Distances only.
    pub const DISTANCES: KnnOutput = KnnOutput {
        return_index: false,
        return_distance: true,
    };

    /// Indices only.
    pub const INDICES: KnnOutput = KnnOutput {
        return_index: true,
        return_distance: false,
    };

    /// Indices and distances.
    pub const BOTH: KnnOutput = KnnOutput {
        return_index: true,
        return_distance: true,
    };
}

// ============================================================================
// Search Result
// ============================================================================

/// Row-major `n_queries × k` neighbour table.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnResult<T> {
    /// Neighbours per row.
    pub k: usize,
    /// Number of query rows.
    pub n_queries: usize,
    /// Distances, when requested.
    pub distances: Option<Vec<T>>,
    /// Reference indices, when requested.
    pub indices: Option<Vec<usize>>,
}

impl<T> KnnResult<T> {
    /// Distances of query row `row`, if distances were requested.
    pub fn row_distances(&self, row: usize) -> Option<&[T]> {
        self.distances
            .as_deref()
            .map(|d| &d[row * self.k..(row + 1) * self.k])
    }

    /// Indices of query row `row`, if indices were requested.
    pub fn row_indices(&self, row: usize) -> Option<&[usize]> {
        self.indices
            .as_deref()
            .map(|i| &i[row * self.k..(row + 1) * self.k])
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// A k-nearest neighbour search provider.
pub trait NeighborSearch<T: Float>: Sized {
    /// Create an unfitted provider, validating the configuration.
    fn configure(k: usize, output: KnnOutput, config: &SearchConfig<T>) -> Result<Self, DtmError>;

    /// Bind the provider to `reference` (`columns` values per row).
    fn fit(&mut self, reference: &[T], columns: usize) -> Result<&mut Self, DtmError>;

    /// Find the k nearest reference points of each row of `query`.
    fn transform(&self, query: &[T], columns: usize) -> Result<KnnResult<T>, DtmError>;

    /// Number of reference points the provider is bound to (0 when unfitted).
    fn n_samples(&self) -> usize;
}

// ============================================================================
// Built-in Provider
// ============================================================================

#[derive(Debug, Clone)]
enum SearchIndex<T: Float> {
    Unfitted,
    Tree {
        tree: KDTree<T>,
        metric: DistanceMetric<T>,
    },
    Brute {
        points: Vec<T>,
        columns: usize,
        metric: DistanceMetric<T>,
    },
    Precomputed {
        n_reference: usize,
    },
}

/// Exact k-nearest neighbour search over coordinates or precomputed distances.
#[derive(Debug, Clone)]
pub struct Knn<T: Float> {
    k: usize,
    output: KnnOutput,
    config: SearchConfig<T>,
    index: SearchIndex<T>,
}

impl<T: Float> Knn<T> {
    /// Number of neighbours returned per row.
    pub fn k(&self) -> usize {
        self.k
    }

    /// The configuration this provider was created with.
    pub fn config(&self) -> &SearchConfig<T> {
        &self.config
    }

    /// Whether `fit` has completed.
    pub fn is_fitted(&self) -> bool {
        !matches!(self.index, SearchIndex::Unfitted)
    }

    fn resolve_algorithm(&self, columns: usize) -> Algorithm {
        match self.config.algorithm {
            Algorithm::Auto if columns <= KDTREE_MAX_AUTO_DIMENSIONS => Algorithm::KdTree,
            Algorithm::Auto => Algorithm::BruteForce,
            explicit => explicit,
        }
    }

    /// Search one query row, leaving the result in `nbh`.
    fn search_row(
        &self,
        row: &[T],
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        scratch: &mut Vec<(usize, T)>,
        nbh: &mut Neighborhood<T>,
    ) {
        match &self.index {
            SearchIndex::Unfitted => nbh.clear(),
            SearchIndex::Tree { tree, metric } => {
                tree.find_k_nearest(row, self.k, metric, buffer, nbh);
            }
            SearchIndex::Brute {
                points,
                columns,
                metric,
            } => {
                scratch.clear();
                scratch.extend(
                    points
                        .chunks_exact(*columns)
                        .enumerate()
                        .map(|(i, p)| (i, metric.reduced_distance(row, p))),
                );
                select_k_smallest(scratch, self.k, nbh);
                for d in nbh.distances.iter_mut() {
                    *d = metric.post_process_distance(*d);
                }
            }
            SearchIndex::Precomputed { .. } => {
                scratch.clear();
                scratch.extend(row.iter().copied().enumerate());
                select_k_smallest(scratch, self.k, nbh);
            }
        }
        if self.config.sort_results {
            nbh.sort();
        }
    }

    /// Write one searched row into the output slices.
    fn write_row(&self, nbh: &Neighborhood<T>, distances: &mut [T], indices: &mut [usize]) {
        if self.output.return_distance {
            distances.copy_from_slice(&nbh.distances);
        }
        if self.output.return_index {
            indices.copy_from_slice(&nbh.indices);
        }
    }
}

impl<T: Float + Debug + Send + Sync> NeighborSearch<T> for Knn<T> {
    fn configure(k: usize, output: KnnOutput, config: &SearchConfig<T>) -> Result<Self, DtmError> {
        Validator::validate_k(k)?;
        Validator::validate_metric(&config.metric)?;
        if config.metric == Metric::Neighbors {
            return Err(DtmError::UnsupportedMetric {
                metric: config.metric.name(),
                component: "the k-nearest neighbour search",
            });
        }
        Ok(Self {
            k,
            output,
            config: *config,
            index: SearchIndex::Unfitted,
        })
    }

    fn fit(&mut self, reference: &[T], columns: usize) -> Result<&mut Self, DtmError> {
        let n = Validator::validate_matrix(reference, columns)?;

        let index = match self.config.metric.distance_metric() {
            None => {
                // Precomputed: an n × n distance matrix among the reference points.
                if n != columns {
                    return Err(DtmError::NonSquareDistanceMatrix { rows: n, columns });
                }
                Validator::validate_distances(reference, columns)?;
                Validator::validate_reference_size(n, self.k)?;
                SearchIndex::Precomputed { n_reference: n }
            }
            Some(metric) => {
                Validator::validate_reference_size(n, self.k)?;
                match self.resolve_algorithm(columns) {
                    Algorithm::BruteForce => SearchIndex::Brute {
                        points: reference.to_vec(),
                        columns,
                        metric,
                    },
                    _ => {
                        trace!("building KD-tree over {} points in {}D", n, columns);
                        SearchIndex::Tree {
                            tree: KDTree::new(reference, columns),
                            metric,
                        }
                    }
                }
            }
        };

        debug!(
            "knn fitted: {} reference rows, metric={}, k={}",
            n, self.config.metric, self.k
        );
        self.index = index;
        Ok(self)
    }

    fn transform(&self, query: &[T], columns: usize) -> Result<KnnResult<T>, DtmError> {
        let expected = match &self.index {
            SearchIndex::Unfitted => return Err(DtmError::NotFitted),
            SearchIndex::Tree { tree, .. } => tree.dimensions(),
            SearchIndex::Brute { columns, .. } => *columns,
            SearchIndex::Precomputed { n_reference } => *n_reference,
        };
        let n_queries = Validator::validate_matrix(query, columns)?;
        Validator::validate_columns(expected, columns)?;
        if matches!(self.index, SearchIndex::Precomputed { .. }) {
            Validator::validate_distances(query, columns)?;
        }

        let k = self.k;
        let mut distances = vec![T::zero(); if self.output.return_distance { n_queries * k } else { 0 }];
        let mut indices = vec![0usize; if self.output.return_index { n_queries * k } else { 0 }];

        // Zero-width chunks when an output is not requested.
        let d_width = if self.output.return_distance { k } else { 0 };
        let i_width = if self.output.return_index { k } else { 0 };

        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                self.transform_parallel(query, columns, &mut distances, &mut indices, d_width, i_width);
                return Ok(self.finish(n_queries, distances, indices));
            }
        }

        let mut buffer = NeighborhoodSearchBuffer::new(k);
        let mut scratch = Vec::new();
        let mut nbh = Neighborhood::with_capacity(k);
        for (row_idx, row) in query.chunks_exact(columns).enumerate() {
            self.search_row(row, &mut buffer, &mut scratch, &mut nbh);
            self.write_row(
                &nbh,
                &mut distances[row_idx * d_width..(row_idx + 1) * d_width],
                &mut indices[row_idx * i_width..(row_idx + 1) * i_width],
            );
        }

        Ok(self.finish(n_queries, distances, indices))
    }

    fn n_samples(&self) -> usize {
        match &self.index {
            SearchIndex::Unfitted => 0,
            SearchIndex::Tree { tree, .. } => tree.len(),
            SearchIndex::Brute { points, columns, .. } => points.len() / columns,
            SearchIndex::Precomputed { n_reference } => *n_reference,
        }
    }
}

impl<T: Float + Debug + Send + Sync> Knn<T> {
    fn finish(&self, n_queries: usize, distances: Vec<T>, indices: Vec<usize>) -> KnnResult<T> {
        KnnResult {
            k: self.k,
            n_queries,
            distances: self.output.return_distance.then_some(distances),
            indices: self.output.return_index.then_some(indices),
        }
    }

    #[cfg(feature = "parallel")]
    fn transform_parallel(
        &self,
        query: &[T],
        columns: usize,
        distances: &mut [T],
        indices: &mut [usize],
        d_width: usize,
        i_width: usize,
    ) {
        let k = self.k;
        let mut results: Vec<Neighborhood<T>> = query
            .par_chunks_exact(columns)
            .map_init(
                || (NeighborhoodSearchBuffer::new(k), Vec::new()),
                |(buffer, scratch), row| {
                    let mut nbh = Neighborhood::with_capacity(k);
                    self.search_row(row, buffer, scratch, &mut nbh);
                    nbh
                },
            )
            .collect();
        for (row_idx, nbh) in results.drain(..).enumerate() {
            self.write_row(
                &nbh,
                &mut distances[row_idx * d_width..(row_idx + 1) * d_width],
                &mut indices[row_idx * i_width..(row_idx + 1) * i_width],
            );
        }
    }
}

/// Keep the `k` smallest `(index, distance)` pairs of `candidates` in `nbh`.
fn select_k_smallest<T: Float>(candidates: &mut [(usize, T)], k: usize, nbh: &mut Neighborhood<T>) {
    nbh.clear();
    let k = k.min(candidates.len());
    if k == 0 {
        return;
    }
    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, |a, b| {
            a.1.partial_cmp(&b.1).unwrap_or(Equal).then(a.0.cmp(&b.0))
        });
    }
    for &(index, distance) in &candidates[..k] {
        nbh.push(index, distance);
    }
}
