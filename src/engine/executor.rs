//! Row reductions from neighbour distances to estimator output.
//!
//! ## Purpose
//!
//! Once neighbour distances are available as a row-major table, every
//! estimator reduces each row independently. This module owns those
//! reductions and their sequential / parallel dispatch.
//!
//! ## Design notes
//!
//! * **Row width vs. k**: Rows may be wider than `k` (caller-supplied
//!   neighbour tables); only the first `k` entries of each row are used.
//! * **Parallel**: With the `parallel` feature the same per-row closure runs
//!   on the rayon pool, so results are identical to the sequential path.
//!
//! ## Invariants
//!
//! * Output has exactly one value per row, in row order.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Internal dependencies
use crate::math::power_mean::{power_mean, weighted_power_sum};

// ============================================================================
// Density Parameters
// ============================================================================

/// Resolved parameters of a DTM density evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityParams<T> {
    /// Rank weights, summing to one.
    pub weights: Vec<T>,
    /// Power order.
    pub q: T,
    /// Intrinsic dimension.
    pub dim: T,
    /// `(Σ wⱼ j^(q/dim), n_samples · V_dim)` when normalising.
    pub normalization: Option<(T, T)>,
}

// ============================================================================
// Executor
// ============================================================================

/// Reduces neighbour-distance tables row by row.
pub struct DtmExecutor;

impl DtmExecutor {
    /// Power mean of order `q` over the first `k` entries of each row.
    pub fn dtm_rows<T: Float + Send + Sync>(
        distances: &[T],
        row_width: usize,
        k: usize,
        q: T,
        parallel: bool,
    ) -> Vec<T> {
        Self::map_rows(distances, row_width, parallel, |row| power_mean(&row[..k], q))
    }

    /// DTM density over the first `weights.len()` entries of each row.
    pub fn density_rows<T: Float + Send + Sync>(
        distances: &[T],
        row_width: usize,
        params: &DensityParams<T>,
        parallel: bool,
    ) -> Vec<T> {
        let k = params.weights.len();
        let exponent = -params.dim / params.q;
        Self::map_rows(distances, row_width, parallel, |row| {
            let mut dtm = weighted_power_sum(&row[..k], &params.weights, params.q);
            match params.normalization {
                Some((rank_norm, volume)) => {
                    dtm = dtm / rank_norm;
                    dtm.powf(exponent) / volume
                }
                None => dtm.powf(exponent),
            }
        })
    }

    #[allow(unused_variables)]
    fn map_rows<T, F>(distances: &[T], row_width: usize, parallel: bool, f: F) -> Vec<T>
    where
        T: Float + Send + Sync,
        F: Fn(&[T]) -> T + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            if parallel {
                return distances.par_chunks_exact(row_width).map(f).collect();
            }
        }
        distances.chunks_exact(row_width).map(f).collect()
    }
}
