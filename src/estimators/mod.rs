//! Layer 5: Estimators
//!
//! # Purpose
//!
//! This layer holds the user-facing estimators and their builders:
//! - [`dtm::DistanceToMeasure`]: power-mean distance to measure
//! - [`density::DtmDensity`]: weighted DTM density estimate
//!
//! Both share the same two-phase lifecycle: an explicit fit state and the
//! retrieval of a neighbour-distance table for a query.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Estimators ← You are here
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::borrow::Cow;
#[cfg(feature = "std")]
use std::borrow::Cow;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::knn::NeighborSearch;
use crate::engine::validator::Validator;
use crate::primitives::errors::DtmError;

/// Distance to measure estimator.
pub mod dtm;

/// DTM density estimator.
pub mod density;

// ============================================================================
// Fit State
// ============================================================================

/// Lifecycle state of an estimator.
#[derive(Debug, Clone)]
pub(crate) enum FitState<S> {
    /// Needs a search but `fit` has not succeeded yet.
    Unfitted,
    /// Input already holds neighbour distances; no search is ever needed.
    Direct,
    /// Bound to a fitted neighbour search.
    Bound(S),
}

impl<S> FitState<S> {
    pub(crate) fn is_fitted(&self) -> bool {
        !matches!(self, FitState::Unfitted)
    }

    pub(crate) fn search(&self) -> Option<&S> {
        match self {
            FitState::Bound(search) => Some(search),
            _ => None,
        }
    }
}

/// Neighbour distances for every row of `x`, with the row width of the table.
///
/// In the `Direct` state `x` is borrowed as-is (rows may be wider than `k`,
/// and only their first `k` entries are checked);
/// otherwise the bound search produces a `k`-wide table.
pub(crate) fn neighbor_table<'a, T, S>(
    state: &FitState<S>,
    x: &'a [T],
    columns: usize,
    k: usize,
) -> Result<(Cow<'a, [T]>, usize), DtmError>
where
    T: Float,
    S: NeighborSearch<T>,
{
    match state {
        FitState::Unfitted => Err(DtmError::NotFitted),
        FitState::Direct => {
            Validator::validate_shape(x, columns)?;
            Validator::validate_neighbor_columns(columns, k)?;
            Validator::validate_neighbor_table(x, columns, k)?;
            Ok((Cow::Borrowed(x), columns))
        }
        FitState::Bound(search) => {
            let result = search.transform(x, columns)?;
            let expected = result.n_queries * k;
            let distances = result.distances.unwrap_or_default();
            if result.k != k || distances.len() != expected {
                return Err(DtmError::DimensionMismatch {
                    expected,
                    got: distances.len(),
                });
            }
            Ok((Cow::Owned(distances), k))
        }
    }
}
