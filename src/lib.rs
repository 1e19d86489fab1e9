//! # DTM: distance to measure for point clouds
//!
//! A generic, `no_std`-friendly implementation of the distance to measure
//! (DTM) and the DTM density estimator used in topological data analysis.
//!
//! ## What is the distance to measure?
//!
//! The distance from a point to a sample is very sensitive to outliers: a
//! single stray point creates a deep well around it. The distance to measure
//! replaces "distance to the nearest sample point" by an average over the
//! `k` nearest sample points:
//!
//! ```text
//! DTM(x) = ((1/k) Σᵢ dᵢ(x)^q)^(1/q)
//! ```
//!
//! where `d₁(x) … d_k(x)` are the distances from `x` to its `k` nearest
//! reference points and `q` is the power-mean order (2 by default). DTM values
//! are robust filtration values for persistent homology.
//!
//! ## Quick Start
//!
//! ```rust
//! use dtm_rs::prelude::*;
//!
//! // Reference points (rows of 2 coordinates)
//! let reference: Vec<f64> = vec![0.0, 0.0, 4.0, 0.0];
//! let query: Vec<f64> = vec![2.0, 0.0];
//!
//! let mut dtm = Dtm::new(2).q(2.0).build()?;
//! let values = dtm.fit(&reference, 2)?.transform(&query, 2)?;
//!
//! assert!((values[0] - 2.0).abs() < 1e-12);
//! # Result::<(), DtmError>::Ok(())
//! ```
//!
//! ## Input modes
//!
//! Every 2-D array is a row-major flat slice plus a column count. The
//! `metric` parameter decides how rows are read:
//!
//! | Metric                                  | `fit` input                 | `transform` input                          |
//! |-----------------------------------------|-----------------------------|--------------------------------------------|
//! | `Euclidean` (default), `Manhattan`, `Chebyshev`, `Minkowski(p)` | reference coordinates | query coordinates                  |
//! | `Precomputed`                           | square distance matrix      | distances to every reference point         |
//! | `Neighbors`                             | ignored                     | distances to the k nearest (≥ k columns)   |
//!
//! ```rust
//! use dtm_rs::prelude::*;
//!
//! // Neighbour distances supplied directly: extra columns are ignored.
//! let dtm = Dtm::new(2).q(1.0).metric(Neighbors).build()?;
//! let values = dtm.transform(&[1.0, 3.0, 99.0], 3)?;
//! assert_eq!(values, vec![2.0]);
//! # Result::<(), DtmError>::Ok(())
//! ```
//!
//! ## Parameters
//!
//! | Parameter        | Default     | Range/Options                                                   |
//! |------------------|-------------|-----------------------------------------------------------------|
//! | **k**            | (required)  | [1, n_reference]                                                |
//! | **q**            | 2           | (0, ∞), finite                                                  |
//! | **metric**       | `Euclidean` | `Euclidean`, `Manhattan`, `Chebyshev`, `Minkowski(p)`, `Precomputed`, `Neighbors` |
//! | **algorithm**    | `Auto`      | `Auto`, `KdTree`, `BruteForce`                                  |
//! | **sort_results** | false       | true/false                                                      |
//! | **parallel**     | false       | true/false (`parallel` feature)                                 |
//!
//! ## Density estimation
//!
//! ```rust
//! use dtm_rs::prelude::*;
//!
//! let points: Vec<f64> = (0..10).map(|i| i as f64).collect();
//! let mut density = DtmDensityBuilder::new().k(3).normalize(true).build()?;
//! let estimate = density.fit_transform(&points, 1)?;
//! assert_eq!(estimate.len(), 10);
//! # Result::<(), DtmError>::Ok(())
//! ```
//!
//! ## Result and Error Handling
//!
//! Every fallible call returns `Result<_, DtmError>`. [`DtmError::kind`]
//! classifies errors as unfitted state, invalid parameter, dimension
//! mismatch, or invalid input.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade (`debug` on fit / transform,
//! `trace` on index construction). Install any logger to see it.
//!
//! ## Features
//!
//! * `std` (default): standard library support; disable for `no_std` + `alloc`.
//! * `parallel`: answer query rows on the rayon thread pool.
//! * `dev`: expose internal modules for testing.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - error type and reusable buffers.
mod primitives;

// Layer 2: Math - distance metrics, KD-tree, power means.
mod math;

// Layer 3: Algorithms - the k-nearest neighbour search provider.
mod algorithms;

// Layer 4: Engine - validation and row reductions.
mod engine;

// Layer 5: Estimators - DTM and DTM density with their builders.
mod estimators;

// High-level API re-exports.
mod api;

pub use api::*;

// ============================================================================
// Prelude
// ============================================================================

/// Standard prelude.
///
/// ```
/// use dtm_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        Algorithm::{Auto, BruteForce, KdTree},
        DistanceToMeasure, DtmBuilder as Dtm, DtmDensity, DtmDensityBuilder, DtmError, ErrorKind,
        Knn, KnnOutput, Metric,
        Metric::{Chebyshev, Euclidean, Manhattan, Minkowski, Neighbors, Precomputed},
        NeighborSearch, SearchConfig,
    };
}

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// Only available with the `dev` feature. These are implementation details
/// and may change without notice.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal search algorithms.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    /// Internal engine.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal estimators.
    pub mod estimators {
        pub use crate::estimators::*;
    }
}
