//! Distance to measure estimator.
//!
//! ## Purpose
//!
//! For each query row, the distance to measure (DTM) is the power mean of
//! order `q` of the distances to its `k` nearest reference points:
//!
//! ```text
//! DTM(x) = ((1/k) Σᵢ dᵢ(x)^q)^(1/q)
//! ```
//!
//! At `q = 2` this is the root-mean-square neighbour distance; as `q` grows
//! it tends to the distance of the k-th neighbour.
//!
//! ## Design notes
//!
//! * **Builder**: Parameters are collected by [`DtmBuilder`] and validated
//!   eagerly in `build()`.
//! * **Explicit state**: The estimator is `Unfitted`, `Direct` (neighbour
//!   distances supplied by the caller) or `Bound` to a fitted search.
//! * **Pluggable search**: Any [`NeighborSearch`] can be bound with
//!   [`DtmBuilder::build_with`]; [`Knn`] is the default.
//!
//! ## Invariants
//!
//! * `transform` returns one non-negative value per query row, in order.
//! * A failed `fit` leaves the previous state untouched.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::Debug;
use log::debug;
use num_traits::Float;

// Internal dependencies
use crate::algorithms::knn::{Algorithm, Knn, KnnOutput, NeighborSearch, SearchConfig};
use crate::engine::executor::DtmExecutor;
use crate::engine::validator::Validator;
use crate::estimators::{neighbor_table, FitState};
use crate::math::distance::Metric;
use crate::primitives::errors::DtmError;

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for [`DistanceToMeasure`].
#[derive(Debug, Clone)]
pub struct DtmBuilder<T> {
    /// Number of nearest neighbours.
    pub k: usize,

    /// Power-mean order (default: 2).
    pub q: Option<T>,

    /// Input interpretation (default: Euclidean coordinates).
    pub metric: Option<Metric<T>>,

    /// Search backend (default: Auto).
    pub algorithm: Option<Algorithm>,

    /// Ask the search for sorted rows (default: false).
    pub sort_results: Option<bool>,

    /// Parallel execution hint.
    #[doc(hidden)]
    pub parallel: Option<bool>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub(crate) duplicate_param: Option<&'static str>,
}

impl<T: Float + Debug + Send + Sync> DtmBuilder<T> {
    /// Create a builder for a DTM over `k` nearest neighbours.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            q: None,
            metric: None,
            algorithm: None,
            sort_results: None,
            parallel: None,
            duplicate_param: None,
        }
    }

    /// Set the power-mean order `q` (> 0, finite).
    pub fn q(mut self, q: T) -> Self {
        if self.q.is_some() {
            self.duplicate_param = Some("q");
        }
        self.q = Some(q);
        self
    }

    /// Set how input rows are interpreted.
    pub fn metric(mut self, metric: Metric<T>) -> Self {
        if self.metric.is_some() {
            self.duplicate_param = Some("metric");
        }
        self.metric = Some(metric);
        self
    }

    /// Set the metric by name (`"euclidean"`, `"precomputed"`, `"neighbors"`, ...).
    pub fn metric_name(self, name: &str) -> Result<Self, DtmError> {
        Ok(self.metric(name.parse()?))
    }

    /// Set the search backend for coordinate input.
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        if self.algorithm.is_some() {
            self.duplicate_param = Some("algorithm");
        }
        self.algorithm = Some(algorithm);
        self
    }

    /// Ask the neighbour search to return sorted rows.
    pub fn sort_results(mut self, sort: bool) -> Self {
        if self.sort_results.is_some() {
            self.duplicate_param = Some("sort_results");
        }
        self.sort_results = Some(sort);
        self
    }

    /// Answer query rows on the rayon thread pool.
    #[cfg(feature = "parallel")]
    pub fn parallel(mut self, parallel: bool) -> Self {
        if self.parallel.is_some() {
            self.duplicate_param = Some("parallel");
        }
        self.parallel = Some(parallel);
        self
    }

    /// Validate the configuration and build an estimator using [`Knn`].
    pub fn build(self) -> Result<DistanceToMeasure<T>, DtmError> {
        self.build_with::<Knn<T>>()
    }

    /// Validate the configuration and build an estimator using search provider `S`.
    pub fn build_with<S: NeighborSearch<T>>(self) -> Result<DistanceToMeasure<T, S>, DtmError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        Validator::validate_k(self.k)?;

        let q = self.q.unwrap_or_else(|| T::one() + T::one());
        Validator::validate_order(q)?;

        let config = SearchConfig {
            metric: self.metric.unwrap_or_default(),
            algorithm: self.algorithm.unwrap_or_default(),
            sort_results: self.sort_results.unwrap_or(false),
            parallel: self.parallel.unwrap_or(false),
        };
        Validator::validate_metric(&config.metric)?;

        let state = if config.metric == Metric::Neighbors {
            FitState::Direct
        } else {
            // Surface provider configuration errors now rather than at fit time.
            S::configure(self.k, KnnOutput::DISTANCES, &config)?;
            FitState::Unfitted
        };

        Ok(DistanceToMeasure {
            k: self.k,
            q,
            config,
            state,
        })
    }
}

// ============================================================================
// Estimator
// ============================================================================

/// Distance to measure estimator.
#[derive(Debug, Clone)]
pub struct DistanceToMeasure<T: Float, S = Knn<T>> {
    k: usize,
    q: T,
    config: SearchConfig<T>,
    state: FitState<S>,
}

impl<T: Float + Debug + Send + Sync> DistanceToMeasure<T> {
    /// Shorthand for [`DtmBuilder::new`].
    pub fn builder(k: usize) -> DtmBuilder<T> {
        DtmBuilder::new(k)
    }
}

impl<T, S> DistanceToMeasure<T, S>
where
    T: Float + Debug + Send + Sync,
    S: NeighborSearch<T>,
{
    /// Bind the estimator to `reference` (`columns` values per row).
    ///
    /// With `Metric::Neighbors` this is a no-op.
    pub fn fit(&mut self, reference: &[T], columns: usize) -> Result<&mut Self, DtmError> {
        if let FitState::Direct = self.state {
            return Ok(self);
        }

        let mut search = S::configure(self.k, KnnOutput::DISTANCES, &self.config)?;
        search.fit(reference, columns)?;
        debug!(
            "dtm fitted: k={}, metric={}, {} reference points",
            self.k,
            self.config.metric,
            search.n_samples()
        );
        self.state = FitState::Bound(search);
        Ok(self)
    }

    /// DTM value of each row of `query` (`columns` values per row).
    pub fn transform(&self, query: &[T], columns: usize) -> Result<Vec<T>, DtmError> {
        let (table, width) = neighbor_table(&self.state, query, columns, self.k)?;
        let values = DtmExecutor::dtm_rows(&table, width, self.k, self.q, self.config.parallel);
        debug!("dtm transformed {} query rows", values.len());
        Ok(values)
    }

    /// `fit` followed by `transform` on the same data.
    pub fn fit_transform(&mut self, x: &[T], columns: usize) -> Result<Vec<T>, DtmError> {
        self.fit(x, columns)?.transform(x, columns)
    }

    /// Number of nearest neighbours.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Power-mean order.
    pub fn q(&self) -> T {
        self.q
    }

    /// Input interpretation.
    pub fn metric(&self) -> Metric<T> {
        self.config.metric
    }

    /// Search configuration passed to the provider.
    pub fn config(&self) -> &SearchConfig<T> {
        &self.config
    }

    /// Whether `transform` can be called.
    pub fn is_fitted(&self) -> bool {
        self.state.is_fitted()
    }

    /// The bound search, if fitted against reference data.
    pub fn search(&self) -> Option<&S> {
        self.state.search()
    }

    /// Number of reference points, if fitted against reference data.
    pub fn n_samples(&self) -> Option<usize> {
        self.state.search().map(|search| search.n_samples())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_order_is_two() {
        let dtm = DtmBuilder::<f64>::new(3).build().unwrap();
        assert_eq!(dtm.q(), 2.0);
        assert_eq!(dtm.metric(), Metric::Euclidean);
        assert!(!dtm.is_fitted());
        assert_eq!(dtm.n_samples(), None);
    }

    #[test]
    fn neighbors_mode_starts_fitted() {
        let dtm = DtmBuilder::<f64>::new(2).metric(Metric::Neighbors).build().unwrap();
        assert!(dtm.is_fitted());
        assert!(dtm.search().is_none());
    }

    #[test]
    fn failed_refit_keeps_previous_search() {
        let mut dtm = DtmBuilder::new(1).build().unwrap();
        dtm.fit(&[0.0, 0.0, 3.0, 0.0], 2).unwrap();
        assert!(dtm.fit(&[0.0, f64::NAN], 2).is_err());
        assert_eq!(dtm.n_samples(), Some(2));
        assert_relative_eq!(dtm.transform(&[3.0, 1.0], 2).unwrap()[0], 1.0);
    }

    #[test]
    fn duplicate_parameters_are_rejected() {
        let err = DtmBuilder::<f64>::new(1).q(1.0).q(2.0).build().unwrap_err();
        assert_eq!(err, DtmError::DuplicateParameter { parameter: "q" });
    }
}
