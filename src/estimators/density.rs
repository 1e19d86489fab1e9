//! DTM density estimator.
//!
//! ## Purpose
//!
//! Turns a rank-weighted distance to measure into a density estimate. For a
//! query with sorted neighbour distances `d₁ ≤ … ≤ d_k` and rank weights
//! `w₁ … w_k` summing to one:
//!
//! ```text
//! dtm     = Σⱼ wⱼ dⱼ^q
//! density = dtm^(-dim/q)
//! ```
//!
//! With normalisation, `dtm` is divided by `Σⱼ wⱼ j^(q/dim)` and the density
//! by `n · V_dim` (`V_dim` the unit-ball volume), which makes the estimate
//! consistent for uniformly sampled data.
//!
//! ## Design notes
//!
//! * **Sorted neighbours**: Weights are per rank, so the bound search is always
//!   asked for sorted rows. `Neighbors` input is assumed sorted by the caller.
//! * **Defaults**: `dim` defaults to the coordinate column count and `q` to `dim`.
//!
//! ## Invariants
//!
//! * A zero `dtm` yields an infinite density.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{format, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::Debug;
use log::debug;
use num_traits::Float;

// Internal dependencies
use crate::algorithms::knn::{Algorithm, Knn, KnnOutput, NeighborSearch, SearchConfig};
use crate::engine::executor::{DensityParams, DtmExecutor};
use crate::engine::validator::Validator;
use crate::estimators::{neighbor_table, FitState};
use crate::math::distance::Metric;
use crate::math::power_mean::{rank_normalizer, unit_ball_volume};
use crate::primitives::errors::DtmError;

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for [`DtmDensity`].
#[derive(Debug, Clone)]
pub struct DtmDensityBuilder<T> {
    /// Number of nearest neighbours (uniform weights when no weights are given).
    pub k: Option<usize>,

    /// Rank weights, normalised to sum to one.
    pub weights: Option<Vec<T>>,

    /// Power order (default: `dim`).
    pub q: Option<T>,

    /// Intrinsic dimension (default: coordinate columns).
    pub dim: Option<usize>,

    /// Normalise to a consistent density estimate (default: false).
    pub normalize: Option<bool>,

    /// Sample count used for normalisation (default: reference points).
    pub n_samples: Option<usize>,

    /// Input interpretation (default: Euclidean coordinates).
    pub metric: Option<Metric<T>>,

    /// Search backend (default: Auto).
    pub algorithm: Option<Algorithm>,

    /// Parallel execution hint.
    #[doc(hidden)]
    pub parallel: Option<bool>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub(crate) duplicate_param: Option<&'static str>,
}

impl<T: Float + Debug + Send + Sync> Default for DtmDensityBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float + Debug + Send + Sync> DtmDensityBuilder<T> {
    /// Create a builder with default settings. Either `k` or `weights` must be set.
    pub fn new() -> Self {
        Self {
            k: None,
            weights: None,
            q: None,
            dim: None,
            normalize: None,
            n_samples: None,
            metric: None,
            algorithm: None,
            parallel: None,
            duplicate_param: None,
        }
    }

    /// Use `k` neighbours with uniform weights.
    pub fn k(mut self, k: usize) -> Self {
        if self.k.is_some() {
            self.duplicate_param = Some("k");
        }
        self.k = Some(k);
        self
    }

    /// Use one weight per neighbour rank.
    pub fn weights(mut self, weights: &[T]) -> Self {
        if self.weights.is_some() {
            self.duplicate_param = Some("weights");
        }
        self.weights = Some(weights.to_vec());
        self
    }

    /// Set the power order `q`.
    pub fn q(mut self, q: T) -> Self {
        if self.q.is_some() {
            self.duplicate_param = Some("q");
        }
        self.q = Some(q);
        self
    }

    /// Set the intrinsic dimension.
    pub fn dim(mut self, dim: usize) -> Self {
        if self.dim.is_some() {
            self.duplicate_param = Some("dim");
        }
        self.dim = Some(dim);
        self
    }

    /// Normalise the estimate.
    pub fn normalize(mut self, normalize: bool) -> Self {
        if self.normalize.is_some() {
            self.duplicate_param = Some("normalize");
        }
        self.normalize = Some(normalize);
        self
    }

    /// Override the sample count used for normalisation.
    pub fn n_samples(mut self, n: usize) -> Self {
        if self.n_samples.is_some() {
            self.duplicate_param = Some("n_samples");
        }
        self.n_samples = Some(n);
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

    /// Set the search backend for coordinate input.
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        if self.algorithm.is_some() {
            self.duplicate_param = Some("algorithm");
        }
        self.algorithm = Some(algorithm);
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
    pub fn build(self) -> Result<DtmDensity<T>, DtmError> {
        self.build_with::<Knn<T>>()
    }

    /// Validate the configuration and build an estimator using search provider `S`.
    pub fn build_with<S: NeighborSearch<T>>(self) -> Result<DtmDensity<T, S>, DtmError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;

        let weights = Self::resolve_weights(self.k, self.weights)?;

        if let Some(q) = self.q {
            Validator::validate_order(q)?;
        }
        if let Some(dim) = self.dim {
            Validator::validate_dimension(dim)?;
        }
        if let Some(n) = self.n_samples {
            Validator::validate_reference_size(n, 1)?;
        }

        let config = SearchConfig {
            metric: self.metric.unwrap_or_default(),
            algorithm: self.algorithm.unwrap_or_default(),
            sort_results: true,
            parallel: self.parallel.unwrap_or(false),
        };
        Validator::validate_metric(&config.metric)?;

        // Without coordinates there is no column count to infer the dimension from.
        if config.metric.distance_metric().is_none() && self.dim.is_none() {
            return Err(DtmError::MissingParameter("dim"));
        }

        let normalize = self.normalize.unwrap_or(false);
        if normalize && config.metric == Metric::Neighbors && self.n_samples.is_none() {
            return Err(DtmError::MissingParameter("n_samples"));
        }

        let state = if config.metric == Metric::Neighbors {
            FitState::Direct
        } else {
            S::configure(weights.len(), KnnOutput::DISTANCES, &config)?;
            FitState::Unfitted
        };

        Ok(DtmDensity {
            weights,
            q: self.q,
            dim: self.dim,
            normalize,
            n_samples: self.n_samples,
            config,
            state,
        })
    }

    fn resolve_weights(k: Option<usize>, weights: Option<Vec<T>>) -> Result<Vec<T>, DtmError> {
        match (k, weights) {
            (None, None) => Err(DtmError::MissingParameter("k or weights")),
            (Some(k), None) => {
                Validator::validate_k(k)?;
                let w = T::one() / T::from(k).unwrap_or_else(T::max_value);
                Ok(vec![w; k])
            }
            (k, Some(weights)) => {
                if let Some(k) = k {
                    if k != weights.len() {
                        return Err(DtmError::ConflictingParameters(format!(
                            "k = {} but {} weights given",
                            k,
                            weights.len()
                        )));
                    }
                }
                Validator::validate_weights(&weights)?;
                let total = weights.iter().copied().fold(T::zero(), |acc, w| acc + w);
                Ok(weights.into_iter().map(|w| w / total).collect())
            }
        }
    }
}

// ============================================================================
// Estimator
// ============================================================================

/// Weighted DTM density estimator.
#[derive(Debug, Clone)]
pub struct DtmDensity<T: Float, S = Knn<T>> {
    weights: Vec<T>,
    q: Option<T>,
    dim: Option<usize>,
    normalize: bool,
    n_samples: Option<usize>,
    config: SearchConfig<T>,
    state: FitState<S>,
}

impl<T: Float + Debug + Send + Sync> DtmDensity<T> {
    /// Shorthand for [`DtmDensityBuilder::new`].
    pub fn builder() -> DtmDensityBuilder<T> {
        DtmDensityBuilder::new()
    }
}

impl<T, S> DtmDensity<T, S>
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

        let mut search = S::configure(self.k(), KnnOutput::DISTANCES, &self.config)?;
        search.fit(reference, columns)?;
        debug!(
            "dtm density fitted: k={}, metric={}, {} reference points",
            self.k(),
            self.config.metric,
            search.n_samples()
        );
        self.state = FitState::Bound(search);
        Ok(self)
    }

    /// Density estimate at each row of `query` (`columns` values per row).
    pub fn transform(&self, query: &[T], columns: usize) -> Result<Vec<T>, DtmError> {
        let (table, width) = neighbor_table(&self.state, query, columns, self.k())?;

        let dim = self.dim.unwrap_or(columns);
        let dim_t = T::from(dim).unwrap_or_else(T::max_value);
        let q = self.q.unwrap_or(dim_t);

        let normalization = if self.normalize {
            let n = self
                .n_samples
                .or_else(|| self.state.search().map(|search| search.n_samples()))
                .ok_or(DtmError::MissingParameter("n_samples"))?;
            let n_t = T::from(n).unwrap_or_else(T::max_value);
            Some((
                rank_normalizer(&self.weights, q, dim_t),
                n_t * unit_ball_volume::<T>(dim),
            ))
        } else {
            None
        };

        let params = DensityParams {
            weights: self.weights.clone(),
            q,
            dim: dim_t,
            normalization,
        };
        let values = DtmExecutor::density_rows(&table, width, &params, self.config.parallel);
        debug!("dtm density transformed {} query rows", values.len());
        Ok(values)
    }

    /// `fit` followed by `transform` on the same data.
    pub fn fit_transform(&mut self, x: &[T], columns: usize) -> Result<Vec<T>, DtmError> {
        self.fit(x, columns)?.transform(x, columns)
    }

    /// Number of nearest neighbours.
    pub fn k(&self) -> usize {
        self.weights.len()
    }

    /// Normalised rank weights.
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Whether `transform` can be called.
    pub fn is_fitted(&self) -> bool {
        self.state.is_fitted()
    }

    /// Input interpretation.
    pub fn metric(&self) -> Metric<T> {
        self.config.metric
    }
}
