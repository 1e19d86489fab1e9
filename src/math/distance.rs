//! Distance metrics and input modes.
//!
//! ## Purpose
//!
//! This module defines how "closeness" between two coordinate rows is
//! measured, and the [`Metric`] enum that tells an estimator how to read its
//! input: as coordinates under a distance metric, as a precomputed distance
//! matrix, or as precomputed neighbour distances.
//!
//! ## Design notes
//!
//! * **Reduced distances**: The [`PointDistance`] seam lets a search compare
//!   distances in a monotone "reduced" space. The built-in metrics compare true
//!   distances, with power sums rescaled by the largest coordinate gap so they
//!   stay finite for large `p` or huge coordinates.
//! * **Decoupling**: Distance calculation is separated from the search structure
//!   through the [`PointDistance`] trait.
//!
//! ## Invariants
//!
//! * Distance is always non-negative.
//! * A single-coordinate reduced distance never exceeds the full reduced distance
//!   (this is what makes KD-tree pruning exact).
//!
//! ## Non-goals
//!
//! * This module does not aggregate distances (see `math::power_mean`).

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::ToString;
#[cfg(feature = "std")]
use std::string::ToString;

// External dependencies
use core::fmt;
use core::str::FromStr;
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::DtmError;

// ============================================================================
// Input Metric
// ============================================================================

/// How an estimator interprets its 2-D input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Metric<T> {
    /// Coordinates, Euclidean distance: √(Σ(xᵢ - yᵢ)²)
    #[default]
    Euclidean,

    /// Coordinates, Manhattan distance (L1 norm): Σ|xᵢ - yᵢ|
    Manhattan,

    /// Coordinates, Chebyshev distance (L∞ norm): max|xᵢ - yᵢ|
    Chebyshev,

    /// Coordinates, Minkowski distance (Lp norm): (Σ|xᵢ - yᵢ|^p)^(1/p), p ≥ 1.
    Minkowski(T),

    /// Rows are distances to every reference point.
    Precomputed,

    /// Rows already hold the distances to the k nearest reference points.
    Neighbors,
}

impl<T: Float> Metric<T> {
    /// The coordinate distance metric, or `None` for `Precomputed` / `Neighbors`.
    pub fn distance_metric(&self) -> Option<DistanceMetric<T>> {
        match *self {
            Metric::Euclidean => Some(DistanceMetric::Euclidean),
            Metric::Manhattan => Some(DistanceMetric::Manhattan),
            Metric::Chebyshev => Some(DistanceMetric::Chebyshev),
            Metric::Minkowski(p) => Some(DistanceMetric::Minkowski(p)),
            Metric::Precomputed | Metric::Neighbors => None,
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
            Metric::Chebyshev => "chebyshev",
            Metric::Minkowski(_) => "minkowski",
            Metric::Precomputed => "precomputed",
            Metric::Neighbors => "neighbors",
        }
    }
}

impl<T: Float> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Minkowski(p) => write!(f, "minkowski(p={})", p.to_f64().unwrap_or(f64::NAN)),
            other => f.write_str(other.name()),
        }
    }
}

impl<T: Float> FromStr for Metric<T> {
    type Err = DtmError;

    /// Parse a metric name. `"minkowski"` defaults to p = 2.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "manhattan" | "cityblock" | "l1" => Ok(Metric::Manhattan),
            "chebyshev" | "linf" | "infinity" => Ok(Metric::Chebyshev),
            "minkowski" => Ok(Metric::Minkowski(T::one() + T::one())),
            "precomputed" => Ok(Metric::Precomputed),
            "neighbors" | "neighbours" => Ok(Metric::Neighbors),
            _ => Err(DtmError::UnknownMetric(s.to_string())),
        }
    }
}

// ============================================================================
// Coordinate Distance Metric
// ============================================================================

/// Distance metric between two coordinate rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceMetric<T> {
    /// L2 norm.
    Euclidean,
    /// L1 norm.
    Manhattan,
    /// L∞ norm.
    Chebyshev,
    /// Lp norm.
    Minkowski(T),
}

impl<T: Float> DistanceMetric<T> {
    /// Compute Euclidean distance between two nD points.
    #[inline]
    pub fn euclidean(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len(), "Points must have same dimension");
        let sum_sq = Self::squared_euclidean(a, b);
        if sum_sq.is_finite() {
            sum_sq.sqrt()
        } else {
            // Squares overflowed: rescale by the largest coordinate gap.
            Self::scaled_norm(a, b, T::one() + T::one())
        }
    }

    #[inline]
    fn squared_euclidean(a: &[T], b: &[T]) -> T {
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| {
                let diff = ai - bi;
                diff * diff
            })
            .fold(T::zero(), |acc, x| acc + x)
    }

    /// Compute Manhattan distance (L1 norm).
    #[inline]
    pub fn manhattan(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| (ai - bi).abs())
            .fold(T::zero(), |acc, x| acc + x)
    }

    /// Compute Chebyshev distance (L-inf norm).
    #[inline]
    pub fn chebyshev(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| (ai - bi).abs())
            .fold(T::zero(), T::max)
    }

    /// Compute Minkowski distance (Lp norm).
    #[inline]
    pub fn minkowski(a: &[T], b: &[T], p: T) -> T {
        debug_assert_eq!(a.len(), b.len());
        Self::scaled_norm(a, b, p)
    }

    /// `m · (Σ (|Δ|/m)^p)^(1/p)` with `m = max |Δ|`, finite whenever `m` is.
    fn scaled_norm(a: &[T], b: &[T], p: T) -> T {
        let m = Self::chebyshev(a, b);
        if m == T::zero() || !m.is_finite() {
            return m;
        }
        let sum = a
            .iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| ((ai - bi).abs() / m).powf(p))
            .fold(T::zero(), |acc, x| acc + x);
        m * sum.powf(T::one() / p)
    }

    /// Compute the true distance between two points.
    #[inline]
    pub fn distance(&self, a: &[T], b: &[T]) -> T {
        match *self {
            DistanceMetric::Euclidean => Self::euclidean(a, b),
            DistanceMetric::Manhattan => Self::manhattan(a, b),
            DistanceMetric::Chebyshev => Self::chebyshev(a, b),
            DistanceMetric::Minkowski(p) => Self::minkowski(a, b, p),
        }
    }
}

// ============================================================================
// Search Distance Trait
// ============================================================================

/// Distance calculations used by the KD-tree and brute-force searches.
pub trait PointDistance<T: Float> {
    /// Distance in the comparison space (monotone in the true distance).
    fn reduced_distance(&self, a: &[T], b: &[T]) -> T;

    /// Comparison-space lower bound for crossing a splitting plane.
    fn split_reduced_distance(&self, split_val: T, query_val: T) -> T;

    /// Convert a comparison-space distance back to the metric space.
    fn post_process_distance(&self, d: T) -> T;
}

impl<T: Float> PointDistance<T> for DistanceMetric<T> {
    // Euclidean and Minkowski compare true distances: their power sums
    // overflow long before the distances themselves do.
    #[inline]
    fn reduced_distance(&self, a: &[T], b: &[T]) -> T {
        self.distance(a, b)
    }

    #[inline]
    fn split_reduced_distance(&self, split_val: T, query_val: T) -> T {
        (query_val - split_val).abs()
    }

    #[inline]
    fn post_process_distance(&self, d: T) -> T {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_metric_aliases() {
        assert_eq!("L2".parse::<Metric<f64>>(), Ok(Metric::Euclidean));
        assert_eq!("cityblock".parse::<Metric<f64>>(), Ok(Metric::Manhattan));
        assert_eq!("minkowski".parse::<Metric<f64>>(), Ok(Metric::Minkowski(2.0)));
        assert_eq!(" neighbors ".parse::<Metric<f64>>(), Ok(Metric::Neighbors));
        assert!(matches!(
            "cosine".parse::<Metric<f64>>(),
            Err(DtmError::UnknownMetric(_))
        ));
    }

    #[test]
    fn reduced_distance_round_trips_to_true_distance() {
        let a = [0.0, 1.0, -2.0];
        let b = [3.0, -1.0, 2.0];
        for metric in [
            DistanceMetric::Euclidean,
            DistanceMetric::Manhattan,
            DistanceMetric::Chebyshev,
            DistanceMetric::Minkowski(3.0),
        ] {
            let reduced = metric.reduced_distance(&a, &b);
            let d = metric.post_process_distance(reduced);
            assert!((d - metric.distance(&a, &b)).abs() < 1e-12, "{:?}", metric);
        }
    }

    #[test]
    fn large_orders_do_not_overflow() {
        let d = DistanceMetric::minkowski(&[10.0, 0.0], &[0.0, 0.0], 400.0);
        assert!((d - 10.0).abs() < 1e-9);
        let d = DistanceMetric::minkowski(&[3.0, 3.0], &[0.0, 0.0], 1000.0);
        assert!((d - 3.0 * 2.0f64.powf(1.0 / 1000.0)).abs() < 1e-9);
    }

    #[test]
    fn huge_euclidean_coordinates_rescale() {
        let d = DistanceMetric::euclidean(&[2e200, 0.0], &[1e200, 0.0]);
        assert!((d / 1e200 - 1.0).abs() < 1e-12);
        let d = DistanceMetric::euclidean(&[3e200, 4e200], &[0.0, 0.0]);
        assert!((d / 5e200 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn split_bound_never_exceeds_full_distance() {
        let a = [0.5, 4.0];
        let b = [2.0, -1.0];
        for metric in [
            DistanceMetric::Euclidean,
            DistanceMetric::Manhattan,
            DistanceMetric::Chebyshev,
            DistanceMetric::Minkowski(1.5),
        ] {
            let full = metric.reduced_distance(&a, &b);
            for dim in 0..2 {
                assert!(metric.split_reduced_distance(b[dim], a[dim]) <= full + 1e-12);
            }
        }
    }
}
