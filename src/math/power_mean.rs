//! Power means and related reductions over neighbour distances.
//!
//! ## Purpose
//!
//! The distance to measure of a point is the power mean of order `q` of its
//! k nearest neighbour distances:
//!
//! ```text
//! DTM = ((1/k) Σ dᵢ^q)^(1/q)
//! ```
//!
//! This module holds that reduction, the rank-weighted power sum used by the
//! density estimator, and the unit-ball volume used to normalise densities.
//!
//! ## Design notes
//!
//! * **Scaled evaluation**: The power mean is computed as
//!   `m · ((1/k) Σ (dᵢ/m)^q)^(1/q)` with `m = max dᵢ`, so large `q` cannot
//!   overflow to infinity.
//!
//! ## Invariants
//!
//! * For non-negative input the power mean lies in `[min dᵢ, max dᵢ]`.
//! * The power mean is non-decreasing in `q`.

// External dependencies
use num_traits::Float;

/// Power mean of order `q` of non-negative values.
///
/// Returns zero for an empty slice or when every value is zero.
pub fn power_mean<T: Float>(values: &[T], q: T) -> T {
    if values.is_empty() {
        return T::zero();
    }
    let m = values.iter().copied().fold(T::zero(), T::max);
    if m <= T::zero() {
        return T::zero();
    }
    if q == T::one() {
        return values.iter().copied().fold(T::zero(), |acc, d| acc + d) / count::<T>(values.len());
    }

    let sum = values
        .iter()
        .map(|&d| (d / m).powf(q))
        .fold(T::zero(), |acc, x| acc + x);
    let mean = sum / count::<T>(values.len());

    // Rounding can push the scaled mean a hair outside [min, max]; clamp back.
    (m * mean.powf(T::one() / q)).min(m)
}

/// Rank-weighted power sum `Σ wⱼ dⱼ^q`.
///
/// `weights` and `values` are paired by position; extra entries on either
/// side are ignored.
pub fn weighted_power_sum<T: Float>(values: &[T], weights: &[T], q: T) -> T {
    values
        .iter()
        .zip(weights.iter())
        .map(|(&d, &w)| w * d.powf(q))
        .fold(T::zero(), |acc, x| acc + x)
}

/// Expected rank profile `Σ wⱼ j^(q/dim)` of a weighted DTM on uniform data.
pub fn rank_normalizer<T: Float>(weights: &[T], q: T, dim: T) -> T {
    let exponent = q / dim;
    weights
        .iter()
        .enumerate()
        .map(|(j, &w)| w * count::<T>(j + 1).powf(exponent))
        .fold(T::zero(), |acc, x| acc + x)
}

/// Volume of the unit ball in `dim` dimensions, `π^(d/2) / Γ(d/2 + 1)`.
///
/// Evaluated with the recurrence `V_d = V_{d-2} · 2π / d`.
pub fn unit_ball_volume<T: Float>(dim: usize) -> T {
    let two = T::one() + T::one();
    let pi = T::from(core::f64::consts::PI).unwrap_or_else(T::zero);
    let mut volume = if dim % 2 == 0 { T::one() } else { two };
    let mut d = if dim % 2 == 0 { 2 } else { 3 };
    while d <= dim {
        volume = volume * two * pi / count::<T>(d);
        d += 2;
    }
    volume
}

#[inline]
fn count<T: Float>(n: usize) -> T {
    T::from(n).unwrap_or_else(T::max_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn power_mean_matches_closed_forms() {
        assert_relative_eq!(power_mean(&[2.0, 2.0], 2.0), 2.0);
        assert_relative_eq!(power_mean(&[1.0, 3.0], 1.0), 2.0);
        assert_relative_eq!(power_mean(&[3.0, 4.0], 2.0), (12.5f64).sqrt());
        assert_eq!(power_mean::<f64>(&[], 2.0), 0.0);
        assert_eq!(power_mean(&[0.0, 0.0, 0.0], 3.0), 0.0);
    }

    #[test]
    fn large_order_approaches_maximum_without_overflow() {
        let d = [1.0e10, 2.0e10, 3.0e10];
        let m = power_mean(&d, 500.0);
        assert!(m.is_finite());
        assert!(m <= 3.0e10);
        assert!(m > 2.9e10);
    }

    #[test]
    fn unit_ball_volumes() {
        use core::f64::consts::PI;
        assert_relative_eq!(unit_ball_volume::<f64>(0), 1.0);
        assert_relative_eq!(unit_ball_volume::<f64>(1), 2.0);
        assert_relative_eq!(unit_ball_volume::<f64>(2), PI);
        assert_relative_eq!(unit_ball_volume::<f64>(3), 4.0 * PI / 3.0);
        assert_relative_eq!(unit_ball_volume::<f64>(4), PI * PI / 2.0);
    }

    #[test]
    fn rank_normalizer_uniform_weights() {
        // weights 1/2, q/dim = 1: (1 + 2) / 2
        assert_relative_eq!(rank_normalizer(&[0.5, 0.5], 1.0, 1.0), 1.5);
    }
}
