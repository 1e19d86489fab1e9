#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use dtm_rs::internals::math::distance::{DistanceMetric, Metric, PointDistance};

// ============================================================================
// Euclidean Distance Tests
// ============================================================================

#[test]
fn test_euclidean_distance_1d() {
    let dist = DistanceMetric::euclidean(&[1.0], &[4.0]);
    assert_relative_eq!(dist, 3.0);
}

#[test]
fn test_euclidean_distance_2d() {
    let dist = DistanceMetric::euclidean(&[0.0, 0.0], &[3.0, 4.0]);
    assert_relative_eq!(dist, 5.0);
}

#[test]
fn test_euclidean_distance_3d() {
    // diffs: 3, 4, 5. sum_sq: 9+16+25=50
    let dist = DistanceMetric::euclidean(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0]);
    assert_relative_eq!(dist, 50.0f64.sqrt());
}

// ============================================================================
// Other Metrics
// ============================================================================

#[test]
fn test_manhattan_and_chebyshev() {
    let a = [1.0, -2.0, 0.5];
    let b = [-1.0, 2.0, 0.0];
    assert_relative_eq!(DistanceMetric::manhattan(&a, &b), 6.5);
    assert_relative_eq!(DistanceMetric::chebyshev(&a, &b), 4.0);
}

#[test]
fn test_minkowski_generalizes_l1_and_l2() {
    let a = [0.0, 0.0];
    let b = [3.0, 4.0];
    assert_relative_eq!(DistanceMetric::minkowski(&a, &b, 1.0), 7.0);
    assert_relative_eq!(DistanceMetric::minkowski(&a, &b, 2.0), 5.0, epsilon = 1e-12);
    // p = 3: (27 + 64)^(1/3)
    assert_relative_eq!(
        DistanceMetric::minkowski(&a, &b, 3.0),
        91.0f64.powf(1.0 / 3.0),
        epsilon = 1e-12
    );
}

#[test]
fn test_reduced_distance_is_monotone() {
    let metric = DistanceMetric::Euclidean;
    let q = [0.0, 0.0];
    let near = metric.reduced_distance(&q, &[1.0, 1.0]);
    let far = metric.reduced_distance(&q, &[2.0, 0.5]);
    assert!(near < far);
    assert_relative_eq!(metric.post_process_distance(near), 2.0f64.sqrt());
}

// ============================================================================
// Metric Modes
// ============================================================================

#[test]
fn test_metric_modes() {
    assert_eq!(Metric::<f64>::default(), Metric::Euclidean);
    assert_eq!(
        Metric::Minkowski(3.0).distance_metric(),
        Some(DistanceMetric::Minkowski(3.0))
    );
    assert_eq!(Metric::<f64>::Precomputed.distance_metric(), None);
    assert_eq!(Metric::<f64>::Neighbors.distance_metric(), None);
    assert_eq!(Metric::<f64>::Neighbors.to_string(), "neighbors");
    assert_eq!(Metric::Minkowski(3.0).to_string(), "minkowski(p=3)");
}
