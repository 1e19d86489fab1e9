use approx::assert_relative_eq;
use dtm_rs::prelude::*;
use rand::prelude::*;

#[test]
fn test_normalized_density_with_explicit_sample_count() {
    // Σ wⱼ dⱼ = 0.15, rank normalizer (1 + 2) / 2 = 1.5, V₁ = 2.
    // density = (0.15 / 1.5)^-1 / (10 · 2) = 0.5
    let density = DtmDensityBuilder::new()
        .k(2)
        .q(1.0)
        .dim(1)
        .metric(Neighbors)
        .normalize(true)
        .n_samples(10)
        .build()
        .unwrap();
    let values = density.transform(&[0.1, 0.2], 2).unwrap();
    assert_relative_eq!(values[0], 0.5, epsilon = 1e-12);
}

#[test]
fn test_zero_distances_give_infinite_density() {
    let density = DtmDensityBuilder::new()
        .k(2)
        .dim(2)
        .metric(Neighbors)
        .build()
        .unwrap();
    let values: Vec<f64> = density.transform(&[0.0, 0.0, 1.0, 1.0], 2).unwrap();
    assert!(values[0].is_infinite() && values[0] > 0.0);
    assert_relative_eq!(values[1], 1.0);
}

#[test]
fn test_uniform_weights_invert_dtm() {
    let mut rng = StdRng::seed_from_u64(3);
    let points: Vec<f64> = (0..90).map(|_| rng.random_range(0.0..1.0)).collect();

    let mut dtm = Dtm::new(4).q(3.0).build().unwrap();
    let mut density = DtmDensityBuilder::new().k(4).q(3.0).build().unwrap();

    let d = dtm.fit_transform(&points, 3).unwrap();
    let f = density.fit_transform(&points, 3).unwrap();
    for (dtm_value, density_value) in d.iter().zip(&f) {
        assert_relative_eq!(*density_value, dtm_value.powi(-3), max_relative = 1e-9);
    }
}

#[test]
fn test_weights_and_k_are_equivalent_when_uniform() {
    let points: Vec<f64> = (0..12).map(|i| (i as f64 * 0.7).sin()).collect();
    let mut by_k = DtmDensityBuilder::new().k(3).build().unwrap();
    let mut by_weights = DtmDensityBuilder::new()
        .weights(&[1.0, 1.0, 1.0])
        .build()
        .unwrap();

    assert_eq!(by_weights.k(), 3);
    assert_relative_eq!(by_weights.weights()[0], 1.0 / 3.0);

    let a = by_k.fit_transform(&points, 2).unwrap();
    let b = by_weights.fit_transform(&points, 2).unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert_relative_eq!(*x, *y, max_relative = 1e-12);
    }
}

#[test]
fn test_normalized_density_of_uniform_grid() {
    // Evenly spaced points in 1D with spacing h: density ≈ 1 / (n h) away from the ends.
    let n = 400;
    let h = 1.0 / n as f64;
    let points: Vec<f64> = (0..n).map(|i| i as f64 * h).collect();

    let mut density = DtmDensityBuilder::new()
        .k(10)
        .normalize(true)
        .build()
        .unwrap();
    let estimate = density.fit(&points, 1).unwrap().transform(&[0.5 + h / 2.0], 1).unwrap();
    assert_relative_eq!(estimate[0], 1.0, max_relative = 0.15);
}

#[test]
fn test_normalized_density_in_two_dimensions() {
    // Uniform grid on the unit square: density ≈ 1.
    let side = 40;
    let h = 1.0 / side as f64;
    let points: Vec<f64> = (0..side * side)
        .flat_map(|i| [(i % side) as f64 * h, (i / side) as f64 * h])
        .collect();

    let mut density = DtmDensityBuilder::new()
        .k(12)
        .normalize(true)
        .build()
        .unwrap();
    let estimate = density
        .fit(&points, 2)
        .unwrap()
        .transform(&[0.5 + h / 3.0, 0.5 + h / 5.0], 2)
        .unwrap();
    assert!(estimate[0] > 0.5 && estimate[0] < 2.0, "estimate {}", estimate[0]);
}

#[test]
fn test_sample_count_falls_back_to_reference() {
    let points: Vec<f64> = (0..20).map(|i| i as f64).collect();
    let mut implicit = DtmDensityBuilder::new().k(2).normalize(true).build().unwrap();
    let mut explicit = DtmDensityBuilder::new()
        .k(2)
        .normalize(true)
        .n_samples(20)
        .build()
        .unwrap();
    assert_eq!(
        implicit.fit_transform(&points, 1).unwrap(),
        explicit.fit_transform(&points, 1).unwrap()
    );
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[test]
fn test_missing_k_and_weights() {
    let err = DtmDensityBuilder::<f64>::new().build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn test_conflicting_k_and_weights() {
    let err = DtmDensityBuilder::new()
        .k(2)
        .weights(&[0.5, 0.3, 0.2])
        .build()
        .unwrap_err();
    assert!(matches!(err, DtmError::ConflictingParameters(_)));
}

#[test]
fn test_invalid_weights() {
    for weights in [vec![], vec![0.0, 0.0], vec![1.0, -0.5], vec![f64::NAN]] {
        let err = DtmDensityBuilder::<f64>::new()
            .weights(&weights)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter, "{:?}", weights);
    }
}

#[test]
fn test_dimension_required_without_coordinates() {
    let err = DtmDensityBuilder::<f64>::new()
        .k(1)
        .metric(Neighbors)
        .build()
        .unwrap_err();
    assert_eq!(err, DtmError::MissingParameter("dim"));

    let err = DtmDensityBuilder::<f64>::new()
        .k(1)
        .metric(Neighbors)
        .dim(2)
        .normalize(true)
        .build()
        .unwrap_err();
    assert_eq!(err, DtmError::MissingParameter("n_samples"));

    let err = DtmDensityBuilder::<f64>::new().k(1).dim(0).build().unwrap_err();
    assert_eq!(err, DtmError::InvalidDimension(0));
}

#[test]
fn test_density_transform_before_fit() {
    let density = DtmDensityBuilder::<f64>::new().k(1).build().unwrap();
    assert!(!density.is_fitted());
    assert_eq!(density.transform(&[0.0], 1).unwrap_err(), DtmError::NotFitted);
}
