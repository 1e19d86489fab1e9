use approx::assert_relative_eq;
use dtm_rs::{Algorithm, DtmError, Knn, KnnOutput, Metric, NeighborSearch, SearchConfig};
use rand::prelude::*;

fn config(metric: Metric<f64>, algorithm: Algorithm) -> SearchConfig<f64> {
    SearchConfig {
        metric,
        algorithm,
        sort_results: true,
        ..Default::default()
    }
}

#[test]
fn test_tree_and_brute_force_return_same_neighbors() {
    let mut rng = StdRng::seed_from_u64(42);
    let reference: Vec<f64> = (0..300).map(|_| rng.random::<f64>()).collect();
    let query: Vec<f64> = (0..60).map(|_| rng.random::<f64>()).collect();

    for metric in [
        Metric::Euclidean,
        Metric::Manhattan,
        Metric::Chebyshev,
        Metric::Minkowski(1.5),
    ] {
        let mut tree = Knn::configure(4, KnnOutput::BOTH, &config(metric, Algorithm::KdTree)).unwrap();
        let mut brute =
            Knn::configure(4, KnnOutput::BOTH, &config(metric, Algorithm::BruteForce)).unwrap();
        let a = tree.fit(&reference, 3).unwrap().transform(&query, 3).unwrap();
        let b = brute.fit(&reference, 3).unwrap().transform(&query, 3).unwrap();

        assert_eq!(a.n_queries, 20);
        for row in 0..a.n_queries {
            let (da, db) = (a.row_distances(row).unwrap(), b.row_distances(row).unwrap());
            for (x, y) in da.iter().zip(db) {
                assert_relative_eq!(*x, *y, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_sorted_rows_are_ascending() {
    let mut rng = StdRng::seed_from_u64(9);
    let reference: Vec<f64> = (0..200).map(|_| rng.random_range(-1.0..1.0)).collect();

    let mut knn = Knn::configure(6, KnnOutput::BOTH, &config(Metric::Euclidean, Algorithm::Auto)).unwrap();
    let result = knn.fit(&reference, 2).unwrap().transform(&reference, 2).unwrap();

    for row in 0..result.n_queries {
        let distances = result.row_distances(row).unwrap();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        // Each reference point is its own nearest neighbour.
        assert_eq!(distances[0], 0.0);
        assert_eq!(result.row_indices(row).unwrap()[0], row);
    }
}

#[test]
fn test_precomputed_search() {
    let matrix = [
        0.0, 2.0, 5.0, //
        2.0, 0.0, 1.0, //
        5.0, 1.0, 0.0,
    ];
    let mut knn =
        Knn::configure(2, KnnOutput::BOTH, &config(Metric::Precomputed, Algorithm::Auto)).unwrap();
    let result = knn.fit(&matrix, 3).unwrap().transform(&[4.0, 0.5, 3.0], 3).unwrap();

    assert_eq!(knn.n_samples(), 3);
    assert_eq!(result.row_indices(0).unwrap(), &[1, 2]);
    assert_eq!(result.row_distances(0).unwrap(), &[0.5, 3.0]);
}

#[test]
fn test_precomputed_query_width() {
    let mut knn =
        Knn::configure(1, KnnOutput::DISTANCES, &config(Metric::Precomputed, Algorithm::Auto)).unwrap();
    knn.fit(&[0.0, 1.0, 1.0, 0.0], 2).unwrap();
    let err = knn.transform(&[1.0, 2.0, 3.0], 3).unwrap_err();
    assert_eq!(err, DtmError::DimensionMismatch { expected: 2, got: 3 });
}

#[test]
fn test_neighbors_metric_is_not_searchable() {
    let result = Knn::<f64>::configure(1, KnnOutput::DISTANCES, &config(Metric::Neighbors, Algorithm::Auto));
    assert!(matches!(result, Err(DtmError::UnsupportedMetric { .. })));
}

#[test]
fn test_output_selection() {
    let reference = [0.0, 1.0, 3.0];
    let mut knn = Knn::configure(2, KnnOutput::INDICES, &config(Metric::Euclidean, Algorithm::Auto)).unwrap();
    let result = knn.fit(&reference, 1).unwrap().transform(&[2.6], 1).unwrap();

    assert!(result.distances.is_none());
    assert_eq!(result.row_indices(0).unwrap(), &[2, 1]);
}
