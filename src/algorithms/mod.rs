//! Layer 3: Algorithms
//!
//! # Purpose
//!
//! This layer contains the k-nearest neighbour search provider the
//! estimators delegate to, and the trait other providers implement.

/// k-nearest neighbour search.
pub mod knn;
