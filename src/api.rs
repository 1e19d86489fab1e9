//! High-level API for distance to measure estimation.
//!
//! ## Purpose
//!
//! This module gathers the user-facing types in one place: the estimator
//! builders, the estimators, the search configuration enums, and the error
//! type.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builders with sensible defaults for every optional parameter.
//! * **Validated**: Parameters are validated when `.build()` is called.
//! * **Type-Safe**: Generic over `Float` types for flexible precision.
//!
//! ### Configuration Flow
//!
//! 1. Create a builder via `Dtm::new(k)` or `DtmDensityBuilder::new()`.
//! 2. Chain configuration methods (`.q()`, `.metric()`, `.algorithm()`, ...).
//! 3. Call `.build()` to get an estimator, then `fit` / `transform`.

pub use crate::algorithms::knn::{
    Algorithm, Knn, KnnOutput, KnnResult, NeighborSearch, SearchConfig,
};
pub use crate::estimators::density::{DtmDensity, DtmDensityBuilder};
pub use crate::estimators::dtm::{DistanceToMeasure, DtmBuilder};
pub use crate::math::distance::Metric;
pub use crate::primitives::errors::{DtmError, ErrorKind};
