//! Input validation for estimator configuration and data.
//!
//! ## Purpose
//!
//! This module provides the validation functions shared by the builders, the
//! estimators, and the built-in neighbour search. It checks parameter bounds,
//! matrix shapes, and numeric validity.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Efficiency**: Checks are ordered from cheap to expensive.
//! * **Generics**: Validation is generic over `Float` types.
//!
//! ## Key concepts
//!
//! * **Parameter Bounds**: `k ≥ 1`, `q` finite and positive, Minkowski `p ≥ 1`.
//! * **Row-major Matrices**: Flat data plus a column count must form whole rows.
//! * **Finite Checks**: Inputs must not contain NaN or infinities.
//!
//! ## Invariants
//!
//! * Validation logic is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not transform, sort, or repair input data.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::format;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::distance::Metric;
use crate::primitives::errors::DtmError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for estimator configuration and input data.
///
/// All methods fail fast on the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Parameter Validation
    // ========================================================================

    /// Validate that no builder parameter was set twice.
    pub fn validate_no_duplicates(duplicate_param: Option<&'static str>) -> Result<(), DtmError> {
        if let Some(parameter) = duplicate_param {
            return Err(DtmError::DuplicateParameter { parameter });
        }
        Ok(())
    }

    /// Validate the number of neighbours.
    pub fn validate_k(k: usize) -> Result<(), DtmError> {
        if k == 0 {
            return Err(DtmError::InvalidK(k));
        }
        Ok(())
    }

    /// Validate the power-mean order.
    pub fn validate_order<T: Float>(q: T) -> Result<(), DtmError> {
        if !q.is_finite() || q <= T::zero() {
            return Err(DtmError::InvalidOrder(q.to_f64().unwrap_or(f64::NAN)));
        }
        Ok(())
    }

    /// Validate metric parameters.
    pub fn validate_metric<T: Float>(metric: &Metric<T>) -> Result<(), DtmError> {
        if let Metric::Minkowski(p) = *metric {
            if !p.is_finite() || p < T::one() {
                return Err(DtmError::InvalidMinkowskiP(p.to_f64().unwrap_or(f64::NAN)));
            }
        }
        Ok(())
    }

    /// Validate an intrinsic dimension.
    pub fn validate_dimension(dim: usize) -> Result<(), DtmError> {
        if dim == 0 {
            return Err(DtmError::InvalidDimension(dim));
        }
        Ok(())
    }

    /// Validate rank weights: non-empty, finite, and strictly positive.
    pub fn validate_weights<T: Float>(weights: &[T]) -> Result<(), DtmError> {
        if weights.is_empty() {
            return Err(DtmError::InvalidWeights("no weights given".into()));
        }
        for (i, &w) in weights.iter().enumerate() {
            if !w.is_finite() || w <= T::zero() {
                return Err(DtmError::InvalidWeights(format!(
                    "weights[{}]={} (must be > 0 and finite)",
                    i,
                    w.to_f64().unwrap_or(f64::NAN)
                )));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Input Validation
    // ========================================================================

    /// Validate a row-major matrix and return its row count.
    pub fn validate_matrix<T: Float>(data: &[T], columns: usize) -> Result<usize, DtmError> {
        let rows = Self::validate_shape(data, columns)?;

        // All values finite
        for (i, &val) in data.iter().enumerate() {
            if !val.is_finite() {
                return Err(DtmError::InvalidNumericValue(format!(
                    "x[{}][{}]={}",
                    i / columns,
                    i % columns,
                    val.to_f64().unwrap_or(f64::NAN)
                )));
            }
        }

        Ok(rows)
    }

    /// Validate that `data` is non-empty and splits into whole rows; return the row count.
    pub fn validate_shape<T>(data: &[T], columns: usize) -> Result<usize, DtmError> {
        if data.is_empty() {
            return Err(DtmError::EmptyInput);
        }
        if columns == 0 || data.len() % columns != 0 {
            return Err(DtmError::RaggedInput {
                len: data.len(),
                columns,
            });
        }
        Ok(data.len() / columns)
    }

    /// Validate the first `k` entries of every row of a neighbour-distance table.
    ///
    /// Entries past `k` are never read and may hold anything.
    pub fn validate_neighbor_table<T: Float>(
        data: &[T],
        columns: usize,
        k: usize,
    ) -> Result<(), DtmError> {
        for (row_idx, row) in data.chunks_exact(columns).enumerate() {
            for (col, &val) in row[..k].iter().enumerate() {
                if !val.is_finite() || val < T::zero() {
                    return Err(DtmError::InvalidNumericValue(format!(
                        "neighbour distance x[{}][{}]={} (must be finite and >= 0)",
                        row_idx,
                        col,
                        val.to_f64().unwrap_or(f64::NAN)
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validate that a distance matrix holds no negative entries.
    pub fn validate_distances<T: Float>(data: &[T], columns: usize) -> Result<(), DtmError> {
        for (i, &val) in data.iter().enumerate() {
            if val < T::zero() {
                return Err(DtmError::InvalidNumericValue(format!(
                    "negative distance x[{}][{}]={}",
                    i / columns.max(1),
                    i % columns.max(1),
                    val.to_f64().unwrap_or(f64::NAN)
                )));
            }
        }
        Ok(())
    }

    /// Validate that neighbour-distance input has at least `k` columns.
    pub fn validate_neighbor_columns(columns: usize, k: usize) -> Result<(), DtmError> {
        if columns < k {
            return Err(DtmError::TooFewColumns { got: columns, k });
        }
        Ok(())
    }

    /// Validate that enough reference points exist for `k` neighbours.
    pub fn validate_reference_size(n_reference: usize, k: usize) -> Result<(), DtmError> {
        if n_reference < k {
            return Err(DtmError::TooFewReferencePoints { got: n_reference, k });
        }
        Ok(())
    }

    /// Validate that a column count matches the fitted one.
    pub fn validate_columns(expected: usize, got: usize) -> Result<(), DtmError> {
        if expected != got {
            return Err(DtmError::DimensionMismatch { expected, got });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_must_be_positive_and_finite() {
        assert!(Validator::validate_order(2.0).is_ok());
        assert!(Validator::validate_order(0.5).is_ok());
        assert_eq!(Validator::validate_order(0.0), Err(DtmError::InvalidOrder(0.0)));
        assert_eq!(Validator::validate_order(-1.0), Err(DtmError::InvalidOrder(-1.0)));
        assert!(Validator::validate_order(f64::INFINITY).is_err());
        assert!(Validator::validate_order(f64::NAN).is_err());
    }

    #[test]
    fn matrix_shape_checks() {
        assert_eq!(Validator::validate_matrix(&[1.0, 2.0, 3.0, 4.0], 2), Ok(2));
        assert_eq!(
            Validator::validate_matrix::<f64>(&[], 2),
            Err(DtmError::EmptyInput)
        );
        assert_eq!(
            Validator::validate_matrix(&[1.0, 2.0, 3.0], 2),
            Err(DtmError::RaggedInput { len: 3, columns: 2 })
        );
        assert_eq!(
            Validator::validate_matrix(&[1.0], 0),
            Err(DtmError::RaggedInput { len: 1, columns: 0 })
        );
        assert!(matches!(
            Validator::validate_matrix(&[1.0, f64::NAN], 1),
            Err(DtmError::InvalidNumericValue(_))
        ));
    }

    #[test]
    fn minkowski_exponent_bounds() {
        assert!(Validator::validate_metric(&Metric::Minkowski(1.0)).is_ok());
        assert!(Validator::validate_metric(&Metric::Minkowski(0.5)).is_err());
        assert!(Validator::validate_metric(&Metric::<f64>::Precomputed).is_ok());
    }

    #[test]
    fn weights_must_be_positive() {
        assert!(Validator::validate_weights(&[0.2, 0.8]).is_ok());
        assert!(Validator::validate_weights::<f64>(&[]).is_err());
        assert!(Validator::validate_weights(&[0.5, 0.0]).is_err());
        assert!(Validator::validate_weights(&[0.5, f64::NAN]).is_err());
    }

    #[test]
    fn neighbor_table_checks_only_first_k_columns() {
        let table = [1.0, 3.0, f64::INFINITY, 0.5, 2.0, -4.0];
        assert!(Validator::validate_neighbor_table(&table, 3, 2).is_ok());
        assert!(Validator::validate_neighbor_table(&table, 3, 3).is_err());
        assert!(Validator::validate_neighbor_table(&[1.0, f64::NAN, 0.0], 3, 2).is_err());
    }
}
