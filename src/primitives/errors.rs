//! Error types for DTM estimation.
//!
//! ## Purpose
//!
//! This module defines the single error type returned by every fallible
//! operation in the crate, from builder validation down to neighbour search.
//!
//! ## Design notes
//!
//! * **Flat enum**: Every failure is one variant carrying just enough context to
//!   produce a readable message.
//! * **Classification**: [`DtmError::kind`] groups variants into the four
//!   categories callers usually branch on.
//! * **no_std**: `Display` is implemented manually; `std::error::Error` is only
//!   implemented with the `std` feature.
//!
//! ## Invariants
//!
//! * Errors are values: cloning and comparing them is cheap and deterministic.
//!
//! ## Non-goals
//!
//! * This module does not perform any recovery; errors propagate unchanged.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(feature = "std")]
use std::string::String;

// External dependencies
use core::fmt;

// ============================================================================
// Error Kind
// ============================================================================

/// Coarse classification of a [`DtmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An operation needed a fitted neighbour search but `fit` was never called.
    UnfittedState,

    /// A parameter is out of range or unsupported.
    InvalidParameter,

    /// Array shapes do not agree with each other or with the parameters.
    DimensionMismatch,

    /// Input data is empty, ragged, or contains invalid numbers.
    InvalidInput,
}

// ============================================================================
// Error Type
// ============================================================================

/// Errors produced while configuring, fitting, or evaluating an estimator.
#[derive(Debug, Clone, PartialEq)]
pub enum DtmError {
    /// `transform` was called before `fit` on an estimator that needs a fitted search.
    NotFitted,

    /// Number of neighbours must be at least 1.
    InvalidK(usize),

    /// Power-mean order must be finite and strictly positive.
    InvalidOrder(f64),

    /// Minkowski exponent must be finite and at least 1.
    InvalidMinkowskiP(f64),

    /// Metric name is not recognised.
    UnknownMetric(String),

    /// Metric is not supported by the component it was given to.
    UnsupportedMetric {
        /// Metric name.
        metric: &'static str,
        /// Component rejecting it.
        component: &'static str,
    },

    /// Density dimension must be at least 1.
    InvalidDimension(usize),

    /// A required parameter was never set.
    MissingParameter(&'static str),

    /// Two parameters disagree with each other.
    ConflictingParameters(String),

    /// Rank weights are empty, non-finite, or non-positive.
    InvalidWeights(String),

    /// The same builder parameter was set more than once.
    DuplicateParameter {
        /// Parameter name.
        parameter: &'static str,
    },

    /// More neighbours requested than reference points available.
    TooFewReferencePoints {
        /// Reference points available.
        got: usize,
        /// Neighbours requested.
        k: usize,
    },

    /// Neighbour-distance input has fewer columns than `k`.
    TooFewColumns {
        /// Columns supplied.
        got: usize,
        /// Neighbours requested.
        k: usize,
    },

    /// Column counts disagree.
    DimensionMismatch {
        /// Columns expected.
        expected: usize,
        /// Columns supplied.
        got: usize,
    },

    /// Precomputed reference distances must form a square matrix.
    NonSquareDistanceMatrix {
        /// Rows supplied.
        rows: usize,
        /// Columns supplied.
        columns: usize,
    },

    /// Input arrays are empty.
    EmptyInput,

    /// Flat input length is not a whole number of rows.
    RaggedInput {
        /// Flat length.
        len: usize,
        /// Declared columns.
        columns: usize,
    },

    /// Input contains a NaN, an infinity, or a negative distance.
    InvalidNumericValue(String),
}

impl DtmError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DtmError::NotFitted => ErrorKind::UnfittedState,
            DtmError::InvalidK(_)
            | DtmError::InvalidOrder(_)
            | DtmError::InvalidMinkowskiP(_)
            | DtmError::UnknownMetric(_)
            | DtmError::UnsupportedMetric { .. }
            | DtmError::InvalidDimension(_)
            | DtmError::MissingParameter(_)
            | DtmError::ConflictingParameters(_)
            | DtmError::InvalidWeights(_)
            | DtmError::DuplicateParameter { .. }
            | DtmError::TooFewReferencePoints { .. } => ErrorKind::InvalidParameter,
            DtmError::TooFewColumns { .. }
            | DtmError::DimensionMismatch { .. }
            | DtmError::NonSquareDistanceMatrix { .. } => ErrorKind::DimensionMismatch,
            DtmError::EmptyInput
            | DtmError::RaggedInput { .. }
            | DtmError::InvalidNumericValue(_) => ErrorKind::InvalidInput,
        }
    }
}

impl fmt::Display for DtmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DtmError::NotFitted => write!(f, "Estimator is not fitted: call fit before transform"),
            DtmError::InvalidK(k) => write!(f, "Invalid k: {} (must be at least 1)", k),
            DtmError::InvalidOrder(q) => write!(f, "Invalid q: {} (must be > 0 and finite)", q),
            DtmError::InvalidMinkowskiP(p) => {
                write!(f, "Invalid Minkowski p: {} (must be >= 1 and finite)", p)
            }
            DtmError::UnknownMetric(name) => write!(f, "Unknown metric: '{}'", name),
            DtmError::UnsupportedMetric { metric, component } => {
                write!(f, "Metric '{}' is not supported by {}", metric, component)
            }
            DtmError::InvalidDimension(d) => {
                write!(f, "Invalid dimension: {} (must be at least 1)", d)
            }
            DtmError::MissingParameter(name) => write!(f, "Missing required parameter: {}", name),
            DtmError::ConflictingParameters(msg) => write!(f, "Conflicting parameters: {}", msg),
            DtmError::InvalidWeights(msg) => write!(f, "Invalid weights: {}", msg),
            DtmError::DuplicateParameter { parameter } => write!(
                f,
                "Parameter '{}' was set multiple times. Each parameter can only be configured once.",
                parameter
            ),
            DtmError::TooFewReferencePoints { got, k } => write!(
                f,
                "Too few reference points: got {}, need at least k = {}",
                got, k
            ),
            DtmError::TooFewColumns { got, k } => write!(
                f,
                "Too few neighbour columns: got {}, need at least k = {}",
                got, k
            ),
            DtmError::DimensionMismatch { expected, got } => write!(
                f,
                "Dimension mismatch: expected {} columns, got {}",
                expected, got
            ),
            DtmError::NonSquareDistanceMatrix { rows, columns } => write!(
                f,
                "Precomputed distance matrix must be square: got {} rows and {} columns",
                rows, columns
            ),
            DtmError::EmptyInput => write!(f, "Input arrays are empty"),
            DtmError::RaggedInput { len, columns } => write!(
                f,
                "Input of length {} cannot be split into rows of {} columns",
                len, columns
            ),
            DtmError::InvalidNumericValue(msg) => write!(f, "Invalid numeric value: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DtmError {}
