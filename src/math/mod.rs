//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides pure mathematical building blocks used throughout the crate:
//! - Distance metrics and input modes
//! - Exact k-nearest neighbour search (KD-tree)
//! - Power means and density normalisation constants
//!
//! These are reusable pieces with no estimator-specific state.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Distance metrics and input modes.
pub mod distance;

/// KD-tree for exact k-nearest neighbour search.
pub mod neighborhood;

/// Power means and density normalisation.
pub mod power_mean;
