//! Layer 4: Engine
//!
//! # Purpose
//!
//! This layer holds the validation shared by every other component and the
//! row reductions that turn neighbour distances into estimator output.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine ← You are here
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Row reductions (DTM and density).
pub mod executor;

/// Parameter and input validation.
pub mod validator;
