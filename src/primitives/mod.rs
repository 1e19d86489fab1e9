//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer holds the foundational types every other layer depends on:
//! the crate error type and reusable search buffers.
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
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Error types.
pub mod errors;

/// Reusable k-nearest neighbour search buffers.
pub mod buffer;
