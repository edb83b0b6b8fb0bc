//! Configuration management for the fusion pipeline.
//!
//! This module provides the configuration types for fusion runs, including
//! thresholds, tie-break ordering, quality score weights, and the parallel
//! processing policy.

pub mod fusion;
pub mod parallel;

// Re-export commonly used types
pub use fusion::{FusionConfig, QualityScoreWeights};
pub use parallel::{ParallelPolicy, ProcessingStrategy};
