//! Validation utilities for fusion configuration.
//!
//! This module contains validation functions used when building a fusion
//! configuration to ensure parameters are within valid ranges. Out-of-range
//! values are clamped with a warning rather than rejected.

use tracing::warn;

/// Validates and clamps a threshold value to the range [0.0, 1.0].
///
/// # Arguments
///
/// * `threshold` - The threshold value to validate
/// * `param_name` - The name of the parameter for logging purposes
///
/// # Returns
///
/// The validated and potentially clamped threshold value
pub fn validate_threshold(threshold: f32, param_name: &str) -> f32 {
    if (0.0..=1.0).contains(&threshold) {
        threshold
    } else {
        warn!("{param_name} out of range [{threshold}], clamping to [0.0, 1.0]");
        threshold.clamp(0.0, 1.0)
    }
}

/// Validates and ensures a count value is at least 1.
///
/// # Arguments
///
/// * `count` - The count value to validate
/// * `param_name` - The name of the parameter for logging purposes
///
/// # Returns
///
/// The validated count value (minimum 1)
pub fn validate_min_count(count: usize, param_name: &str) -> usize {
    if count >= 1 {
        count
    } else {
        warn!("{param_name} must be >= 1, got {count}; using 1");
        1
    }
}

/// Validates and ensures a non-negative weight value.
///
/// NaN weights are treated as out of range.
///
/// # Arguments
///
/// * `weight` - The weight value to validate
/// * `param_name` - The name of the parameter for logging purposes
///
/// # Returns
///
/// The validated weight value (minimum 0.0)
pub fn validate_weight(weight: f32, param_name: &str) -> f32 {
    if weight >= 0.0 && weight.is_finite() {
        weight
    } else {
        warn!("{param_name} must be a finite value >= 0.0, got {weight}; using 0.0");
        0.0
    }
}
