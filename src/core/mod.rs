//! The core module of the fusion pipeline.
//!
//! This module contains the fundamental components of the fusion pipeline,
//! including:
//! - Configuration management
//! - Error handling
//! - The engine adapter boundary
//! - Validation utilities for configuration values
//!
//! It also provides re-exports of commonly used types and functions for
//! convenience.

pub mod config;
pub mod errors;
pub mod traits;
pub mod validation;

pub use config::{FusionConfig, ParallelPolicy, ProcessingStrategy, QualityScoreWeights};
pub use errors::{FusionError, FusionResult, FusionStage};
pub use traits::{EngineProvider, PageRef, collect_page_input};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
