//! Error types for the fusion pipeline.
//!
//! This module defines the error types that can occur while collecting engine
//! output and fusing it, including input validation errors, configuration
//! errors, and engine adapter failures. It also provides utility functions for
//! creating these errors with appropriate context.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type FusionResult<T> = Result<T, FusionError>;

/// Enum representing different stages of the fusion pipeline.
///
/// This enum is used to identify which stage of the fusion pipeline an error
/// occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionStage {
    /// Error occurred while collecting engine output into a page input.
    InputCollection,
    /// Error occurred during outlier screening.
    OutlierScreening,
    /// Error occurred during line alignment.
    LineAlignment,
    /// Error occurred during character voting.
    CharacterVoting,
    /// Error occurred while assembling the fusion report.
    ReportAssembly,
    /// Generic processing error.
    Generic,
}

/// Implementation of Display for FusionStage.
///
/// This allows FusionStage to be converted to a string representation.
impl std::fmt::Display for FusionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FusionStage::InputCollection => write!(f, "input collection"),
            FusionStage::OutlierScreening => write!(f, "outlier screening"),
            FusionStage::LineAlignment => write!(f, "line alignment"),
            FusionStage::CharacterVoting => write!(f, "character voting"),
            FusionStage::ReportAssembly => write!(f, "report assembly"),
            FusionStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing various errors that can occur in the fusion pipeline.
///
/// Data-quality problems (garbled engines, empty output, disagreement) are
/// never surfaced through this type; they are recorded in the page fusion
/// report instead. These variants cover adapter failures, configuration
/// loading, and contract problems detected at the crate boundary.
#[derive(Error, Debug)]
pub enum FusionError {
    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: FusionStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error reported by an engine adapter while producing line results.
    #[error("engine '{engine}': {message}")]
    EngineFailure {
        /// The name of the engine that failed.
        engine: String,
        /// A message describing the failure.
        message: String,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from serializing or deserializing configuration.
    #[error("serialization")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Implementation of FusionError with utility functions for creating errors.
impl FusionError {
    /// Creates a FusionError for processing operations.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    ///
    /// # Returns
    ///
    /// A FusionError instance.
    pub fn processing_error(
        kind: FusionStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a FusionError for an engine adapter failure.
    ///
    /// # Arguments
    ///
    /// * `engine` - The name of the engine that failed.
    /// * `message` - A message describing the failure.
    ///
    /// # Returns
    ///
    /// A FusionError instance.
    pub fn engine_failure(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EngineFailure {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Creates a FusionError for invalid input.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the invalid input.
    ///
    /// # Returns
    ///
    /// A FusionError instance.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a FusionError for configuration errors.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the configuration error.
    ///
    /// # Returns
    ///
    /// A FusionError instance.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a FusionError for configuration errors with context.
    ///
    /// # Arguments
    ///
    /// * `field` - The field where the error occurred.
    /// * `value` - The value of the field.
    /// * `reason` - The reason for the error.
    ///
    /// # Returns
    ///
    /// A FusionError instance.
    pub fn config_error_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::ConfigError {
            message: format!(
                "Configuration error in field '{}' with value '{}': {}",
                field, value, reason
            ),
        }
    }
}
