//! Builder pattern implementation for the fusion pipeline.

use crate::core::config::{FusionConfig, ParallelPolicy, QualityScoreWeights};
use crate::core::errors::FusionResult;
use crate::domain::EngineId;
use crate::pipeline::fusion::OcrFusion;

/// Builder for creating [`OcrFusion`] instances.
///
/// This struct provides a fluent API for configuring and building fusion
/// pipeline instances with various options.
#[derive(Debug, Default)]
pub struct OcrFusionBuilder {
    config: FusionConfig,
}

impl OcrFusionBuilder {
    /// Creates a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder from an existing configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The FusionConfig to use
    ///
    /// # Returns
    ///
    /// A new OcrFusionBuilder instance
    pub fn from_config(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Sets the mean distance above which an engine's page output counts as
    /// an outlier.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Normalized distance threshold (0.0 to 1.0)
    ///
    /// # Returns
    ///
    /// The updated builder instance
    pub fn outlier_distance_threshold(mut self, threshold: f32) -> Self {
        self.config.outlier_distance_threshold = threshold;
        self
    }

    /// Sets the minimum similarity for two lines to align as the same
    /// source line.
    pub fn min_line_similarity(mut self, similarity: f32) -> Self {
        self.config.min_line_similarity = similarity;
        self
    }

    /// Sets the number of engines that must survive screening for a page to
    /// count as usable.
    pub fn min_surviving_engines(mut self, count: usize) -> Self {
        self.config.min_surviving_engines = count;
        self
    }

    /// Sets the engine order used to break ties deterministically.
    ///
    /// The order never expresses trust in an engine, only who wins a tie.
    pub fn engine_priority_order(mut self, order: Vec<EngineId>) -> Self {
        self.config.engine_priority_order = order;
        self
    }

    /// Sets the weights for the composite quality score.
    pub fn quality_score_weights(mut self, weights: QualityScoreWeights) -> Self {
        self.config.quality_score_weights = weights;
        self
    }

    /// Sets the parallel processing policy for batch runs.
    pub fn parallel_policy(mut self, policy: ParallelPolicy) -> Self {
        self.config.parallel_policy = policy;
        self
    }

    /// Sets the page count at or below which batches run sequentially.
    pub fn page_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_policy.page_threshold = threshold;
        self
    }

    /// Builds the fusion pipeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the accumulated configuration is
    /// invalid, for example a duplicated priority entry.
    pub fn build(self) -> FusionResult<OcrFusion> {
        OcrFusion::new(self.config)
    }
}
