//! Configuration for the fusion pipeline.

use crate::core::config::parallel::ParallelPolicy;
use crate::core::errors::FusionResult;
use crate::core::validation::{validate_min_count, validate_threshold, validate_weight};
use crate::domain::engine::EngineId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Weights for the composite page quality score.
///
/// The score blends mean line agreement, the fraction of line groups backed
/// by more than one engine, and a penalty that shrinks as engines get
/// excluded. The weights here are tuning knobs, and the default values are
/// starting points that worked on mixed scan corpora, not ground truth;
/// different document domains warrant different settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScoreWeights {
    /// Weight of the mean per-line agreement ratio.
    #[serde(default = "QualityScoreWeights::default_agreement")]
    pub agreement: f32,

    /// Weight of the fraction of line groups with at least two contributing
    /// engines.
    #[serde(default = "QualityScoreWeights::default_coverage")]
    pub coverage: f32,

    /// Weight of the exclusion penalty term, 1 / (1 + excluded engine count).
    #[serde(default = "QualityScoreWeights::default_outlier_penalty")]
    pub outlier_penalty: f32,
}

impl QualityScoreWeights {
    /// Create weights with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the agreement weight.
    pub fn with_agreement(mut self, weight: f32) -> Self {
        self.agreement = weight;
        self
    }

    /// Set the coverage weight.
    pub fn with_coverage(mut self, weight: f32) -> Self {
        self.coverage = weight;
        self
    }

    /// Set the outlier penalty weight.
    pub fn with_outlier_penalty(mut self, weight: f32) -> Self {
        self.outlier_penalty = weight;
        self
    }

    /// Sum of the weights, used to normalize the composite score.
    pub fn total(&self) -> f32 {
        self.agreement + self.coverage + self.outlier_penalty
    }

    /// Returns a copy with each weight validated and clamped.
    pub fn validated(&self) -> Self {
        Self {
            agreement: validate_weight(self.agreement, "quality_score_weights.agreement"),
            coverage: validate_weight(self.coverage, "quality_score_weights.coverage"),
            outlier_penalty: validate_weight(
                self.outlier_penalty,
                "quality_score_weights.outlier_penalty",
            ),
        }
    }

    /// Default value for the agreement weight.
    fn default_agreement() -> f32 {
        0.5
    }

    /// Default value for the coverage weight.
    fn default_coverage() -> f32 {
        0.3
    }

    /// Default value for the outlier penalty weight.
    fn default_outlier_penalty() -> f32 {
        0.2
    }
}

impl Default for QualityScoreWeights {
    fn default() -> Self {
        Self {
            agreement: Self::default_agreement(),
            coverage: Self::default_coverage(),
            outlier_penalty: Self::default_outlier_penalty(),
        }
    }
}

/// Configuration for multi-engine fusion.
///
/// All thresholds live here rather than as constants so that callers can tune
/// them per document domain. A configuration is read-only for the duration of
/// a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Mean normalized edit distance above which an engine's page output is
    /// treated as an outlier and excluded from fusion.
    /// Default: 0.6
    #[serde(default = "FusionConfig::default_outlier_distance_threshold")]
    pub outlier_distance_threshold: f32,

    /// Minimum text similarity for two lines from different engines to be
    /// considered the same source line during alignment.
    /// Default: 0.3
    #[serde(default = "FusionConfig::default_min_line_similarity")]
    pub min_line_similarity: f32,

    /// Minimum number of engines that must survive outlier screening for the
    /// page to count as usable.
    /// Default: 1
    #[serde(default = "FusionConfig::default_min_surviving_engines")]
    pub min_surviving_engines: usize,

    /// Engine order used to break ties deterministically. Engines listed
    /// earlier win ties. Engines not listed fall in behind the listed ones in
    /// ordinal order; an empty list means plain ordinal order. This order
    /// never expresses trust, only tie-breaking.
    #[serde(default)]
    pub engine_priority_order: Vec<EngineId>,

    /// Weights for the composite quality score.
    #[serde(default)]
    pub quality_score_weights: QualityScoreWeights,

    /// Parallel processing policy for batch runs.
    #[serde(default)]
    pub parallel_policy: ParallelPolicy,
}

impl FusionConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the outlier distance threshold.
    pub fn with_outlier_distance_threshold(mut self, threshold: f32) -> Self {
        self.outlier_distance_threshold = threshold;
        self
    }

    /// Set the minimum line similarity for alignment.
    pub fn with_min_line_similarity(mut self, similarity: f32) -> Self {
        self.min_line_similarity = similarity;
        self
    }

    /// Set the minimum number of surviving engines.
    pub fn with_min_surviving_engines(mut self, count: usize) -> Self {
        self.min_surviving_engines = count;
        self
    }

    /// Set the engine priority order.
    pub fn with_engine_priority_order(mut self, order: Vec<EngineId>) -> Self {
        self.engine_priority_order = order;
        self
    }

    /// Set the quality score weights.
    pub fn with_quality_score_weights(mut self, weights: QualityScoreWeights) -> Self {
        self.quality_score_weights = weights;
        self
    }

    /// Set the parallel policy.
    pub fn with_parallel_policy(mut self, policy: ParallelPolicy) -> Self {
        self.parallel_policy = policy;
        self
    }

    /// Returns a copy with every parameter validated, clamping out-of-range
    /// values with a warning.
    pub fn validated(&self) -> Self {
        Self {
            outlier_distance_threshold: validate_threshold(
                self.outlier_distance_threshold,
                "outlier_distance_threshold",
            ),
            min_line_similarity: validate_threshold(self.min_line_similarity, "min_line_similarity"),
            min_surviving_engines: validate_min_count(
                self.min_surviving_engines,
                "min_surviving_engines",
            ),
            engine_priority_order: self.engine_priority_order.clone(),
            quality_score_weights: self.quality_score_weights.validated(),
            parallel_policy: self.parallel_policy.clone(),
        }
    }

    /// Returns the tie-break rank of an engine under this configuration.
    ///
    /// Lower rank wins ties. Engines named in `engine_priority_order` rank by
    /// their position there; unlisted engines follow in ordinal order.
    pub fn priority_rank(&self, engine: EngineId) -> usize {
        match self
            .engine_priority_order
            .iter()
            .position(|candidate| *candidate == engine)
        {
            Some(position) => position,
            None => self.engine_priority_order.len() + engine.ordinal(),
        }
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> FusionResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> FusionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Default value for the outlier distance threshold.
    fn default_outlier_distance_threshold() -> f32 {
        0.6
    }

    /// Default value for the minimum line similarity.
    fn default_min_line_similarity() -> f32 {
        0.3
    }

    /// Default value for the minimum surviving engine count.
    fn default_min_surviving_engines() -> usize {
        1
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            outlier_distance_threshold: Self::default_outlier_distance_threshold(),
            min_line_similarity: Self::default_min_line_similarity(),
            min_surviving_engines: Self::default_min_surviving_engines(),
            engine_priority_order: Vec::new(),
            quality_score_weights: QualityScoreWeights::default(),
            parallel_policy: ParallelPolicy::default(),
        }
    }
}
