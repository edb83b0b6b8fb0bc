//! Per-page fusion report assembly.
//!
//! After voting completes, the page's screening outcome and fused lines are
//! folded into a [`PageFusionReport`]. The report is the signal surface for
//! downstream escalation: callers re-queue or re-process a page based on its
//! quality score and `no_usable_engine` flag, never on the fused text
//! itself.

use crate::core::config::FusionConfig;
use crate::domain::{EngineId, PageInput};
use crate::processors::outlier::{EngineExclusion, ScreeningOutcome};
use crate::processors::voting::FusedLine;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-page summary of how fusion went.
///
/// Built once per page after voting completes and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFusionReport {
    /// Fraction of fused lines each input engine contributed to. Every
    /// engine that supplied input has an entry; excluded engines carry 0.0.
    pub engine_coverage: BTreeMap<EngineId, f32>,
    /// Engines removed from the page before voting, with the reason.
    pub excluded_engines: Vec<EngineExclusion>,
    /// One minus the mean agreement ratio over the fused lines. 0.0 when
    /// the page produced no fused lines.
    pub disagreement_score: f32,
    /// Composite trust score in [0.0, 1.0], weighted per
    /// [`QualityScoreWeights`](crate::core::config::QualityScoreWeights).
    pub quality_score: f32,
    /// True when fewer engines survived screening than the configured
    /// minimum. Such a page carries empty fused text and a zero quality
    /// score.
    pub no_usable_engine: bool,
}

impl PageFusionReport {
    /// Returns the identifiers of the excluded engines.
    pub fn excluded_engine_ids(&self) -> BTreeSet<EngineId> {
        self.excluded_engines
            .iter()
            .map(|exclusion| exclusion.engine)
            .collect()
    }

    /// Returns the coverage for one engine, 0.0 when the engine supplied no
    /// input for the page.
    pub fn coverage(&self, engine: EngineId) -> f32 {
        self.engine_coverage.get(&engine).copied().unwrap_or(0.0)
    }
}

/// Assembles the page report from the screening outcome and the fused lines.
///
/// An empty `fused` slice is legitimate both for an unusable page and for a
/// page whose input carried no engines at all; coverage and disagreement
/// fall back to 0.0 in either case.
pub fn build_report(
    input: &PageInput,
    screening: &ScreeningOutcome,
    fused: &[FusedLine],
    config: &FusionConfig,
) -> PageFusionReport {
    let no_usable_engine = screening.surviving.len() < config.min_surviving_engines;

    let mut engine_coverage = BTreeMap::new();
    for engine in input.engines() {
        let contributed = fused
            .iter()
            .filter(|line| line.contributing_engines.contains(&engine))
            .count();
        let coverage = if fused.is_empty() {
            0.0
        } else {
            contributed as f32 / fused.len() as f32
        };
        engine_coverage.insert(engine, coverage);
    }

    let mean_agreement = if fused.is_empty() {
        0.0
    } else {
        fused.iter().map(|line| line.agreement_ratio).sum::<f32>() / fused.len() as f32
    };
    let disagreement_score = if fused.is_empty() {
        0.0
    } else {
        (1.0 - mean_agreement).clamp(0.0, 1.0)
    };

    let quality_score = if no_usable_engine {
        0.0
    } else {
        let weights = &config.quality_score_weights;
        let total = weights.total();
        if total == 0.0 {
            0.0
        } else {
            let multi_engine_fraction = if fused.is_empty() {
                0.0
            } else {
                fused
                    .iter()
                    .filter(|line| line.contributing_engines.len() >= 2)
                    .count() as f32
                    / fused.len() as f32
            };
            let outlier_term = 1.0 / (1.0 + screening.excluded.len() as f32);
            let weighted = weights.agreement * mean_agreement
                + weights.coverage * multi_engine_fraction
                + weights.outlier_penalty * outlier_term;
            (weighted / total).clamp(0.0, 1.0)
        }
    };

    PageFusionReport {
        engine_coverage,
        excluded_engines: screening.excluded.clone(),
        disagreement_score,
        quality_score,
        no_usable_engine,
    }
}
