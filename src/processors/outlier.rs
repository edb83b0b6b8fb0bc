//! Page-level outlier screening over engine output.
//!
//! Before lines are aligned, each engine's whole-page text is compared
//! against every other engine's. An engine whose output sits far from all of
//! its peers (a wrong-language model, a garbled PDF text layer) would poison
//! character voting, so it is excluded from the page up front. Exclusion is
//! page-local; the same engine competes again on the next page.

use crate::core::config::FusionConfig;
use crate::domain::{EngineId, PageInput};
use crate::processors::text_distance::{distance_matrix, mean_distances};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Why an engine was excluded from fusion on a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The engine was present but produced no usable text for the page.
    /// Routine for the embedded text engine on scanned documents.
    EmptyOutput,
    /// The engine's page text sat too far from every other engine's.
    DistanceOutlier {
        /// Mean normalized distance to the other engines in the analysis.
        mean_distance: f32,
    },
}

/// Record of one engine excluded on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineExclusion {
    /// The excluded engine.
    pub engine: EngineId,
    /// Why it was excluded.
    pub reason: ExclusionReason,
}

/// Outcome of screening one page's engines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreeningOutcome {
    /// Engines that continue into alignment, in ordinal order.
    pub surviving: Vec<EngineId>,
    /// Engines removed from the page, in ordinal order.
    pub excluded: Vec<EngineExclusion>,
}

impl ScreeningOutcome {
    /// Returns true when the engine survived screening.
    pub fn survived(&self, engine: EngineId) -> bool {
        self.surviving.contains(&engine)
    }
}

/// Screens one page's engines, separating survivors from exclusions.
///
/// Engines whose page text is empty or whitespace-only are excluded first
/// and take no part in the distance analysis. Among the rest, an engine is
/// excluded when its mean normalized distance to the other engines exceeds
/// the configured threshold while at least one engine stays below it. That
/// second condition keeps a page where every engine disagrees with every
/// other from losing all of them; mutual disagreement is a signal the page
/// is hard, not that any one engine is wrong. A lone engine is never
/// excluded by distance.
pub fn screen_engines(page: &PageInput, config: &FusionConfig) -> ScreeningOutcome {
    let mut empty: Vec<EngineId> = Vec::new();
    let mut candidates: Vec<(EngineId, String)> = Vec::new();

    for engine in page.engines() {
        let text = page
            .page_text(engine)
            .unwrap_or_default();
        if text.trim().is_empty() {
            empty.push(engine);
        } else {
            candidates.push((engine, text));
        }
    }

    let threshold = config.outlier_distance_threshold;
    let mut distance_outliers: Vec<(EngineId, f32)> = Vec::new();

    if candidates.len() > 1 {
        let texts: Vec<&str> = candidates.iter().map(|(_, text)| text.as_str()).collect();
        let means = mean_distances(&distance_matrix(&texts));
        let any_inlier = means.iter().any(|mean| *mean < threshold);

        if any_inlier {
            for ((engine, _), mean) in candidates.iter().zip(&means) {
                if *mean > threshold {
                    distance_outliers.push((*engine, *mean));
                }
            }
        } else if means.iter().any(|mean| *mean > threshold) {
            debug!(
                "all {} engines exceed distance threshold {threshold}; excluding none",
                candidates.len()
            );
        }
    }

    let mut excluded: Vec<EngineExclusion> = Vec::new();
    let mut surviving: Vec<EngineId> = Vec::new();
    for engine in page.engines() {
        if empty.contains(&engine) {
            excluded.push(EngineExclusion {
                engine,
                reason: ExclusionReason::EmptyOutput,
            });
        } else if let Some((_, mean)) = distance_outliers
            .iter()
            .find(|(outlier, _)| *outlier == engine)
        {
            excluded.push(EngineExclusion {
                engine,
                reason: ExclusionReason::DistanceOutlier {
                    mean_distance: *mean,
                },
            });
        } else {
            surviving.push(engine);
        }
    }

    for exclusion in &excluded {
        debug!(
            "engine '{}' excluded from page: {:?}",
            exclusion.engine, exclusion.reason
        );
    }

    ScreeningOutcome {
        surviving,
        excluded,
    }
}
