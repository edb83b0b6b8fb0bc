//! Result types for page fusion.

use crate::domain::EngineId;
use crate::pipeline::report::PageFusionReport;
use crate::processors::voting::FusedLine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything fusion produces for one page.
///
/// Contains the fused transcription, the per-line consensus records it was
/// assembled from, and the report downstream escalation logic consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFusionOutcome {
    /// Index of the page in a batch (0 for single page fusion).
    pub index: usize,
    /// The fused lines joined in group order with newlines. Empty when no
    /// engine was usable.
    pub fused_text: String,
    /// Per-line consensus records in reading order.
    pub lines: Vec<FusedLine>,
    /// The page report.
    pub report: PageFusionReport,
}

impl PageFusionOutcome {
    /// Returns the number of fused lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns an iterator over lines that more than one engine contributed
    /// to.
    pub fn corroborated_lines(&self) -> impl Iterator<Item = &FusedLine> {
        self.lines
            .iter()
            .filter(|line| line.contributing_engines.len() >= 2)
    }

    /// Returns the mean agreement ratio over the fused lines, or `None` for
    /// a page with no lines.
    pub fn mean_agreement(&self) -> Option<f32> {
        if self.lines.is_empty() {
            None
        } else {
            let sum: f32 = self.lines.iter().map(|line| line.agreement_ratio).sum();
            Some(sum / self.lines.len() as f32)
        }
    }

    /// Returns true when the engine contributed to at least one fused line.
    pub fn engine_contributed(&self, engine: EngineId) -> bool {
        self.lines
            .iter()
            .any(|line| line.contributing_engines.contains(&engine))
    }
}

impl fmt::Display for PageFusionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Page index: {}", self.index)?;
        writeln!(f, "Fused lines: {}", self.lines.len())?;
        writeln!(f, "Quality score: {:.3}", self.report.quality_score)?;
        writeln!(
            f,
            "Disagreement score: {:.3}",
            self.report.disagreement_score
        )?;

        if self.report.no_usable_engine {
            writeln!(f, "No usable engine survived screening")?;
        }

        if self.report.excluded_engines.is_empty() {
            writeln!(f, "Excluded engines: none")?;
        } else {
            writeln!(f, "Excluded engines:")?;
            for exclusion in &self.report.excluded_engines {
                writeln!(f, "  {} ({:?})", exclusion.engine, exclusion.reason)?;
            }
        }

        if !self.lines.is_empty() {
            writeln!(f, "Lines (agreement -> text):")?;
            for line in &self.lines {
                writeln!(f, "  {:.2} -> '{}'", line.agreement_ratio, line.text)?;
            }
        }

        Ok(())
    }
}
