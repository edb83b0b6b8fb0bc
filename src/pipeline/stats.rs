//! Run-wide fusion statistics helpers.
//!
//! This module defines the `RunFusionSummary` structure that folds the
//! per-page reports of a run into cross-page metrics and the
//! `SummaryManager` helper that coordinates thread-safe updates to them.
//! The fusion core itself retains no cross-page state; keeping the summary
//! out here preserves that purity.

use crate::domain::EngineId;
use crate::pipeline::report::PageFusionReport;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

/// Statistics folded from a run's page fusion reports.
#[derive(Debug, Clone, Default)]
pub struct RunFusionSummary {
    /// The total number of pages fused.
    pub pages_fused: usize,
    /// The number of pages where no usable engine survived screening.
    pub pages_without_usable_engine: usize,
    /// How often each engine was excluded across the run.
    pub exclusions_by_engine: BTreeMap<EngineId, usize>,
    /// The average quality score over all fused pages.
    pub average_quality_score: f64,
    /// The average disagreement score over all fused pages.
    pub average_disagreement_score: f64,
}

impl RunFusionSummary {
    /// Creates a new RunFusionSummary instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fraction of pages with at least one usable engine (0.0
    /// to 1.0).
    pub fn usable_page_rate(&self) -> f64 {
        if self.pages_fused == 0 {
            0.0
        } else {
            (self.pages_fused - self.pages_without_usable_engine) as f64
                / self.pages_fused as f64
        }
    }

    /// Returns the total number of engine exclusions across the run.
    pub fn engines_excluded(&self) -> usize {
        self.exclusions_by_engine.values().sum()
    }

    /// Returns the average number of engine exclusions per page.
    pub fn exclusions_per_page(&self) -> f64 {
        if self.pages_fused == 0 {
            0.0
        } else {
            self.engines_excluded() as f64 / self.pages_fused as f64
        }
    }
}

impl fmt::Display for RunFusionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fusion Run Summary:")?;
        writeln!(f, "  Pages fused: {}", self.pages_fused)?;
        writeln!(
            f,
            "  Usable pages: {} ({:.1}%)",
            self.pages_fused - self.pages_without_usable_engine,
            self.usable_page_rate() * 100.0
        )?;
        writeln!(
            f,
            "  Engines excluded: {} ({:.2} per page)",
            self.engines_excluded(),
            self.exclusions_per_page()
        )?;
        for (engine, count) in &self.exclusions_by_engine {
            writeln!(f, "    {engine}: {count}")?;
        }
        writeln!(
            f,
            "  Average quality score: {:.3}",
            self.average_quality_score
        )?;
        writeln!(
            f,
            "  Average disagreement score: {:.3}",
            self.average_disagreement_score
        )?;
        Ok(())
    }
}

/// Thread-safe manager for folding page reports into a run summary.
#[derive(Debug, Default)]
pub struct SummaryManager {
    /// Shared summary state guarded by a mutex.
    summary: Mutex<RunFusionSummary>,
}

impl SummaryManager {
    /// Creates a new `SummaryManager` instance with zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current summary snapshot.
    pub fn get_summary(&self) -> RunFusionSummary {
        self.summary.lock().unwrap().clone()
    }

    /// Folds one page's report into the tracked metrics.
    pub fn record_page(&self, report: &PageFusionReport) {
        let mut summary = self.summary.lock().unwrap();

        let previous_total = summary.pages_fused;
        let new_total = previous_total + 1;

        summary.pages_fused = new_total;
        if report.no_usable_engine {
            summary.pages_without_usable_engine += 1;
        }
        for exclusion in &report.excluded_engines {
            *summary
                .exclusions_by_engine
                .entry(exclusion.engine)
                .or_insert(0) += 1;
        }

        let accumulated_quality = summary.average_quality_score * previous_total as f64;
        summary.average_quality_score =
            (accumulated_quality + f64::from(report.quality_score)) / new_total as f64;

        let accumulated_disagreement =
            summary.average_disagreement_score * previous_total as f64;
        summary.average_disagreement_score = (accumulated_disagreement
            + f64::from(report.disagreement_score))
            / new_total as f64;
    }

    /// Resets the tracked metrics to their default state.
    pub fn reset_summary(&self) {
        let mut summary = self.summary.lock().unwrap();
        *summary = RunFusionSummary::default();
    }
}
