//! The page fusion pipeline.
//!
//! [`OcrFusion`] wires the fusion stages together: outlier screening, line
//! alignment, character voting, and report assembly. Fusing one page is a
//! pure computation over in-memory data; batches of pages are independent
//! and fan out over a thread pool when the batch is large enough.

use crate::core::config::{FusionConfig, ParallelPolicy};
use crate::core::errors::{FusionError, FusionResult};
use crate::core::traits::{collect_page_input, EngineProvider, PageRef};
use crate::domain::PageInput;
use crate::pipeline::report::build_report;
use crate::pipeline::result::PageFusionOutcome;
use crate::pipeline::stats::SummaryManager;
use crate::processors::line_alignment::align_lines;
use crate::processors::outlier::screen_engines;
use crate::processors::voting::vote_lines;
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::Once;
use tracing::{debug, info, warn};

static THREAD_POOL_INIT: Once = Once::new();

/// Applies the policy's thread cap to the global thread pool, once per
/// process.
///
/// Later calls are no-ops; rayon's global pool cannot be resized after it
/// is built. A policy without a thread cap leaves the pool untouched.
pub fn configure_thread_pool_once(policy: &ParallelPolicy) {
    if let Some(max_threads) = policy.max_threads {
        THREAD_POOL_INIT.call_once(|| {
            if let Err(error) = rayon::ThreadPoolBuilder::new()
                .num_threads(max_threads)
                .build_global()
            {
                warn!("failed to configure global thread pool: {error}");
            }
        });
    }
}

/// Multi-engine fusion over page inputs.
///
/// Holds the run configuration, which stays immutable for the lifetime of
/// the instance so that repeated calls over identical inputs produce
/// byte-identical output.
#[derive(Debug, Clone)]
pub struct OcrFusion {
    config: FusionConfig,
}

impl OcrFusion {
    /// Creates a fusion pipeline from a configuration.
    ///
    /// Out-of-range thresholds and weights are clamped into their domains.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `engine_priority_order` lists the
    /// same engine twice.
    pub fn new(config: FusionConfig) -> FusionResult<Self> {
        let mut seen = BTreeSet::new();
        for engine in &config.engine_priority_order {
            if !seen.insert(*engine) {
                return Err(FusionError::config_error(format!(
                    "engine '{engine}' listed twice in engine_priority_order"
                )));
            }
        }
        let config = config.validated();
        configure_thread_pool_once(&config.parallel_policy);
        info!("initialized fusion pipeline with config: {:?}", config);
        Ok(Self { config })
    }

    /// Creates a fusion pipeline with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: FusionConfig::default(),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuses one page.
    ///
    /// Always returns an outcome: data quality problems surface as report
    /// fields, never as errors. A page where fewer engines survive
    /// screening than `min_surviving_engines` yields empty fused text, a
    /// zero quality score, and `no_usable_engine` set in the report.
    pub fn fuse_page(&self, page: &PageInput) -> PageFusionOutcome {
        self.fuse_page_at(page, 0)
    }

    /// Fuses a batch of pages, in input order.
    ///
    /// The parallel policy decides whether the batch fans out over the
    /// thread pool. Pages share nothing but the read-only configuration, so
    /// both execution modes produce identical outcomes.
    pub fn fuse_pages(&self, pages: &[PageInput]) -> Vec<PageFusionOutcome> {
        let strategy = self.config.parallel_policy.strategy();
        let use_parallel = strategy.should_use_parallel(pages.len());

        let indexed: Vec<(usize, &PageInput)> = pages.iter().enumerate().collect();
        let mut outcomes: Vec<(usize, PageFusionOutcome)> = if use_parallel {
            debug!("fusing {} pages in parallel", pages.len());
            indexed
                .into_par_iter()
                .map(|(index, page)| (index, self.fuse_page_at(page, index)))
                .collect()
        } else {
            debug!("fusing {} pages sequentially", pages.len());
            indexed
                .into_iter()
                .map(|(index, page)| (index, self.fuse_page_at(page, index)))
                .collect()
        };

        outcomes.sort_by_key(|(index, _)| *index);
        let outcomes: Vec<PageFusionOutcome> =
            outcomes.into_iter().map(|(_, outcome)| outcome).collect();

        let unusable = outcomes
            .iter()
            .filter(|outcome| outcome.report.no_usable_engine)
            .count();
        info!(
            "fused {} pages, {} without a usable engine",
            outcomes.len(),
            unusable
        );
        outcomes
    }

    /// Fuses a batch of pages and folds every report into the summary.
    pub fn fuse_pages_with_summary(
        &self,
        pages: &[PageInput],
        summary: &SummaryManager,
    ) -> Vec<PageFusionOutcome> {
        let outcomes = self.fuse_pages(pages);
        for outcome in &outcomes {
            summary.record_page(&outcome.report);
        }
        outcomes
    }

    /// Collects engine output for one page reference and fuses it.
    ///
    /// Providers that fail are logged and omitted from the input set, which
    /// is the same treatment as an engine that never ran.
    pub fn fuse_from_providers(
        &self,
        providers: &[Box<dyn EngineProvider>],
        page: &PageRef,
    ) -> PageFusionOutcome {
        let input = collect_page_input(providers, page);
        self.fuse_page(&input)
    }

    fn fuse_page_at(&self, page: &PageInput, index: usize) -> PageFusionOutcome {
        let screening = screen_engines(page, &self.config);
        let usable = screening.surviving.len() >= self.config.min_surviving_engines;

        let lines = if usable {
            let groups = align_lines(page, &screening.surviving, &self.config);
            vote_lines(&groups, &self.config)
        } else {
            debug!(
                "page {index}: {} engines survived screening, {} required",
                screening.surviving.len(),
                self.config.min_surviving_engines
            );
            Vec::new()
        };

        let report = build_report(page, &screening, &lines, &self.config);
        let fused_text = lines.iter().map(|line| line.text.as_str()).join("\n");
        debug!(
            "page {index}: {} fused lines, quality {:.3}",
            lines.len(),
            report.quality_score
        );

        PageFusionOutcome {
            index,
            fused_text,
            lines,
            report,
        }
    }
}

impl Default for OcrFusion {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ParallelPolicy;
    use crate::domain::{EngineId, LineResult};
    use crate::processors::outlier::ExclusionReason;

    fn lines(engine: EngineId, texts: &[&str]) -> Vec<LineResult> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| LineResult::new(engine, index as u32, *text))
            .collect()
    }

    fn agreeing_page() -> PageInput {
        PageInput::new()
            .with_engine(
                EngineId::Classical,
                lines(EngineId::Classical, &["SKILL 8", "STAMINA 14"]),
            )
            .with_engine(
                EngineId::Neural,
                lines(EngineId::Neural, &["SKILL 8", "STAMINA 14"]),
            )
            .with_engine(
                EngineId::PlatformVision,
                lines(EngineId::PlatformVision, &["SKlLL 8", "STAMINA 14"]),
            )
    }

    #[test]
    fn majority_overrules_a_single_engine_typo() {
        let fusion = OcrFusion::with_defaults();
        let outcome = fusion.fuse_page(&agreeing_page());

        assert_eq!(outcome.fused_text, "SKILL 8\nSTAMINA 14");
        assert!(outcome.report.excluded_engines.is_empty());
        assert!((outcome.lines[0].agreement_ratio - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(outcome.lines[1].agreement_ratio, 1.0);
    }

    #[test]
    fn repeated_fusion_is_byte_identical() {
        let fusion = OcrFusion::with_defaults();
        let page = agreeing_page();

        let first = fusion.fuse_page(&page);
        let second = fusion.fuse_page(&page);
        assert_eq!(first, second);
        assert_eq!(first.fused_text.as_bytes(), second.fused_text.as_bytes());
    }

    #[test]
    fn single_engine_page_passes_through_unchanged() {
        let fusion = OcrFusion::with_defaults();
        let page = PageInput::new().with_engine(
            EngineId::Neural,
            lines(EngineId::Neural, &["first line", "second line", "third"]),
        );
        let outcome = fusion.fuse_page(&page);

        assert_eq!(outcome.fused_text, "first line\nsecond line\nthird");
        assert!(outcome
            .lines
            .iter()
            .all(|line| line.agreement_ratio == 1.0));
        assert_eq!(outcome.report.disagreement_score, 0.0);
        assert!(outcome.report.excluded_engines.is_empty());
        assert!(!outcome.report.no_usable_engine);
    }

    #[test]
    fn garbled_engine_is_excluded_and_agreement_restored() {
        let fusion = OcrFusion::with_defaults();
        let page = PageInput::new()
            .with_engine(
                EngineId::Classical,
                lines(EngineId::Classical, &["Turn to 71"]),
            )
            .with_engine(
                EngineId::Neural,
                lines(EngineId::Neural, &["zzzzqqqqxxxx####"]),
            )
            .with_engine(
                EngineId::PlatformVision,
                lines(EngineId::PlatformVision, &["Turn to 71"]),
            );
        let outcome = fusion.fuse_page(&page);

        assert_eq!(outcome.report.excluded_engines.len(), 1);
        let exclusion = &outcome.report.excluded_engines[0];
        assert_eq!(exclusion.engine, EngineId::Neural);
        assert!(matches!(
            exclusion.reason,
            ExclusionReason::DistanceOutlier { .. }
        ));
        assert_eq!(outcome.fused_text, "Turn to 71");
        assert_eq!(outcome.report.disagreement_score, 0.0);
    }

    #[test]
    fn empty_text_layer_is_flagged_as_empty_not_outlier() {
        let fusion = OcrFusion::with_defaults();
        let page = PageInput::new()
            .with_engine(
                EngineId::Classical,
                lines(EngineId::Classical, &["The cave mouth yawns"]),
            )
            .with_engine(
                EngineId::Neural,
                lines(EngineId::Neural, &["The cave mouth yawns"]),
            )
            .with_engine(EngineId::EmbeddedText, vec![]);
        let outcome = fusion.fuse_page(&page);

        assert_eq!(outcome.report.excluded_engines.len(), 1);
        let exclusion = &outcome.report.excluded_engines[0];
        assert_eq!(exclusion.engine, EngineId::EmbeddedText);
        assert_eq!(exclusion.reason, ExclusionReason::EmptyOutput);
        assert_eq!(outcome.report.coverage(EngineId::EmbeddedText), 0.0);
        assert_eq!(outcome.fused_text, "The cave mouth yawns");
        assert_eq!(outcome.line_count(), 1);
        assert!(outcome.engine_contributed(EngineId::Classical));
        assert!(!outcome.engine_contributed(EngineId::EmbeddedText));
    }

    #[test]
    fn mutual_disagreement_excludes_nobody() {
        let fusion = OcrFusion::with_defaults();
        let page = PageInput::new()
            .with_engine(
                EngineId::Classical,
                lines(EngineId::Classical, &["aaaaaaaaaa"]),
            )
            .with_engine(EngineId::Neural, lines(EngineId::Neural, &["bbbbbbbbbb"]))
            .with_engine(
                EngineId::PlatformVision,
                lines(EngineId::PlatformVision, &["cccccccccc"]),
            );
        let outcome = fusion.fuse_page(&page);

        assert!(outcome.report.excluded_engines.is_empty());
        assert!(!outcome.report.no_usable_engine);
        assert!(!outcome.fused_text.is_empty());
    }

    #[test]
    fn page_without_engines_reports_no_usable_engine() {
        let fusion = OcrFusion::with_defaults();
        let outcome = fusion.fuse_page(&PageInput::new());

        assert!(outcome.report.no_usable_engine);
        assert_eq!(outcome.fused_text, "");
        assert_eq!(outcome.report.quality_score, 0.0);
        assert!(outcome.lines.is_empty());
    }

    #[test]
    fn all_empty_engines_report_no_usable_engine() {
        let fusion = OcrFusion::with_defaults();
        let page = PageInput::new()
            .with_engine(EngineId::Classical, vec![])
            .with_engine(EngineId::EmbeddedText, vec![]);
        let outcome = fusion.fuse_page(&page);

        assert!(outcome.report.no_usable_engine);
        assert_eq!(outcome.report.excluded_engines.len(), 2);
        assert!(outcome
            .report
            .excluded_engines
            .iter()
            .all(|exclusion| exclusion.reason == ExclusionReason::EmptyOutput));
    }

    #[test]
    fn engine_pushed_far_from_peers_becomes_excluded() {
        let fusion = OcrFusion::with_defaults();
        let near = PageInput::new()
            .with_engine(
                EngineId::Classical,
                lines(EngineId::Classical, &["abcdefghij"]),
            )
            .with_engine(EngineId::Neural, lines(EngineId::Neural, &["abcdefghij"]))
            .with_engine(
                EngineId::PlatformVision,
                lines(EngineId::PlatformVision, &["abcdefghix"]),
            );
        let outcome = fusion.fuse_page(&near);
        assert!(outcome.report.excluded_engines.is_empty());

        let far = PageInput::new()
            .with_engine(
                EngineId::Classical,
                lines(EngineId::Classical, &["abcdefghij"]),
            )
            .with_engine(EngineId::Neural, lines(EngineId::Neural, &["abcdefghij"]))
            .with_engine(
                EngineId::PlatformVision,
                lines(EngineId::PlatformVision, &["zzzzzzzzzz"]),
            );
        let outcome = fusion.fuse_page(&far);
        assert_eq!(
            outcome.report.excluded_engine_ids().into_iter().collect::<Vec<_>>(),
            vec![EngineId::PlatformVision]
        );
    }

    #[test]
    fn coverage_stays_within_bounds_across_engines() {
        let fusion = OcrFusion::with_defaults();
        let page = PageInput::new()
            .with_engine(
                EngineId::Classical,
                lines(EngineId::Classical, &["alpha", "beta", "gamma"]),
            )
            .with_engine(EngineId::Neural, lines(EngineId::Neural, &["alpha"]));
        let outcome = fusion.fuse_page(&page);

        for coverage in outcome.report.engine_coverage.values() {
            assert!((0.0..=1.0).contains(coverage));
        }
        assert_eq!(outcome.report.coverage(EngineId::Classical), 1.0);
    }

    #[test]
    fn parallel_and_sequential_batches_agree() {
        let pages: Vec<PageInput> = (0..6)
            .map(|page_number| {
                let text = format!("page body {page_number}");
                PageInput::new()
                    .with_engine(
                        EngineId::Classical,
                        vec![LineResult::new(EngineId::Classical, 0, text.clone())],
                    )
                    .with_engine(
                        EngineId::Neural,
                        vec![LineResult::new(EngineId::Neural, 0, text)],
                    )
            })
            .collect();

        let sequential = OcrFusion::new(FusionConfig::default().with_parallel_policy(
            ParallelPolicy::new().with_page_threshold(usize::MAX),
        ))
        .unwrap();
        let parallel = OcrFusion::new(
            FusionConfig::default()
                .with_parallel_policy(ParallelPolicy::new().with_page_threshold(0)),
        )
        .unwrap();

        let sequential_outcomes = sequential.fuse_pages(&pages);
        let parallel_outcomes = parallel.fuse_pages(&pages);

        assert_eq!(sequential_outcomes, parallel_outcomes);
        for (index, outcome) in parallel_outcomes.iter().enumerate() {
            assert_eq!(outcome.index, index);
            assert_eq!(outcome.fused_text, format!("page body {index}"));
        }
    }

    #[test]
    fn batch_summary_folds_every_page() {
        let fusion = OcrFusion::with_defaults();
        let pages = vec![agreeing_page(), PageInput::new()];
        let summary_manager = SummaryManager::new();

        fusion.fuse_pages_with_summary(&pages, &summary_manager);
        let summary = summary_manager.get_summary();

        assert_eq!(summary.pages_fused, 2);
        assert_eq!(summary.pages_without_usable_engine, 1);
    }

    #[test]
    fn duplicate_priority_entry_is_rejected() {
        let config = FusionConfig::default().with_engine_priority_order(vec![
            EngineId::Neural,
            EngineId::Classical,
            EngineId::Neural,
        ]);
        assert!(OcrFusion::new(config).is_err());
    }
}
