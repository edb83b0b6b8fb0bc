//! The fusion pipeline module.
//!
//! This module provides the main fusion pipeline implementation that
//! combines outlier screening, line alignment, character voting, and report
//! assembly into a single per-page operation, plus batch orchestration and
//! run-wide summaries.

pub mod builder;
pub mod fusion;
pub mod report;
pub mod result;
pub mod stats;

// Re-export the main pipeline components for easier access
pub use builder::OcrFusionBuilder;
pub use fusion::{configure_thread_pool_once, OcrFusion};
pub use report::{build_report, PageFusionReport};
pub use result::PageFusionOutcome;
pub use stats::{RunFusionSummary, SummaryManager};
