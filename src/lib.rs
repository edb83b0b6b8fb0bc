//! # OCR Fusion
//!
//! A Rust library that reconciles the outputs of several independent OCR
//! engines into a single best-estimate page transcription, together with
//! the confidence and disagreement signals downstream stages need to decide
//! whether a page should be re-processed.
//!
//! ## Features
//!
//! - Page-level outlier screening to drop garbage engine runs
//! - Line alignment across engines that disagree on line segmentation
//! - Character-level voting with a deterministic tie-break cascade
//! - Per-page quality reports for escalation and retry decisions
//! - Batch fusion with automatic parallel fan-out over pages
//!
//! ## Components
//!
//! - **Outlier Detector**: Exclude engines whose page output sits far from
//!   every peer's
//! - **Line Aligner**: Group lines that represent the same source text
//! - **Character Voting Engine**: Fuse each group into one consensus line
//! - **Fusion Report Builder**: Summarize coverage, disagreement, and
//!   quality per page
//!
//! ## Modules
//!
//! * [`core`] - Configuration, error handling, and the engine adapter
//!   boundary
//! * [`domain`] - Domain types: engines, lines, page inputs, geometry
//! * [`pipeline`] - The page fusion pipeline, batch orchestration, and run
//!   summaries
//! * [`processors`] - The fusion stages: distance, screening, alignment,
//!   voting
//!
//! ## Quick Start
//!
//! ### Fusing One Page
//!
//! ```rust
//! use ocr_fusion::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fusion = OcrFusionBuilder::new()
//!     .outlier_distance_threshold(0.6)
//!     .build()?;
//!
//! let page = PageInput::new()
//!     .with_engine(
//!         EngineId::Classical,
//!         vec![LineResult::new(EngineId::Classical, 0, "SKILL 8")],
//!     )
//!     .with_engine(
//!         EngineId::Neural,
//!         vec![LineResult::new(EngineId::Neural, 0, "SKILL 8")],
//!     );
//!
//! let outcome = fusion.fuse_page(&page);
//! assert_eq!(outcome.fused_text, "SKILL 8");
//! assert!(!outcome.report.no_usable_engine);
//! # Ok(())
//! # }
//! ```
//!
//! ### JSON Configuration
//!
//! ```rust
//! use ocr_fusion::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FusionConfig::from_json_str(
//!     r#"{
//!         "outlier_distance_threshold": 0.7,
//!         "engine_priority_order": ["neural", "classical"]
//!     }"#,
//! )?;
//! let fusion = OcrFusion::new(config)?;
//! assert_eq!(fusion.config().outlier_distance_threshold, 0.7);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;

pub use crate::core::init_tracing;

/// Commonly used types for fusing engine output.
pub mod prelude {
    // Fusion Pipeline (essential)
    pub use crate::pipeline::{
        OcrFusion, OcrFusionBuilder, PageFusionOutcome, PageFusionReport, RunFusionSummary,
        SummaryManager,
    };

    // Domain Types (essential)
    pub use crate::domain::{BoundingBox, EngineId, LineResult, PageInput};

    // Configuration
    pub use crate::core::config::{FusionConfig, ParallelPolicy, QualityScoreWeights};

    // Consensus Records
    pub use crate::processors::{EngineExclusion, ExclusionReason, FusedLine};

    // Error Handling (essential)
    pub use crate::core::{FusionError, FusionResult};
}
