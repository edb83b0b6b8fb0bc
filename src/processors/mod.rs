//! Fusion stage processors.
//!
//! This module holds the computational stages the page pipeline runs in
//! order: text distance measures, outlier screening, line alignment,
//! character alignment, and voting. Each stage is a pure function over its
//! inputs so the stages stay testable in isolation.
//!
//! # Modules
//!
//! * `text_distance` - Normalized edit distance measures over engine text
//! * `outlier` - Screening of engines whose page text disagrees with the rest
//! * `line_alignment` - Grouping of per-engine lines into aligned groups
//! * `char_alignment` - Star alignment of member lines into shared columns
//! * `voting` - Column-wise consensus over aligned groups

pub mod char_alignment;
pub mod line_alignment;
pub mod outlier;
pub mod text_distance;
pub mod voting;

pub use char_alignment::{star_align, AlignedChars};
pub use line_alignment::{align_lines, select_reference_engine, AlignedLineGroup};
pub use outlier::{screen_engines, EngineExclusion, ExclusionReason, ScreeningOutcome};
pub use text_distance::{distance_matrix, mean_distances, normalized_distance, text_similarity};
pub use voting::{vote_line, vote_lines, FusedLine};
