//! Domain-level structures shared across the fusion pipeline.
//!
//! This module groups the value types that fusion operates on: engine
//! identity, line-level recognition results, the per-page input bundle, and
//! the geometric primitives carried alongside text.

pub mod engine;
pub mod geometry;
pub mod line;

pub use engine::EngineId;
pub use geometry::{BoundingBox, Point};
pub use line::{LineResult, PageInput};
