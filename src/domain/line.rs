//! Line-level recognition results and the per-page input bundle.

use crate::domain::engine::EngineId;
use crate::domain::geometry::BoundingBox;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single recognized line of text from one engine.
///
/// Line results are immutable once produced; fusion never rewrites them, it
/// only selects between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResult {
    /// The engine that produced this line.
    pub engine: EngineId,
    /// Zero-based position of the line in the engine's own reading order.
    pub line_index: u32,
    /// The recognized text.
    pub text: String,
    /// Engine-reported confidence in [0.0, 1.0], when the engine provides
    /// one. Absent confidence stays absent; it is never defaulted to a
    /// number, because "unknown" and "certain of nothing" are different
    /// statements.
    pub confidence: Option<f32>,
    /// Bounding box of the line in page coordinates, when available.
    pub bbox: Option<BoundingBox>,
}

impl LineResult {
    /// Creates a line result with no confidence and no bounding box.
    pub fn new(engine: EngineId, line_index: u32, text: impl Into<String>) -> Self {
        Self {
            engine,
            line_index,
            text: text.into(),
            confidence: None,
            bbox: None,
        }
    }

    /// Attaches an engine-reported confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Attaches a bounding box.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// All line results for one page image, grouped by engine.
///
/// An engine that contributed an empty line list is present with zero lines;
/// that is a different statement from the engine being absent from the map
/// entirely (it never ran, or its adapter failed). Both situations are legal
/// inputs.
///
/// Engines are stored in a `BTreeMap` so that every iteration over them is
/// in stable ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    lines: BTreeMap<EngineId, Vec<LineResult>>,
}

impl PageInput {
    /// Creates an empty page input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one engine's lines to the page.
    ///
    /// # Panics
    ///
    /// Panics if the engine was already inserted, if any line's `engine`
    /// field disagrees with `engine`, if `line_index` values are not strictly
    /// increasing, or if a confidence is outside [0.0, 1.0]. These are
    /// programming errors in the adapter layer and are not silently
    /// tolerated.
    pub fn insert_engine(&mut self, engine: EngineId, lines: Vec<LineResult>) {
        assert!(
            !self.lines.contains_key(&engine),
            "engine '{engine}' inserted twice into one page input"
        );
        let mut previous: Option<u32> = None;
        for line in &lines {
            assert!(
                line.engine == engine,
                "line tagged '{}' inserted under engine '{engine}'",
                line.engine
            );
            if let Some(prev) = previous {
                assert!(
                    line.line_index > prev,
                    "engine '{engine}' line_index must be strictly increasing, got {} after {prev}",
                    line.line_index
                );
            }
            if let Some(confidence) = line.confidence {
                assert!(
                    (0.0..=1.0).contains(&confidence),
                    "engine '{engine}' line {} confidence {confidence} outside [0.0, 1.0]",
                    line.line_index
                );
            }
            previous = Some(line.line_index);
        }
        self.lines.insert(engine, lines);
    }

    /// Builder-style variant of [`insert_engine`](Self::insert_engine).
    ///
    /// # Panics
    ///
    /// Same contract as `insert_engine`.
    pub fn with_engine(mut self, engine: EngineId, lines: Vec<LineResult>) -> Self {
        self.insert_engine(engine, lines);
        self
    }

    /// Returns the engines present on this page, in ordinal order.
    pub fn engines(&self) -> impl Iterator<Item = EngineId> + '_ {
        self.lines.keys().copied()
    }

    /// Returns the number of engines present on this page.
    pub fn engine_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns true when the engine contributed to this page (possibly with
    /// zero lines).
    pub fn contains(&self, engine: EngineId) -> bool {
        self.lines.contains_key(&engine)
    }

    /// Returns the engine's lines, or `None` when the engine is absent.
    pub fn lines(&self, engine: EngineId) -> Option<&[LineResult]> {
        self.lines.get(&engine).map(|lines| lines.as_slice())
    }

    /// Returns the engine's whole-page text, lines joined with newlines, or
    /// `None` when the engine is absent.
    pub fn page_text(&self, engine: EngineId) -> Option<String> {
        self.lines.get(&engine).map(|lines| {
            lines
                .iter()
                .map(|line| line.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    /// Returns true when no engine is present at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(engine: EngineId, index: u32, text: &str) -> LineResult {
        LineResult::new(engine, index, text)
    }

    #[test]
    fn absent_engine_is_distinguishable_from_empty_engine() {
        let page = PageInput::new().with_engine(EngineId::EmbeddedText, vec![]);
        assert!(page.contains(EngineId::EmbeddedText));
        assert!(!page.contains(EngineId::Neural));
        assert_eq!(page.lines(EngineId::EmbeddedText), Some(&[][..]));
        assert_eq!(page.lines(EngineId::Neural), None);
        assert!(!page.is_empty());
        assert!(PageInput::new().is_empty());
    }

    #[test]
    fn engines_iterate_in_ordinal_order() {
        let page = PageInput::new()
            .with_engine(EngineId::EmbeddedText, vec![])
            .with_engine(EngineId::Classical, vec![])
            .with_engine(EngineId::Neural, vec![]);
        let engines: Vec<_> = page.engines().collect();
        assert_eq!(
            engines,
            vec![EngineId::Classical, EngineId::Neural, EngineId::EmbeddedText]
        );
    }

    #[test]
    fn page_text_joins_lines_with_newlines() {
        let page = PageInput::new().with_engine(
            EngineId::Neural,
            vec![
                line(EngineId::Neural, 0, "INVOICE"),
                line(EngineId::Neural, 1, "Total: 40.00"),
            ],
        );
        assert_eq!(
            page.page_text(EngineId::Neural).as_deref(),
            Some("INVOICE\nTotal: 40.00")
        );
        assert_eq!(page.page_text(EngineId::Classical), None);
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn non_increasing_line_index_panics() {
        let mut page = PageInput::new();
        page.insert_engine(
            EngineId::Classical,
            vec![
                line(EngineId::Classical, 0, "a"),
                line(EngineId::Classical, 2, "b"),
                line(EngineId::Classical, 2, "c"),
            ],
        );
    }

    #[test]
    #[should_panic(expected = "inserted twice")]
    fn duplicate_engine_insert_panics() {
        let mut page = PageInput::new();
        page.insert_engine(EngineId::Classical, vec![]);
        page.insert_engine(EngineId::Classical, vec![]);
    }

    #[test]
    #[should_panic(expected = "inserted under engine")]
    fn mismatched_engine_tag_panics() {
        let mut page = PageInput::new();
        page.insert_engine(EngineId::Classical, vec![line(EngineId::Neural, 0, "a")]);
    }

    #[test]
    #[should_panic(expected = "outside [0.0, 1.0]")]
    fn out_of_range_confidence_panics() {
        let mut page = PageInput::new();
        page.insert_engine(
            EngineId::Neural,
            vec![line(EngineId::Neural, 0, "a").with_confidence(1.5)],
        );
    }

    #[test]
    fn sparse_line_indices_are_accepted() {
        let page = PageInput::new().with_engine(
            EngineId::PlatformVision,
            vec![
                line(EngineId::PlatformVision, 3, "x"),
                line(EngineId::PlatformVision, 7, "y"),
            ],
        );
        assert_eq!(page.lines(EngineId::PlatformVision).unwrap().len(), 2);
    }
}
