//! Capability traits at the boundary between engines and fusion.

use crate::core::errors::FusionResult;
use crate::domain::{EngineId, LineResult, PageInput};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Opaque reference to one page image handed to engine adapters.
///
/// The fusion core performs no image handling, so a page is identified by
/// document id and page number plus an optional path to rendered pixels that
/// adapters load however they wish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRef {
    /// Identifier of the source document.
    pub document_id: String,
    /// Zero-based page number within the document.
    pub page_number: u32,
    /// Path to the rendered page image, when one exists.
    #[serde(default)]
    pub image_path: Option<PathBuf>,
}

impl PageRef {
    /// Creates a page reference without an image path.
    pub fn new(document_id: impl Into<String>, page_number: u32) -> Self {
        Self {
            document_id: document_id.into(),
            page_number,
            image_path: None,
        }
    }

    /// Attaches the path of the rendered page image.
    pub fn with_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }
}

/// A source of line-level recognition results for page images.
///
/// Fusion never talks to a concrete engine; it sees engines only through
/// this trait. Implementations own their process management, timeouts, and
/// retries. By the time `produce` returns, the engine either has normalized
/// lines for the page or a terminal error for it.
pub trait EngineProvider: Send + Sync {
    /// Returns the identity of this engine.
    fn engine_id(&self) -> EngineId;

    /// Produces this engine's line results for one page.
    ///
    /// Returned lines must be in reading order with strictly increasing
    /// `line_index` values. Returning an empty list is a valid statement
    /// that the engine found no text on the page.
    fn produce(&self, page: &PageRef) -> FusionResult<Vec<LineResult>>;
}

/// Collects one page's results from every available engine adapter.
///
/// A provider failure is not fatal to the page: the failing engine is logged
/// and omitted from the input, which downstream fusion treats the same as an
/// engine that never ran. A duplicate provider for an engine already
/// collected is skipped with a warning.
///
/// # Panics
///
/// Panics if a provider returns lines that violate the [`PageInput`]
/// contract (wrong engine tag, non-increasing `line_index`, confidence
/// outside [0.0, 1.0]).
pub fn collect_page_input(providers: &[Box<dyn EngineProvider>], page: &PageRef) -> PageInput {
    let mut input = PageInput::new();
    for provider in providers {
        let engine = provider.engine_id();
        if input.contains(engine) {
            warn!(
                "duplicate provider for engine '{engine}' on page {} of '{}', keeping the first",
                page.page_number, page.document_id
            );
            continue;
        }
        match provider.produce(page) {
            Ok(lines) => {
                debug!(
                    "engine '{engine}' produced {} lines for page {} of '{}'",
                    lines.len(),
                    page.page_number,
                    page.document_id
                );
                input.insert_engine(engine, lines);
            }
            Err(error) => {
                warn!(
                    "engine '{engine}' failed on page {} of '{}', omitting it: {error}",
                    page.page_number, page.document_id
                );
            }
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::FusionError;

    struct FixedProvider {
        engine: EngineId,
        lines: Vec<&'static str>,
    }

    impl EngineProvider for FixedProvider {
        fn engine_id(&self) -> EngineId {
            self.engine
        }

        fn produce(&self, _page: &PageRef) -> FusionResult<Vec<LineResult>> {
            Ok(self
                .lines
                .iter()
                .enumerate()
                .map(|(index, text)| LineResult::new(self.engine, index as u32, *text))
                .collect())
        }
    }

    struct FailingProvider {
        engine: EngineId,
    }

    impl EngineProvider for FailingProvider {
        fn engine_id(&self) -> EngineId {
            self.engine
        }

        fn produce(&self, _page: &PageRef) -> FusionResult<Vec<LineResult>> {
            Err(FusionError::engine_failure(
                self.engine.name(),
                "backend unavailable",
            ))
        }
    }

    #[test]
    fn collects_lines_from_every_working_provider() {
        let providers: Vec<Box<dyn EngineProvider>> = vec![
            Box::new(FixedProvider {
                engine: EngineId::Classical,
                lines: vec!["alpha", "beta"],
            }),
            Box::new(FixedProvider {
                engine: EngineId::Neural,
                lines: vec!["alpha"],
            }),
        ];
        let page = PageRef::new("doc-1", 0);

        let input = collect_page_input(&providers, &page);
        assert_eq!(input.engine_count(), 2);
        assert_eq!(input.lines(EngineId::Classical).unwrap().len(), 2);
        assert_eq!(input.lines(EngineId::Neural).unwrap().len(), 1);
    }

    #[test]
    fn failed_provider_is_omitted_not_empty() {
        let providers: Vec<Box<dyn EngineProvider>> = vec![
            Box::new(FixedProvider {
                engine: EngineId::Classical,
                lines: vec!["alpha"],
            }),
            Box::new(FailingProvider {
                engine: EngineId::PlatformVision,
            }),
        ];
        let page = PageRef::new("doc-1", 3);

        let input = collect_page_input(&providers, &page);
        assert!(input.contains(EngineId::Classical));
        assert!(!input.contains(EngineId::PlatformVision));
    }

    #[test]
    fn page_ref_carries_an_optional_image_path() {
        let page = PageRef::new("doc-9", 12).with_image_path("/renders/doc-9/p12.png");
        assert_eq!(page.document_id, "doc-9");
        assert_eq!(page.page_number, 12);
        assert_eq!(
            page.image_path.as_deref(),
            Some(std::path::Path::new("/renders/doc-9/p12.png"))
        );
    }

    #[test]
    fn duplicate_provider_keeps_the_first() {
        let providers: Vec<Box<dyn EngineProvider>> = vec![
            Box::new(FixedProvider {
                engine: EngineId::Neural,
                lines: vec!["first"],
            }),
            Box::new(FixedProvider {
                engine: EngineId::Neural,
                lines: vec!["second"],
            }),
        ];
        let page = PageRef::new("doc-2", 0);

        let input = collect_page_input(&providers, &page);
        assert_eq!(input.engine_count(), 1);
        assert_eq!(input.lines(EngineId::Neural).unwrap()[0].text, "first");
    }
}
