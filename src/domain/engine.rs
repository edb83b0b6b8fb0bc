//! Engine identity for the closed set of recognition backends.

use crate::core::errors::FusionError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifies one of the recognition engines whose output can be fused.
///
/// The set is closed on purpose: tie-breaking throughout the pipeline relies
/// on a stable total order over engines, which an open registry could not
/// guarantee. Engines are peers; the order carries no notion of trust. The
/// declaration order defines the default priority used when the configuration
/// does not supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineId {
    /// Classical pattern-matching OCR engine.
    Classical,
    /// Neural sequence-model OCR engine.
    Neural,
    /// Platform-native vision service.
    PlatformVision,
    /// Text embedded in the source document (e.g. a PDF text layer).
    EmbeddedText,
}

impl EngineId {
    /// All engine identifiers in ordinal order.
    pub const ALL: [EngineId; 4] = [
        EngineId::Classical,
        EngineId::Neural,
        EngineId::PlatformVision,
        EngineId::EmbeddedText,
    ];

    /// Returns a stable machine-readable name for the engine.
    pub fn name(&self) -> &'static str {
        match self {
            EngineId::Classical => "classical",
            EngineId::Neural => "neural",
            EngineId::PlatformVision => "platform_vision",
            EngineId::EmbeddedText => "embedded_text",
        }
    }

    /// Returns the stable ordinal used for deterministic tie-breaking.
    pub fn ordinal(&self) -> usize {
        match self {
            EngineId::Classical => 0,
            EngineId::Neural => 1,
            EngineId::PlatformVision => 2,
            EngineId::EmbeddedText => 3,
        }
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EngineId {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classical" => Ok(EngineId::Classical),
            "neural" => Ok(EngineId::Neural),
            "platform_vision" => Ok(EngineId::PlatformVision),
            "embedded_text" => Ok(EngineId::EmbeddedText),
            other => Err(FusionError::config_error_with_context(
                "engine",
                other,
                "unknown engine name",
            )),
        }
    }
}
