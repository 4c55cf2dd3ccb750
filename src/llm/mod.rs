//! LLM provider registry and fallback generation
//!
//! The provider table is immutable configuration built once at startup:
//! each entry names an upstream text-generation API, its auth scheme, its
//! model aliases in preference order, and per-mode output/timeout budgets.
//! The fallback client walks the eligible entries in priority order and
//! degrades to a deterministic stub when everything fails — it never
//! surfaces an error to the orchestrator.

pub mod client;
pub mod descriptor;
pub mod extract;
pub mod registry;

pub use client::{FALLBACK_MARKER, GenerationClient, GenerationOutcome, fallback_material};
pub use descriptor::{AuthScheme, ModeBudget, ModeBudgets, ProviderDescriptor};
pub use extract::ResponseShape;
pub use registry::{ConfiguredProvider, ProviderRegistry};

/// Generation mode controlling credit cost and provider budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Basic,
    Advanced,
    Premium,
}

impl GenerationMode {
    /// Parse the wire representation; unknown strings are rejected by the
    /// caller before any side effect.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(Self::Basic),
            "advanced" => Some(Self::Advanced),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
            Self::Premium => "premium",
        }
    }
}
