// src/intent/mod.rs

//! Turns a raw query into a [`Plan`].
//!
//! Three strategies exist and the rest of the pipeline never knows which one
//! ran: a language-model call, a fixed table of example queries, and a local
//! keyword heuristic. The strategy is picked from configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::ProviderError;
use crate::protocol::Plan;

pub mod canned;
pub mod keyword;
pub mod llm;

pub use canned::CannedExtractor;
pub use keyword::KeywordExtractor;
pub use llm::LlmExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("language model call failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("no JSON plan found in model output")]
    NoJson,
    #[error("malformed plan: {0}")]
    Malformed(String),
    #[error("plan contains no steps")]
    EmptyPlan,
    #[error("invalid price `{0}`")]
    InvalidPrice(String),
    #[error("could not determine `{parameter}` for {tool}")]
    MissingParameter {
        tool: &'static str,
        parameter: &'static str,
    },
    #[error("could not understand the request")]
    UnknownIntent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    Llm,
    Canned,
    #[default]
    Keyword,
}

pub enum IntentExtractor {
    Llm(LlmExtractor),
    Canned(CannedExtractor),
    Keyword(KeywordExtractor),
}

impl IntentExtractor {
    pub fn extract(&self, query: &str) -> Result<Plan, ExtractionError> {
        match self {
            Self::Llm(inner) => inner.extract(query),
            Self::Canned(inner) => inner.extract(query),
            Self::Keyword(inner) => inner.extract(query),
        }
    }

    pub fn kind(&self) -> ExtractorKind {
        match self {
            Self::Llm(_) => ExtractorKind::Llm,
            Self::Canned(_) => ExtractorKind::Canned,
            Self::Keyword(_) => ExtractorKind::Keyword,
        }
    }
}

impl From<LlmExtractor> for IntentExtractor {
    fn from(inner: LlmExtractor) -> Self {
        Self::Llm(inner)
    }
}

impl From<CannedExtractor> for IntentExtractor {
    fn from(inner: CannedExtractor) -> Self {
        Self::Canned(inner)
    }
}

impl From<KeywordExtractor> for IntentExtractor {
    fn from(inner: KeywordExtractor) -> Self {
        Self::Keyword(inner)
    }
}
