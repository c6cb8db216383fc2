// src/agent/mod.rs

use tracing::{info, info_span, warn};

use crate::catalog::CatalogStore;
use crate::config::{AgentConfig, ConfigError};
use crate::error::AgentError;
use crate::intent::{
    CannedExtractor, ExtractorKind, IntentExtractor, KeywordExtractor, LlmExtractor,
};
use crate::protocol::{Plan, QueryResponse, StepResult};
use crate::tools::ToolRegistry;

pub mod composer;
pub mod executor;

pub use composer::{ResponseComposer, SummaryMode};
pub use executor::{ExecutionError, FailureMode, PlanExecutor};

/// Query → plan → steps → response.
///
/// The agent owns its registry and catalog and never mutates them, so one
/// instance can serve any number of queries, from any number of threads.
pub struct ShoppingAgent {
    extractor: IntentExtractor,
    registry: ToolRegistry,
    catalog: CatalogStore,
    failure_mode: FailureMode,
    composer: ResponseComposer,
}

impl ShoppingAgent {
    pub fn new(
        extractor: impl Into<IntentExtractor>,
        registry: ToolRegistry,
        catalog: CatalogStore,
    ) -> Self {
        Self {
            extractor: extractor.into(),
            registry,
            catalog,
            failure_mode: FailureMode::default(),
            composer: ResponseComposer::default(),
        }
    }

    /// Demo catalog, the five shopping tools, and the extractor the config names.
    pub fn from_config(config: &AgentConfig) -> Result<Self, ConfigError> {
        let registry = ToolRegistry::shopping();
        let catalog = CatalogStore::demo();

        let extractor: IntentExtractor = match config.extractor {
            ExtractorKind::Llm => {
                LlmExtractor::new(config.llm.build_provider()?, &registry).into()
            }
            ExtractorKind::Canned => CannedExtractor::new()
                .with_fallback(config.canned_fallback)
                .into(),
            ExtractorKind::Keyword => KeywordExtractor::new(&catalog).into(),
        };

        Ok(Self::new(extractor, registry, catalog)
            .with_failure_mode(config.failure_mode)
            .with_summary_mode(config.summary))
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    pub fn with_summary_mode(mut self, mode: SummaryMode) -> Self {
        self.composer = ResponseComposer::new(mode);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn extractor_kind(&self) -> ExtractorKind {
        self.extractor.kind()
    }

    /// Never fails: every error becomes an error-status response.
    pub fn process_query(&self, text: &str) -> QueryResponse {
        let span = info_span!("query", extractor = ?self.extractor.kind());
        let _guard = span.enter();

        match self.try_process(text) {
            Ok(response) => {
                info!(steps = response.steps.len(), "query answered");
                response
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "query failed");
                QueryResponse::error(text, err.to_string())
            }
        }
    }

    pub fn try_process(&self, text: &str) -> Result<QueryResponse, AgentError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(AgentError::EmptyQuery);
        }

        let plan = self.plan(query)?;
        let steps = self.execute(&plan)?;
        Ok(self.composer.compose(text, steps))
    }

    pub fn plan(&self, query: &str) -> Result<Plan, AgentError> {
        let plan = self.extractor.extract(query)?;
        info!(tools = ?plan.tool_names(), "plan extracted");
        Ok(plan)
    }

    pub fn execute(&self, plan: &Plan) -> Result<Vec<StepResult>, AgentError> {
        let executor = PlanExecutor::new(&self.registry, &self.catalog, self.failure_mode);
        Ok(executor.execute(plan)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Status;

    fn keyword_agent() -> ShoppingAgent {
        let catalog = CatalogStore::demo();
        ShoppingAgent::new(KeywordExtractor::new(&catalog), ToolRegistry::shopping(), catalog)
    }

    #[test]
    fn blank_query_is_rejected() {
        let agent = keyword_agent();
        for text in ["", "   ", "\n\t"] {
            let response = agent.process_query(text);
            assert_eq!(response.status, Status::Error);
            assert_eq!(response.message.as_deref(), Some("Empty query"));
            assert!(response.steps.is_empty());
        }
    }

    #[test]
    fn unknown_intent_reads_as_could_not_understand() {
        let response = keyword_agent().process_query("hello there");
        assert_eq!(response.status, Status::Error);
        assert_eq!(
            response.message.as_deref(),
            Some("Sorry, I could not understand your request.")
        );
    }

    #[test]
    fn keyword_query_end_to_end() {
        let response = keyword_agent().process_query("What's the return policy for StoreB?");
        assert!(response.is_success());
        assert_eq!(response.steps.len(), 1);
        assert_eq!(
            response.natural_response.as_deref(),
            Some("StoreB offers 14-day returns.")
        );
    }

    #[test]
    fn from_config_picks_extractor() {
        let mut config = AgentConfig::default();
        config.extractor = ExtractorKind::Canned;
        let agent = ShoppingAgent::from_config(&config).unwrap();
        assert_eq!(agent.extractor_kind(), ExtractorKind::Canned);
        assert_eq!(agent.registry().len(), 5);
    }
}
