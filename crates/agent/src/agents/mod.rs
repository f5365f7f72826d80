//! Single-capability agents and the contract they share.
//!
//! Every agent parses the fields it owns out of a [`State`] into a typed
//! request, does its work, and serializes a typed output back into the
//! mapping. [`run_agent`] owns everything around that: root type checks,
//! sentinel values, and the `error` field. No failure escapes as a panic or
//! an `Err`; callers always get a JSON object back.

mod bid_optimization;
mod competitor_pricing;
mod cost_estimation;
mod material_price;
mod permit_detection;
mod project_scheduling;

use async_trait::async_trait;
use brickwise_core::errors::AgentError;
use brickwise_core::search::SearchResponse;
use brickwise_core::state::{value_kind, State};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::search::SearchClient;

pub use bid_optimization::{BidOptimizationAgent, BidRequest, OptimalBid};
pub use competitor_pricing::{CompetitorPricing, CompetitorPricingAgent, CompetitorRequest};
pub use cost_estimation::{CostEstimationAgent, CostEstimationOutput, CostRequest};
pub use material_price::{MaterialPrice, MaterialPriceAgent, MaterialPriceRequest};
pub use permit_detection::{PermitDetectionAgent, PermitList, PermitRequest};
pub use project_scheduling::{ProjectSchedule, ProjectSchedulingAgent, ScheduleRequest};

#[async_trait]
pub trait Agent: Send + Sync {
    type Request: Send;
    type Output: Serialize + Send;

    fn name(&self) -> &'static str;

    /// Field that carries the agent's primary result, or its sentinel on
    /// failure.
    fn output_field(&self) -> &'static str;

    /// Value written to `output_field` when the agent fails with `error`.
    fn sentinel(&self, error: &AgentError) -> Value;

    /// Validates required fields. Runs before any external call.
    fn parse(&self, state: &State) -> Result<Self::Request, AgentError>;

    async fn execute(&self, request: Self::Request) -> Result<Self::Output, AgentError>;
}

/// Uniform invocation surface the orchestrator routes through.
#[async_trait]
pub trait StateHandler: Send + Sync {
    fn handler_name(&self) -> &'static str;
    async fn handle(&self, input: Value) -> Value;
}

#[async_trait]
impl<A> StateHandler for A
where
    A: Agent,
{
    fn handler_name(&self) -> &'static str {
        Agent::name(self)
    }

    async fn handle(&self, input: Value) -> Value {
        run_agent(self, input).await
    }
}

/// Runs one agent against raw input.
///
/// On success the result is the input mapping with the agent's output merged
/// over it and `error` reset to null. On failure it is exactly
/// `{<output_field>: <sentinel>, "error": <message>}`.
pub async fn run_agent<A>(agent: &A, input: Value) -> Value
where
    A: Agent + ?Sized,
{
    let state = match input {
        Value::Object(fields) => State::from(fields),
        other => {
            let error = AgentError::InvalidStateType(value_kind(&other).to_owned());
            warn!(
                event_name = "agent.invalid_state",
                agent = agent.name(),
                error = %error,
                "agent rejected non-mapping input"
            );
            return failure(agent, &error);
        }
    };

    let request = match agent.parse(&state) {
        Ok(request) => request,
        Err(error) => {
            warn!(
                event_name = "agent.validation_failed",
                agent = agent.name(),
                error_class = error.error_class(),
                error = %error,
                "agent input rejected"
            );
            return failure(agent, &error);
        }
    };

    let output = match agent.execute(request).await {
        Ok(output) => output,
        Err(error) => {
            warn!(
                event_name = "agent.failed",
                agent = agent.name(),
                error_class = error.error_class(),
                error = %error,
                "agent returned an error"
            );
            return failure(agent, &error);
        }
    };

    match serde_json::to_value(output) {
        Ok(Value::Object(fields)) => {
            debug!(event_name = "agent.completed", agent = agent.name(), "agent completed");
            let mut state = state;
            state.merge(fields);
            state.insert("error", Value::Null);
            state.into_value()
        }
        Ok(other) => failure(
            agent,
            &AgentError::Calculation(format!("output serialized as {}", value_kind(&other))),
        ),
        Err(error) => failure(agent, &AgentError::Calculation(error.to_string())),
    }
}

fn failure<A>(agent: &A, error: &AgentError) -> Value
where
    A: Agent + ?Sized,
{
    let mut fields = Map::new();
    fields.insert(agent.output_field().to_owned(), agent.sentinel(error));
    fields.insert("error".to_owned(), json!(error.to_string()));
    Value::Object(fields)
}

/// Searches `query`, degrading a service failure to an empty response so
/// reference data can still answer.
pub(crate) async fn search_or_empty(search: &dyn SearchClient, query: &str) -> SearchResponse {
    match search.search(query).await {
        Ok(response) => response,
        Err(error) => {
            warn!(
                event_name = "agent.search_degraded",
                %query,
                error = %error,
                "search failed; continuing with an empty result"
            );
            SearchResponse::empty(query)
        }
    }
}

/// Text sentinel shared by agents whose output is a single string.
pub(crate) fn text_sentinel(error: &AgentError, missing: &str, failed: &str) -> Value {
    match error {
        AgentError::InvalidStateType(_) => json!("Error: Invalid state type"),
        AgentError::MissingInput(_) | AgentError::InvalidInput(_) => {
            json!(format!("Error: {missing}"))
        }
        other => json!(format!("Error {failed}: {other}")),
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use brickwise_core::errors::{ServiceError, ServiceKind};
    use brickwise_core::search::{SearchHit, SearchResponse};

    use crate::llm::LlmClient;
    use crate::search::SearchClient;

    /// Search double that records every query it receives.
    #[derive(Default)]
    pub struct CountingSearch {
        snippets: Vec<String>,
        fail: bool,
        queries: Mutex<Vec<String>>,
    }

    impl CountingSearch {
        pub fn with_snippets(snippets: &[&str]) -> Self {
            Self {
                snippets: snippets.iter().map(|snippet| (*snippet).to_owned()).collect(),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self { fail: true, ..Self::default() }
        }

        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().map(|queries| queries.clone()).unwrap_or_default()
        }

        pub fn calls(&self) -> usize {
            self.queries().len()
        }
    }

    #[async_trait]
    impl SearchClient for CountingSearch {
        async fn search(&self, query: &str) -> Result<SearchResponse, ServiceError> {
            if let Ok(mut queries) = self.queries.lock() {
                queries.push(query.to_owned());
            }
            if self.fail {
                return Err(ServiceError::Status { service: ServiceKind::Search, status: 502 });
            }
            let hits = self.snippets.iter().map(|snippet| SearchHit::snippet(snippet.as_str())).collect();
            Ok(SearchResponse::new(query, hits))
        }
    }

    /// Completion double returning a fixed reply and recording prompts.
    pub struct CountingLlm {
        reply: Result<String, ServiceError>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl CountingLlm {
        pub fn replying(reply: &str) -> Self {
            Self { reply: Ok(reply.to_owned()), prompts: Mutex::default(), calls: AtomicUsize::new(0) }
        }

        pub fn failing(error: ServiceError) -> Self {
            Self { reply: Err(error), prompts: Mutex::default(), calls: AtomicUsize::new(0) }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().map(|prompts| prompts.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmClient for CountingLlm {
        async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(prompt.to_owned());
            }
            self.reply.clone()
        }
    }
}
