use std::sync::Arc;

use async_trait::async_trait;
use brickwise_core::errors::AgentError;
use brickwise_core::state::State;
use serde::Serialize;
use serde_json::Value;

use crate::agents::{text_sentinel, Agent};
use crate::llm::LlmClient;

pub struct BidOptimizationAgent {
    llm: Arc<dyn LlmClient>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BidRequest {
    pub project_data: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimalBid {
    pub project_data: String,
    pub optimal_bid: String,
}

impl BidOptimizationAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for BidOptimizationAgent {
    type Request = BidRequest;
    type Output = OptimalBid;

    fn name(&self) -> &'static str {
        "bid_optimization"
    }

    fn output_field(&self) -> &'static str {
        "optimal_bid"
    }

    fn sentinel(&self, error: &AgentError) -> Value {
        text_sentinel(error, "Please provide valid project data", "optimizing bid")
    }

    fn parse(&self, state: &State) -> Result<Self::Request, AgentError> {
        let project_data = state
            .text("project_data")
            .ok_or_else(|| AgentError::MissingInput("No project data provided".to_owned()))?;
        Ok(BidRequest { project_data: project_data.to_owned() })
    }

    async fn execute(&self, request: Self::Request) -> Result<Self::Output, AgentError> {
        let prompt = format!("Optimize a bid for the following project: {}", request.project_data);
        let optimal_bid = self.llm.complete(&prompt).await?;
        Ok(OptimalBid { project_data: request.project_data, optimal_bid })
    }
}
