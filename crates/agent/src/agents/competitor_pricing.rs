use std::sync::Arc;

use async_trait::async_trait;
use brickwise_core::catalog::ReferenceData;
use brickwise_core::errors::AgentError;
use brickwise_core::extraction::{competitor_query, extract_competitor_prices, is_no_data};
use brickwise_core::state::State;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::agents::{search_or_empty, Agent};
use crate::search::SearchClient;

/// Builder price quotes for a project type, optionally narrowed to a
/// location. A miss is valid output: the no-data sentinel list, no error.
pub struct CompetitorPricingAgent {
    search: Arc<dyn SearchClient>,
    catalog: Arc<dyn ReferenceData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompetitorRequest {
    pub project_type: String,
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompetitorPricing {
    pub project_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub competitor_prices: Vec<String>,
}

impl CompetitorPricingAgent {
    pub fn new(search: Arc<dyn SearchClient>, catalog: Arc<dyn ReferenceData>) -> Self {
        Self { search, catalog }
    }
}

#[async_trait]
impl Agent for CompetitorPricingAgent {
    type Request = CompetitorRequest;
    type Output = CompetitorPricing;

    fn name(&self) -> &'static str {
        "competitor_pricing"
    }

    fn output_field(&self) -> &'static str {
        "competitor_prices"
    }

    fn sentinel(&self, error: &AgentError) -> Value {
        let entry = match error {
            AgentError::InvalidStateType(_) => "Error: Invalid state type".to_owned(),
            AgentError::MissingInput(_) | AgentError::InvalidInput(_) => {
                "Error: Please provide a valid project type".to_owned()
            }
            other => format!("Error fetching competitor prices: {other}"),
        };
        json!([entry])
    }

    fn parse(&self, state: &State) -> Result<Self::Request, AgentError> {
        let project_type = state
            .text("project_type")
            .ok_or_else(|| AgentError::MissingInput("No project type provided".to_owned()))?;
        Ok(CompetitorRequest {
            project_type: project_type.to_owned(),
            location: state.text("location").map(str::to_owned),
        })
    }

    async fn execute(&self, request: Self::Request) -> Result<Self::Output, AgentError> {
        let query = competitor_query(&request.project_type, request.location.as_deref());
        let response = search_or_empty(self.search.as_ref(), &query).await;
        let competitor_prices = extract_competitor_prices(&response, self.catalog.as_ref());

        if is_no_data(&competitor_prices) {
            info!(
                event_name = "agent.competitors.no_data",
                project_type = %request.project_type,
                location = request.location.as_deref().unwrap_or(""),
                "no competitor pricing available"
            );
        } else {
            debug!(
                event_name = "agent.competitors.found",
                count = competitor_prices.len(),
                "competitor prices collected"
            );
        }

        Ok(CompetitorPricing {
            project_type: request.project_type,
            location: request.location,
            competitor_prices,
        })
    }
}
