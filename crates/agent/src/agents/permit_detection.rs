use std::sync::Arc;

use async_trait::async_trait;
use brickwise_core::catalog::ReferenceData;
use brickwise_core::errors::AgentError;
use brickwise_core::extraction::{extract_permits, permit_query};
use brickwise_core::state::State;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::agents::{search_or_empty, text_sentinel, Agent};
use crate::search::SearchClient;

const DEFAULT_PROJECT_TYPE: &str = "Residential";

/// Permits for a location and project type. The reference permit schedule
/// answers first; search output is consulted only for uncovered locations.
pub struct PermitDetectionAgent {
    search: Arc<dyn SearchClient>,
    catalog: Arc<dyn ReferenceData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PermitRequest {
    pub location: String,
    pub project_type: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PermitList {
    pub location: String,
    pub project_type: String,
    pub permits: String,
}

impl PermitDetectionAgent {
    pub fn new(search: Arc<dyn SearchClient>, catalog: Arc<dyn ReferenceData>) -> Self {
        Self { search, catalog }
    }
}

#[async_trait]
impl Agent for PermitDetectionAgent {
    type Request = PermitRequest;
    type Output = PermitList;

    fn name(&self) -> &'static str {
        "permit_detection"
    }

    fn output_field(&self) -> &'static str {
        "permits"
    }

    fn sentinel(&self, error: &AgentError) -> Value {
        text_sentinel(error, "Please provide a valid location", "detecting permits")
    }

    fn parse(&self, state: &State) -> Result<Self::Request, AgentError> {
        let location = state
            .text("location")
            .ok_or_else(|| AgentError::MissingInput("No location provided".to_owned()))?;
        Ok(PermitRequest {
            location: location.to_owned(),
            project_type: state.text("project_type").unwrap_or(DEFAULT_PROJECT_TYPE).to_owned(),
        })
    }

    async fn execute(&self, request: Self::Request) -> Result<Self::Output, AgentError> {
        let PermitRequest { location, project_type } = request;

        if let Some(schedule) = self.catalog.permit_schedule(&location, &project_type) {
            debug!(event_name = "agent.permits.schedule", %location, %project_type, "using permit schedule");
            return Ok(PermitList { permits: schedule.join(", "), location, project_type });
        }

        let query = permit_query(&location, &project_type);
        let response = search_or_empty(self.search.as_ref(), &query).await;
        let permits = extract_permits(&response, self.catalog.as_ref())
            .ok_or_else(|| AgentError::NotFound(format!("No permits found for {location}")))?;

        Ok(PermitList { location, project_type, permits })
    }
}
