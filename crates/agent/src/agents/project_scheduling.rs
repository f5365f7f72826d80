use std::sync::Arc;

use async_trait::async_trait;
use brickwise_core::errors::AgentError;
use brickwise_core::state::State;
use serde::Serialize;
use serde_json::Value;

use crate::agents::{text_sentinel, Agent};
use crate::llm::LlmClient;

pub struct ProjectSchedulingAgent {
    llm: Arc<dyn LlmClient>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleRequest {
    pub project_details: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectSchedule {
    pub project_details: String,
    pub schedule: String,
}

impl ProjectSchedulingAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

fn schedule_prompt(project_details: &str) -> String {
    format!("Generate a project schedule for: {project_details}")
}

#[async_trait]
impl Agent for ProjectSchedulingAgent {
    type Request = ScheduleRequest;
    type Output = ProjectSchedule;

    fn name(&self) -> &'static str {
        "project_scheduling"
    }

    fn output_field(&self) -> &'static str {
        "schedule"
    }

    fn sentinel(&self, error: &AgentError) -> Value {
        text_sentinel(error, "Please provide valid project details", "generating schedule")
    }

    fn parse(&self, state: &State) -> Result<Self::Request, AgentError> {
        let project_details = state
            .text("project_details")
            .ok_or_else(|| AgentError::MissingInput("No project details provided".to_owned()))?;
        Ok(ScheduleRequest { project_details: project_details.to_owned() })
    }

    async fn execute(&self, request: Self::Request) -> Result<Self::Output, AgentError> {
        let schedule = self.llm.complete(&schedule_prompt(&request.project_details)).await?;
        Ok(ProjectSchedule { project_details: request.project_details, schedule })
    }
}
