use async_trait::async_trait;
use brickwise_core::errors::AgentError;
use brickwise_core::estimation::{
    default_labor_cost, estimate, CostInputs, DEFAULT_ALTERNATIVE_MATERIAL, DEFAULT_AREA_SQFT,
    DEFAULT_BUILDING_TYPE, DEFAULT_FLOORS,
};
use brickwise_core::state::State;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::agents::Agent;

const MISSING_FIELDS: &str = "Missing required fields (Location and Material)";

/// Pure arithmetic over the request; makes no external calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct CostEstimationAgent;

#[derive(Clone, Debug, PartialEq)]
pub struct CostRequest {
    pub location: String,
    pub inputs: CostInputs,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostEstimationOutput {
    pub building_type: String,
    pub location: String,
    pub floors: u32,
    pub area_sqft: f64,
    pub material: String,
    pub labor_cost: f64,
    pub total_cost: f64,
    pub estimated_time: f64,
    pub alternative_cost: Option<f64>,
}

#[async_trait]
impl Agent for CostEstimationAgent {
    type Request = CostRequest;
    type Output = CostEstimationOutput;

    fn name(&self) -> &'static str {
        "cost_estimation"
    }

    fn output_field(&self) -> &'static str {
        "total_cost"
    }

    fn sentinel(&self, _error: &AgentError) -> Value {
        json!(0.0)
    }

    fn parse(&self, state: &State) -> Result<Self::Request, AgentError> {
        let (Some(location), Some(material)) = (state.text("location"), state.text("material"))
        else {
            return Err(AgentError::MissingInput(MISSING_FIELDS.to_owned()));
        };

        let floors = match number(state, "floors")? {
            None => DEFAULT_FLOORS,
            Some(floors) if floors >= 1.0 && floors.fract() == 0.0 && floors <= f64::from(u32::MAX) => {
                floors as u32
            }
            Some(_) => {
                return Err(AgentError::InvalidInput(
                    "Floors must be a positive whole number".to_owned(),
                ))
            }
        };

        let area_sqft = match number(state, "area_sqft")? {
            None => DEFAULT_AREA_SQFT,
            Some(area) if area.is_finite() && area > 0.0 => area,
            Some(_) => {
                return Err(AgentError::InvalidInput("Area must be a positive number".to_owned()))
            }
        };

        let labor_cost = match number(state, "labor_cost")? {
            None => default_labor_cost(area_sqft),
            Some(cost) if cost.is_finite() && cost >= 0.0 => cost,
            Some(_) => {
                return Err(AgentError::InvalidInput("Labor cost must not be negative".to_owned()))
            }
        };

        Ok(CostRequest {
            location: location.to_owned(),
            inputs: CostInputs {
                building_type: state.text("building_type").unwrap_or(DEFAULT_BUILDING_TYPE).to_owned(),
                floors,
                area_sqft,
                material: material.to_owned(),
                labor_cost,
                alternative_material: state
                    .text("alternative_material")
                    .unwrap_or(DEFAULT_ALTERNATIVE_MATERIAL)
                    .to_owned(),
            },
        })
    }

    async fn execute(&self, request: Self::Request) -> Result<Self::Output, AgentError> {
        let CostRequest { location, inputs } = request;
        let result = estimate(&inputs);

        if !result.total_cost.is_finite() || !result.estimated_time.is_finite() {
            return Err(AgentError::Calculation("estimate is out of range".to_owned()));
        }
        debug!(
            event_name = "agent.cost.estimated",
            total_cost = result.total_cost,
            estimated_time = result.estimated_time,
            "cost estimated"
        );

        Ok(CostEstimationOutput {
            building_type: inputs.building_type,
            location,
            floors: inputs.floors,
            area_sqft: inputs.area_sqft,
            material: inputs.material,
            labor_cost: inputs.labor_cost,
            total_cost: result.total_cost,
            estimated_time: result.estimated_time,
            alternative_cost: result.alternative_cost,
        })
    }
}

fn number(state: &State, key: &str) -> Result<Option<f64>, AgentError> {
    state
        .number(key)
        .map_err(|kind| AgentError::InvalidInput(format!("{key} must be a number, got {kind}")))
}
