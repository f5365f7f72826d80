use brickwise_agent::{AgentRuntime, WorkflowKind};
use brickwise_core::config::{AppConfig, LoadOptions};
use serde_json::{Map, Value};
use tokio::runtime::Runtime;

use crate::commands::CommandResult;

/// An input the front end collects for a feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
}

const fn required(key: &'static str, label: &'static str) -> Field {
    Field { key, label, required: true }
}

const fn optional(key: &'static str, label: &'static str) -> Field {
    Field { key, label, required: false }
}

const PRICE_FIELDS: &[Field] = &[required("material", "material")];
const COMPETITOR_FIELDS: &[Field] =
    &[required("project_type", "project type"), optional("location", "location")];
const ESTIMATE_FIELDS: &[Field] = &[
    required("material", "material"),
    required("location", "location"),
    optional("building_type", "building type"),
    optional("floors", "floors"),
    optional("area_sqft", "area (sqft)"),
    optional("labor_cost", "labor cost (INR)"),
    optional("alternative_material", "alternative material"),
    optional("quantity", "quantity"),
];
const SCHEDULE_FIELDS: &[Field] = &[required("project_details", "project details")];
const PERMIT_FIELDS: &[Field] =
    &[required("location", "location"), optional("project_type", "project type")];
const BID_FIELDS: &[Field] = &[required("project_data", "project data")];

pub fn fields(kind: WorkflowKind) -> &'static [Field] {
    match kind {
        WorkflowKind::MaterialPrice => PRICE_FIELDS,
        WorkflowKind::CompetitorPricing => COMPETITOR_FIELDS,
        WorkflowKind::CostEstimation => ESTIMATE_FIELDS,
        WorkflowKind::ProjectScheduling => SCHEDULE_FIELDS,
        WorkflowKind::PermitDetection => PERMIT_FIELDS,
        WorkflowKind::BidOptimization => BID_FIELDS,
    }
}

/// Subcommand (and session menu) name of a workflow.
pub fn command_name(kind: WorkflowKind) -> &'static str {
    match kind {
        WorkflowKind::MaterialPrice => "price",
        WorkflowKind::CompetitorPricing => "competitors",
        WorkflowKind::CostEstimation => "estimate",
        WorkflowKind::ProjectScheduling => "schedule",
        WorkflowKind::PermitDetection => "permits",
        WorkflowKind::BidOptimization => "bid",
    }
}

pub fn parse_feature(name: &str) -> Option<WorkflowKind> {
    let name = name.trim().to_ascii_lowercase();
    WorkflowKind::ALL.into_iter().find(|kind| command_name(*kind) == name || kind.as_str() == name)
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRequest {
    kind: WorkflowKind,
    input: Map<String, Value>,
}

impl FeatureRequest {
    pub fn new(kind: WorkflowKind) -> Self {
        Self { kind, input: Map::new() }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.input.insert(key.to_string(), value.into());
        self
    }

    pub fn with_opt<T: Into<Value>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    pub fn input(&self) -> &Map<String, Value> {
        &self.input
    }

    /// Rejects blank required inputs before any workflow runs.
    pub fn validate(&self) -> Result<(), String> {
        for field in fields(self.kind).iter().filter(|field| field.required) {
            let blank = match self.input.get(field.key) {
                None | Some(Value::Null) => true,
                Some(Value::String(text)) => text.trim().is_empty(),
                Some(_) => false,
            };
            if blank {
                return Err(format!("{} must not be empty", field.label));
            }
        }
        Ok(())
    }

    pub fn into_input(self) -> Value {
        Value::Object(self.input)
    }
}

pub fn run(request: FeatureRequest) -> CommandResult {
    let command = command_name(request.kind());

    if let Err(message) = request.validate() {
        return CommandResult::failure(command, "invalid_input", message, 2);
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                3,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                4,
            );
        }
    };

    let agents = AgentRuntime::from_config(&config);
    execute(&agents, &runtime, request)
}

/// Runs one validated request to completion on `runtime`.
pub fn execute(agents: &AgentRuntime, runtime: &Runtime, request: FeatureRequest) -> CommandResult {
    let kind = request.kind();
    let error_class =
        if agents.routable(kind).is_err() { "service_unavailable" } else { "workflow_error" };

    let result = runtime.block_on(agents.run(kind, request.into_input()));
    CommandResult::workflow(command_name(kind), error_class, result)
}
