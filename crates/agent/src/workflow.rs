//! Workflow orchestration over [`StateHandler`]s.
//!
//! A workflow normalizes raw input into a [`State`] with the documented
//! defaults, runs one or two handlers, and guarantees a JSON object comes
//! back. The cost workflow is the only composite: it prices the material
//! first and stops there when pricing failed.

use std::fmt;

use brickwise_core::errors::ServiceKind;
use brickwise_core::state::{has_error, value_kind, State};
use serde_json::{json, Value};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::agents::StateHandler;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    MaterialPrice,
    CompetitorPricing,
    CostEstimation,
    ProjectScheduling,
    PermitDetection,
    BidOptimization,
}

impl WorkflowKind {
    pub const ALL: [Self; 6] = [
        Self::MaterialPrice,
        Self::CompetitorPricing,
        Self::CostEstimation,
        Self::ProjectScheduling,
        Self::PermitDetection,
        Self::BidOptimization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaterialPrice => "material_price",
            Self::CompetitorPricing => "competitor_pricing",
            Self::CostEstimation => "cost_estimation",
            Self::ProjectScheduling => "project_scheduling",
            Self::PermitDetection => "permit_detection",
            Self::BidOptimization => "bid_optimization",
        }
    }

    /// Field holding the workflow's primary result.
    pub fn output_field(&self) -> &'static str {
        match self {
            Self::MaterialPrice => "price",
            Self::CompetitorPricing => "competitor_prices",
            Self::CostEstimation => "total_cost",
            Self::ProjectScheduling => "schedule",
            Self::PermitDetection => "permits",
            Self::BidOptimization => "optimal_bid",
        }
    }

    /// External service the workflow cannot run without. The cost workflow
    /// needs search for its pricing step.
    pub fn required_service(&self) -> ServiceKind {
        match self {
            Self::MaterialPrice
            | Self::CompetitorPricing
            | Self::CostEstimation
            | Self::PermitDetection => ServiceKind::Search,
            Self::ProjectScheduling | Self::BidOptimization => ServiceKind::TextGeneration,
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs a single handler over normalized input.
pub async fn invoke(handler: &dyn StateHandler, raw: Value) -> Value {
    let correlation_id = new_correlation_id();
    let span = info_span!("workflow", workflow = handler.handler_name(), %correlation_id);

    async move {
        let state = State::normalize(raw);
        let result = handler.handle(state.into_value()).await;
        let result = mapping_or_error(handler, result);
        log_result(handler.handler_name(), &correlation_id, &result);
        result
    }
    .instrument(span)
    .await
}

/// Prices the material, then estimates cost over the priced state.
///
/// A pricing result with a non-null `error` is returned unchanged and
/// `estimate` is never called.
pub async fn estimate_cost(
    price: &dyn StateHandler,
    estimate: &dyn StateHandler,
    raw: Value,
) -> Value {
    let correlation_id = new_correlation_id();
    let workflow = WorkflowKind::CostEstimation.as_str();
    let span = info_span!("workflow", workflow, %correlation_id);

    async move {
        let mut state = State::normalize(raw);

        let priced = mapping_or_error(price, price.handle(state.clone().into_value()).await);
        let Value::Object(fields) = priced else {
            return priced;
        };
        if has_error(&fields) {
            warn!(
                event_name = "workflow.short_circuit",
                correlation_id = %correlation_id,
                workflow,
                agent = price.handler_name(),
                "pricing failed; cost estimate skipped"
            );
            return Value::Object(fields);
        }

        state.merge(fields);
        let result = mapping_or_error(estimate, estimate.handle(state.into_value()).await);
        log_result(workflow, &correlation_id, &result);
        result
    }
    .instrument(span)
    .await
}

fn mapping_or_error(handler: &dyn StateHandler, result: Value) -> Value {
    if result.is_object() {
        return result;
    }
    warn!(
        event_name = "workflow.invalid_result",
        agent = handler.handler_name(),
        kind = value_kind(&result),
        "handler returned a non-mapping result"
    );
    json!({ "error": format!("invalid result from {}", handler.handler_name()) })
}

fn log_result(workflow: &str, correlation_id: &str, result: &Value) {
    let failed = result.as_object().is_some_and(has_error);
    info!(
        event_name = "workflow.completed",
        correlation_id,
        workflow,
        failed,
        "workflow finished"
    );
}

fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}
