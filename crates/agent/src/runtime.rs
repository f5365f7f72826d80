use std::sync::Arc;

use brickwise_core::catalog::{ReferenceData, SeedCatalog};
use brickwise_core::config::AppConfig;
use brickwise_core::errors::{ServiceError, ServiceKind};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::agents::{
    BidOptimizationAgent, CompetitorPricingAgent, CostEstimationAgent, MaterialPriceAgent,
    PermitDetectionAgent, ProjectSchedulingAgent,
};
use crate::llm::{GeminiClient, LlmClient};
use crate::search::{search_client_from_config, SearchClient};
use crate::workflow::{estimate_cost, invoke, WorkflowKind};

/// Owns adapter initialization results and routes workflows to agents.
///
/// Adapters are built once. A failed build is kept, not retried, and every
/// workflow depending on that service is refused without running an agent.
pub struct AgentRuntime {
    search: Result<Arc<dyn SearchClient>, ServiceError>,
    llm: Result<Arc<dyn LlmClient>, ServiceError>,
    catalog: Arc<dyn ReferenceData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceReadiness {
    pub service: &'static str,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AgentRuntime {
    pub fn new(
        search: Result<Arc<dyn SearchClient>, ServiceError>,
        llm: Result<Arc<dyn LlmClient>, ServiceError>,
        catalog: Arc<dyn ReferenceData>,
    ) -> Self {
        Self { search, llm, catalog }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let search = search_client_from_config(&config.search);
        let llm = GeminiClient::from_config(&config.llm)
            .map(|client| Arc::new(client) as Arc<dyn LlmClient>);

        for error in [search.as_ref().err(), llm.as_ref().err()].into_iter().flatten() {
            warn!(
                event_name = "runtime.adapter_unavailable",
                correlation_id = "bootstrap",
                service = %error.service(),
                error = %error,
                "adapter failed to initialize; dependent workflows are disabled"
            );
        }
        info!(
            event_name = "runtime.ready",
            correlation_id = "bootstrap",
            search_ready = search.is_ok(),
            llm_ready = llm.is_ok(),
            "agent runtime initialized"
        );

        Self::new(search, llm, Arc::new(SeedCatalog))
    }

    pub fn readiness(&self) -> Vec<ServiceReadiness> {
        [ServiceKind::Search, ServiceKind::TextGeneration]
            .into_iter()
            .map(|service| {
                let status = self.service(service);
                ServiceReadiness {
                    service: service.as_str(),
                    ready: status.is_ok(),
                    detail: status.err().map(ToString::to_string),
                }
            })
            .collect()
    }

    /// `Err` carries the initialization failure that blocks `kind`.
    pub fn routable(&self, kind: WorkflowKind) -> Result<(), &ServiceError> {
        self.service(kind.required_service())
    }

    pub async fn run(&self, kind: WorkflowKind, raw: Value) -> Value {
        match self.dispatch(kind, raw).await {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    event_name = "runtime.route_refused",
                    workflow = kind.as_str(),
                    service = %error.service(),
                    error = %error,
                    "workflow refused"
                );
                json!({ "error": error.to_string() })
            }
        }
    }

    async fn dispatch(&self, kind: WorkflowKind, raw: Value) -> Result<Value, &ServiceError> {
        let catalog = Arc::clone(&self.catalog);
        let result = match kind {
            WorkflowKind::MaterialPrice => {
                invoke(&MaterialPriceAgent::new(self.search()?, catalog), raw).await
            }
            WorkflowKind::CompetitorPricing => {
                invoke(&CompetitorPricingAgent::new(self.search()?, catalog), raw).await
            }
            WorkflowKind::CostEstimation => {
                let price = MaterialPriceAgent::new(self.search()?, catalog);
                estimate_cost(&price, &CostEstimationAgent, raw).await
            }
            WorkflowKind::ProjectScheduling => {
                invoke(&ProjectSchedulingAgent::new(self.llm()?), raw).await
            }
            WorkflowKind::PermitDetection => {
                invoke(&PermitDetectionAgent::new(self.search()?, catalog), raw).await
            }
            WorkflowKind::BidOptimization => {
                invoke(&BidOptimizationAgent::new(self.llm()?), raw).await
            }
        };
        Ok(result)
    }

    fn service(&self, service: ServiceKind) -> Result<(), &ServiceError> {
        match service {
            ServiceKind::Search => self.search.as_ref().map(|_| ()),
            ServiceKind::TextGeneration => self.llm.as_ref().map(|_| ()),
        }
    }

    fn search(&self) -> Result<Arc<dyn SearchClient>, &ServiceError> {
        self.search.as_ref().map(Arc::clone)
    }

    fn llm(&self) -> Result<Arc<dyn LlmClient>, &ServiceError> {
        self.llm.as_ref().map(Arc::clone)
    }
}
