use std::sync::Arc;

use async_trait::async_trait;
use brickwise_core::catalog::ReferenceData;
use brickwise_core::errors::AgentError;
use brickwise_core::extraction::{extract_price, price_query};
use brickwise_core::state::{State, DEFAULT_PRICE};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::agents::{search_or_empty, Agent};
use crate::search::SearchClient;

pub struct MaterialPriceAgent {
    search: Arc<dyn SearchClient>,
    catalog: Arc<dyn ReferenceData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialPriceRequest {
    pub material: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaterialPrice {
    pub material: String,
    pub price: f64,
}

impl MaterialPriceAgent {
    pub fn new(search: Arc<dyn SearchClient>, catalog: Arc<dyn ReferenceData>) -> Self {
        Self { search, catalog }
    }
}

#[async_trait]
impl Agent for MaterialPriceAgent {
    type Request = MaterialPriceRequest;
    type Output = MaterialPrice;

    fn name(&self) -> &'static str {
        "material_price"
    }

    fn output_field(&self) -> &'static str {
        "price"
    }

    fn sentinel(&self, _error: &AgentError) -> Value {
        json!(DEFAULT_PRICE)
    }

    fn parse(&self, state: &State) -> Result<Self::Request, AgentError> {
        let material = state
            .text("material")
            .ok_or_else(|| AgentError::MissingInput("No material provided".to_owned()))?;
        Ok(MaterialPriceRequest { material: material.to_owned() })
    }

    async fn execute(&self, request: Self::Request) -> Result<Self::Output, AgentError> {
        let query = price_query(&request.material);
        let response = search_or_empty(self.search.as_ref(), &query).await;

        let price = extract_price(&response, self.catalog.as_ref()).ok_or_else(|| {
            AgentError::NotFound(format!("No price found for {}", request.material))
        })?;
        debug!(event_name = "agent.price_found", material = %request.material, price, "material priced");

        Ok(MaterialPrice { material: request.material, price })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use brickwise_core::catalog::{EmptyCatalog, SeedCatalog};
    use serde_json::json;

    use crate::agents::fakes::CountingSearch;
    use crate::agents::{run_agent, MaterialPriceAgent};

    fn agent(search: &Arc<CountingSearch>) -> MaterialPriceAgent {
        MaterialPriceAgent::new(search.clone(), Arc::new(SeedCatalog))
    }

    #[tokio::test]
    async fn seeded_material_wins_over_live_snippets() {
        let search = Arc::new(CountingSearch::with_snippets(&["Bricks now ₹12 each"]));

        let result = run_agent(&agent(&search), json!({ "material": "Bricks" })).await;

        assert_eq!(result["price"], json!(8.0));
        assert_eq!(result["material"], json!("Bricks"));
        assert_eq!(result["error"], json!(null));
        assert_eq!(search.queries(), vec!["current price of Bricks in India 2025".to_string()]);
    }

    #[tokio::test]
    async fn live_price_is_used_for_unseeded_material() {
        let search = Arc::new(CountingSearch::with_snippets(&["no figure here", "Sand costs Rs. 55.5 per cft"]));

        let result = run_agent(&agent(&search), json!({ "material": "sand" })).await;

        assert_eq!(result["price"], json!(55.5));
    }

    #[tokio::test]
    async fn missing_material_makes_no_call() {
        let search = Arc::new(CountingSearch::default());

        let result = run_agent(&agent(&search), json!({ "material": "   " })).await;

        assert_eq!(result, json!({ "price": 100.0, "error": "No material provided" }));
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn non_mapping_input_makes_no_call() {
        let search = Arc::new(CountingSearch::default());

        let result = run_agent(&agent(&search), json!("bricks")).await;

        assert_eq!(result, json!({ "price": 100.0, "error": "Invalid state type: string" }));
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn miss_is_reported_with_default_price() {
        let search = Arc::new(CountingSearch::with_snippets(&["prices vary"]));
        let agent = MaterialPriceAgent::new(search.clone(), Arc::new(EmptyCatalog));

        let result = run_agent(&agent, json!({ "material": "granite" })).await;

        assert_eq!(result, json!({ "price": 100.0, "error": "No price found for granite" }));
    }

    #[tokio::test]
    async fn search_outage_still_answers_from_reference_data() {
        let search = Arc::new(CountingSearch::failing());

        let result = run_agent(&agent(&search), json!({ "material": "cement" })).await;

        assert_eq!(result["price"], json!(400.0));
        assert_eq!(search.calls(), 1);
    }

    #[tokio::test]
    async fn error_output_fed_back_is_still_well_formed() {
        let search = Arc::new(CountingSearch::default());
        let agent = agent(&search);

        let first = run_agent(&agent, json!({})).await;
        let second = run_agent(&agent, first.clone()).await;

        assert_eq!(second, first);
        assert_eq!(search.calls(), 0);
    }
}
