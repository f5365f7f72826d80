pub mod catalog;
pub mod config;
pub mod errors;
pub mod estimation;
pub mod extraction;
pub mod search;
pub mod state;

pub use catalog::{EmptyCatalog, ReferenceData, SeedCatalog};
pub use errors::{AgentError, ServiceError, ServiceKind};
pub use estimation::{CostEstimate, CostInputs};
pub use search::{SearchHit, SearchResponse};
pub use state::State;
