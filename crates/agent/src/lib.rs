//! Agent runtime - service adapters, agents, and workflow orchestration
//!
//! This crate turns a request mapping into a construction suggestion:
//! - Wraps the web-search and text-generation services behind async traits
//! - Implements one agent per capability (price, competitors, cost,
//!   schedule, permits, bid) on a shared typed contract
//! - Orchestrates single-agent workflows and the composite cost workflow
//!
//! # Architecture
//!
//! 1. **Adapters** (`search`, `llm`) - one call each, `Result` out, no panics
//! 2. **Agents** (`agents`) - parse typed requests from `State`, call at most
//!    one adapter, feed results through the extractors in `brickwise-core`
//! 3. **Workflows** (`workflow`) - state defaults, result-shape checks, and
//!    the price-then-estimate short circuit
//! 4. **Runtime** (`runtime`) - builds adapters once and refuses to route to
//!    a service that failed to initialize
//!
//! # Key Types
//!
//! - `AgentRuntime` - entry point used by front ends
//! - `Agent` / `StateHandler` - typed agent contract and its JSON surface
//! - `SearchClient` / `LlmClient` - pluggable service adapters
//!
//! Arithmetic and reference data never come from the text-generation
//! service; it only writes schedules and bid narratives.

pub mod agents;
pub mod llm;
pub mod runtime;
pub mod search;
mod transport;
pub mod workflow;

pub use agents::{run_agent, Agent, StateHandler};
pub use llm::{GeminiClient, LlmClient};
pub use runtime::{AgentRuntime, ServiceReadiness};
pub use search::{search_client_from_config, SearchClient, SerperClient, TavilyClient};
pub use workflow::{estimate_cost, invoke, WorkflowKind};
