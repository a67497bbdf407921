//! Entitlement-aware search

mod orchestrator;
mod types;

pub use orchestrator::SearchOrchestrator;
pub use types::{NO_AGENCY_ACCESS, SearchOutcome, SearchRequest, SearchResponse};
