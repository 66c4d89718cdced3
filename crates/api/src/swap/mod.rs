//! Swap engine.
//!
//! - [`orchestrator`] -- transactional create/respond operations.
//! - [`query`] -- read-only views over slots and swap requests.

pub mod orchestrator;
pub mod query;

pub use orchestrator::SwapOrchestrator;
