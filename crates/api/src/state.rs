use std::sync::Arc;

use crate::config::ServerConfig;
use crate::swap::SwapOrchestrator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: slotswap_db::DbPool,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Swap transaction coordinator.
    pub swaps: Arc<SwapOrchestrator>,
}

impl AppState {
    pub fn new(pool: slotswap_db::DbPool, config: ServerConfig) -> Self {
        Self {
            swaps: Arc::new(SwapOrchestrator::new(pool.clone())),
            pool,
            config: Arc::new(config),
        }
    }
}
