use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::EngineState;
use crate::errors::EngineResult;

/// Application state that can be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Core layer state: provider chain, challenge cache, analysis client
    pub engine: EngineState,
}

impl AppState {
    pub fn new(config: ServerConfig) -> EngineResult<Arc<Self>> {
        let engine = EngineState::new(&config)?;
        Ok(Arc::new(Self { config, engine }))
    }
}
