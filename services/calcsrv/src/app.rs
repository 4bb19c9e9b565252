//! Application state shared across all handlers

use std::sync::Arc;

use calc_engine::{CalcEngine, Evaluator};
use calc_history::{HistoryLog, MemoryHistoryLog};

use crate::config::Config;

pub struct AppState {
    pub config: Arc<Config>,
    pub evaluator: Arc<dyn Evaluator>,
    /// Bulk log owned by this service instance
    pub history: Arc<dyn HistoryLog>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let evaluator = CalcEngine::new()?;
        let history = MemoryHistoryLog::new(config.history.capacity);
        Ok(Self::with_parts(config, Arc::new(evaluator), Arc::new(history)))
    }

    pub fn with_parts(
        config: Config,
        evaluator: Arc<dyn Evaluator>,
        history: Arc<dyn HistoryLog>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            evaluator,
            history,
        })
    }
}
