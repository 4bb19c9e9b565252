//! Client wiring: configuration to pipeline, history and sessions

use std::sync::Arc;

use calc_engine::{CalcEngine, Mode};
use calc_history::{
    FileBlobStore, HistoryLog, HistoryStore, HttpHistoryLog, LocalHistoryLog, SyncWarning,
};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::pipeline::EvaluationPipeline;
use crate::remote::HttpRemoteEvaluator;
use crate::session::CalculatorSession;

/// Everything a front end needs, built from one [`ClientConfig`]
pub struct CalculatorClient {
    config: ClientConfig,
    pipeline: Arc<EvaluationPipeline>,
}

impl CalculatorClient {
    /// Build the client without touching persisted history
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let local = LocalHistoryLog::new(Arc::new(FileBlobStore::new(&config.history_dir)))
            .with_capacity(config.history_cap);
        let remote_log: Option<Arc<dyn HistoryLog>> = match &config.remote_url {
            Some(url) => Some(Arc::new(HttpHistoryLog::new(
                url.as_str(),
                config.remote_timeout(),
            )?)),
            None => None,
        };
        let history = HistoryStore::new(local, remote_log)
            .with_cap(config.history_cap)
            .with_sync_enabled(config.sync_enabled);

        let engine = Arc::new(CalcEngine::new()?);
        let mut pipeline = EvaluationPipeline::new(engine, Arc::new(history));
        if let Some(url) = &config.remote_url {
            let remote = HttpRemoteEvaluator::new(url.as_str(), config.remote_timeout())?;
            pipeline = pipeline.with_remote(Arc::new(remote), config.remote_timeout());
            info!("Remote evaluator at {}", url);
        }

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
        })
    }

    /// Build the client and load history, returning any sync warnings
    pub async fn connect(config: ClientConfig) -> Result<(Self, Vec<SyncWarning>), ClientError> {
        let client = Self::new(config)?;
        let warnings = client.history().load().await;
        Ok((client, warnings))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Arc<EvaluationPipeline> {
        &self.pipeline
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        self.pipeline.history()
    }

    /// New session in the configured mode
    pub fn session(&self) -> CalculatorSession {
        self.session_with_mode(self.config.mode)
    }

    pub fn session_with_mode(&self, mode: Mode) -> CalculatorSession {
        CalculatorSession::new(mode, self.pipeline.clone())
    }
}
