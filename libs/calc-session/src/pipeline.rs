//! Remote-then-local evaluation pipeline
//!
//! Every submitted expression goes through the same steps:
//!
//! 1. clean (whitespace, display glyphs) and reject empty input
//! 2. safety pre-screen; a rejection never reaches an evaluator
//! 3. remote evaluator, bounded by a timeout; any failure falls through
//! 4. local evaluator; its failure is the pipeline's failure
//! 5. format the value and append a history record

use std::sync::Arc;
use std::time::Duration;

use calc_engine::{clean_expression, format_value, is_safe, Evaluator, Value};
use calc_history::{HistoryRecord, HistoryStore, SyncWarning};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, RemoteError, Result};
use crate::remote::RemoteEvaluator;

/// Which evaluator produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalSource {
    Remote,
    Local,
}

/// Successful evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Record appended to history
    pub record: HistoryRecord,
    pub value: Value,
    pub source: EvalSource,
    /// Remote failure that forced the local fallback
    pub fallback: Option<RemoteError>,
    /// Remote history sync failure; the local append still happened
    pub sync_warning: Option<SyncWarning>,
}

impl Evaluation {
    /// Formatted result
    pub fn result(&self) -> &str {
        &self.record.result
    }
}

pub struct EvaluationPipeline {
    local: Arc<dyn Evaluator>,
    remote: Option<Arc<dyn RemoteEvaluator>>,
    remote_timeout: Duration,
    history: Arc<HistoryStore>,
}

impl EvaluationPipeline {
    /// Local-only pipeline
    pub fn new(local: Arc<dyn Evaluator>, history: Arc<HistoryStore>) -> Self {
        Self {
            local,
            remote: None,
            remote_timeout: Duration::from_secs(3),
            history,
        }
    }

    /// Try `remote` first, giving up after `timeout`
    pub fn with_remote(mut self, remote: Arc<dyn RemoteEvaluator>, timeout: Duration) -> Self {
        self.remote = Some(remote);
        self.remote_timeout = timeout;
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn local(&self) -> &Arc<dyn Evaluator> {
        &self.local
    }

    /// Evaluate `expression` and record it on success
    pub async fn evaluate(&self, expression: &str) -> Result<Evaluation> {
        let expression = clean_expression(expression);
        if expression.is_empty() {
            return Err(PipelineError::eval(expression, "Expression is empty"));
        }
        if !is_safe(&expression) {
            info!("Rejected unsafe expression '{}'", expression);
            return Err(PipelineError::UnsafeExpression(expression));
        }

        let (value, source, fallback) = match self.evaluate_remote(&expression).await {
            Some(Ok(value)) => (value, EvalSource::Remote, None),
            Some(Err(e)) => {
                warn!(
                    "Remote evaluation of '{}' failed, falling back to local: {}",
                    expression, e
                );
                (self.evaluate_local(&expression)?, EvalSource::Local, Some(e))
            },
            None => (self.evaluate_local(&expression)?, EvalSource::Local, None),
        };

        let result = format_value(&value);
        debug!("Evaluated '{}' = {} ({:?})", expression, result, source);

        let record = HistoryRecord::new(expression, result);
        let sync_warning = self.history.append(record.clone()).await;

        Ok(Evaluation {
            record,
            value,
            source,
            fallback,
            sync_warning,
        })
    }

    /// Side-effect-free probe: nothing is recorded and the remote is not consulted
    pub fn validate(&self, expression: &str) -> bool {
        let expression = clean_expression(expression);
        !expression.is_empty() && self.local.validate(&expression)
    }

    async fn evaluate_remote(
        &self,
        expression: &str,
    ) -> Option<std::result::Result<Value, RemoteError>> {
        let remote = self.remote.as_ref()?;
        let call = remote.evaluate(expression);
        let outcome = match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RemoteError::Timeout(self.remote_timeout.as_millis() as u64)),
        };
        Some(outcome)
    }

    fn evaluate_local(&self, expression: &str) -> Result<Value> {
        self.local
            .evaluate(expression)
            .map_err(|e| PipelineError::eval(expression, e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use async_trait::async_trait;
    use calc_engine::CalcEngine;
    use calc_history::{LocalHistoryLog, MemoryBlobStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    /// Local evaluator that counts calls
    struct CountingEvaluator {
        inner: CalcEngine,
        calls: AtomicUsize,
    }

    impl CountingEvaluator {
        fn new() -> Self {
            Self {
                inner: CalcEngine::new().unwrap(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Evaluator for CountingEvaluator {
        fn evaluate(&self, expression: &str) -> calc_engine::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.evaluate(expression)
        }
    }

    enum Scripted {
        Answer(Value),
        Fail,
        Hang,
    }

    struct ScriptedRemote {
        behaviour: Scripted,
        calls: AtomicUsize,
    }

    impl ScriptedRemote {
        fn new(behaviour: Scripted) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RemoteEvaluator for ScriptedRemote {
        async fn evaluate(&self, _expression: &str) -> std::result::Result<Value, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Scripted::Answer(value) => Ok(value.clone()),
                Scripted::Fail => Err(RemoteError::Transport("connection refused".to_string())),
                Scripted::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Value::Real(0.0))
                },
            }
        }
    }

    fn engine() -> Arc<CalcEngine> {
        Arc::new(CalcEngine::new().unwrap())
    }

    fn history() -> Arc<HistoryStore> {
        Arc::new(HistoryStore::new(
            LocalHistoryLog::new(Arc::new(MemoryBlobStore::new())),
            None,
        ))
    }

    #[tokio::test]
    async fn test_local_evaluation_is_recorded() {
        let history = history();
        let pipeline = EvaluationPipeline::new(engine(), history.clone());

        let evaluation = pipeline.evaluate("5 + 3").await.unwrap();
        assert_eq!(evaluation.result(), "8");
        assert_eq!(evaluation.source, EvalSource::Local);
        assert_eq!(evaluation.fallback, None);

        let records = history.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expression, "5 + 3");
        assert_eq!(records[0].result, "8");
    }

    #[tokio::test]
    async fn test_expression_is_cleaned_before_evaluation() {
        let pipeline = EvaluationPipeline::new(engine(), history());

        let evaluation = pipeline.evaluate("  6  ×  7 ").await.unwrap();
        assert_eq!(evaluation.record.expression, "6 * 7");
        assert_eq!(evaluation.result(), "42");
    }

    #[tokio::test]
    async fn test_unsafe_expression_never_reaches_an_evaluator() {
        let local = Arc::new(CountingEvaluator::new());
        let remote = ScriptedRemote::new(Scripted::Answer(Value::Real(1.0)));
        let history = history();
        let pipeline = EvaluationPipeline::new(local.clone(), history.clone())
            .with_remote(remote.clone(), Duration::from_secs(1));

        let err = pipeline.evaluate("require('fs')").await.unwrap_err();
        assert_eq!(err, PipelineError::UnsafeExpression("require('fs')".to_string()));
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_expression_is_eval_error() {
        let local = Arc::new(CountingEvaluator::new());
        let pipeline = EvaluationPipeline::new(local.clone(), history());

        let err = pipeline.evaluate("   ").await.unwrap_err();
        assert!(matches!(err, PipelineError::Eval { .. }));
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_local_failure_keeps_expression() {
        let history = history();
        let pipeline = EvaluationPipeline::new(engine(), history.clone());

        let err = pipeline.evaluate("5 +* 3").await.unwrap_err();
        assert_eq!(err.expression(), "5 +* 3");
        assert!(matches!(err, PipelineError::Eval { .. }));
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_remote_result_is_formatted_by_pipeline() {
        let local = Arc::new(CountingEvaluator::new());
        let remote = ScriptedRemote::new(Scripted::Answer(Value::Real(0.1 + 0.2)));
        let pipeline = EvaluationPipeline::new(local.clone(), history())
            .with_remote(remote, Duration::from_secs(1));

        let evaluation = pipeline.evaluate("0.1 + 0.2").await.unwrap();
        assert_eq!(evaluation.source, EvalSource::Remote);
        assert_eq!(evaluation.result(), "0.3");
        assert_eq!(local.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_both_paths_render_the_same() {
        let remote_pipeline = EvaluationPipeline::new(engine(), history())
            .with_remote(
                ScriptedRemote::new(Scripted::Answer(Value::Real(1.0 / 3.0))),
                Duration::from_secs(1),
            );
        let local_pipeline = EvaluationPipeline::new(engine(), history());

        let remote = remote_pipeline.evaluate("1 / 3").await.unwrap();
        let local = local_pipeline.evaluate("1 / 3").await.unwrap();
        assert_eq!(remote.source, EvalSource::Remote);
        assert_eq!(local.source, EvalSource::Local);
        assert_eq!(remote.result(), local.result());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unreachable_remote_falls_back_to_local() {
        let history = history();
        let pipeline = EvaluationPipeline::new(engine(), history.clone())
            .with_remote(ScriptedRemote::new(Scripted::Fail), Duration::from_secs(1));

        let evaluation = pipeline.evaluate("2^10").await.unwrap();
        assert_eq!(evaluation.result(), "1024");
        assert_eq!(evaluation.source, EvalSource::Local);
        assert!(matches!(evaluation.fallback, Some(RemoteError::Transport(_))));
        assert!(logs_contain("falling back to local"));
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_slow_remote_times_out_and_falls_back() {
        let history = history();
        let pipeline = EvaluationPipeline::new(engine(), history.clone())
            .with_remote(ScriptedRemote::new(Scripted::Hang), Duration::from_millis(50));

        let evaluation = pipeline.evaluate("2^10").await.unwrap();
        assert_eq!(evaluation.result(), "1024");
        assert_eq!(evaluation.fallback, Some(RemoteError::Timeout(50)));
        assert!(logs_contain("timed out after 50 ms"));

        let records = history.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expression, "2^10");
    }

    #[test]
    fn test_validate() {
        let pipeline = EvaluationPipeline::new(engine(), history());
        assert!(pipeline.validate("sqrt(16) + 1"));
        assert!(!pipeline.validate("5 +"));
        assert!(!pipeline.validate("eval(1)"));
        assert!(!pipeline.validate(""));
    }
}
