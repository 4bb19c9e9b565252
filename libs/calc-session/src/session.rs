//! Per-session calculator actor
//!
//! Token delivery is serialized behind an async mutex. `Equals` flips the
//! display to a placeholder immediately and evaluates out of band; the
//! completion applies a single corrective update.
//!
//! # Cancellation
//!
//! Cancel-and-restart: every state-changing token bumps the session epoch and
//! aborts the in-flight evaluation. A completion tagged with an older epoch is
//! dropped, so a superseded result can never overwrite newer state. Tokens that
//! leave the state untouched (a second `=` while pending, a function key in
//! basic mode) cancel nothing.

use std::sync::Arc;

use calc_engine::{BuilderState, ExpressionBuilder, InputToken, Mode};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::pipeline::{Evaluation, EvaluationPipeline};

#[derive(Default)]
struct SessionInner {
    state: BuilderState,
    epoch: u64,
    in_flight: Option<JoinHandle<()>>,
    last_outcome: Option<Result<Evaluation>>,
}

pub struct CalculatorSession {
    builder: ExpressionBuilder,
    pipeline: Arc<EvaluationPipeline>,
    inner: Arc<Mutex<SessionInner>>,
    /// Bumped whenever the session becomes idle
    settled: Arc<watch::Sender<u64>>,
}

impl CalculatorSession {
    pub fn new(mode: Mode, pipeline: Arc<EvaluationPipeline>) -> Self {
        let (settled, _) = watch::channel(0);
        Self {
            builder: ExpressionBuilder::new(mode),
            pipeline,
            inner: Arc::new(Mutex::new(SessionInner::default())),
            settled: Arc::new(settled),
        }
    }

    pub fn mode(&self) -> Mode {
        self.builder.mode()
    }

    pub fn pipeline(&self) -> &Arc<EvaluationPipeline> {
        &self.pipeline
    }

    pub async fn state(&self) -> BuilderState {
        self.inner.lock().await.state.clone()
    }

    pub async fn epoch(&self) -> u64 {
        self.inner.lock().await.epoch
    }

    /// Whether an evaluation is still running
    pub async fn is_busy(&self) -> bool {
        self.inner.lock().await.in_flight.is_some()
    }

    /// Outcome of the most recent settled evaluation
    pub async fn last_outcome(&self) -> Option<Result<Evaluation>> {
        self.inner.lock().await.last_outcome.clone()
    }

    /// Deliver one key press and return the optimistic state
    pub async fn press(&self, token: InputToken) -> BuilderState {
        let mut inner = self.inner.lock().await;
        let transition = self
            .builder
            .apply(&inner.state, token, self.pipeline.local().as_ref());

        if transition.submit.is_none() && transition.state == inner.state {
            return inner.state.clone();
        }

        inner.epoch += 1;
        if let Some(handle) = inner.in_flight.take() {
            handle.abort();
            debug!("Evaluation cancelled by epoch {}", inner.epoch);
            if transition.submit.is_none() {
                self.settled.send_modify(|n| *n += 1);
            }
        }
        inner.state = transition.state;

        if let Some(expression) = transition.submit {
            inner.last_outcome = None;
            inner.in_flight = Some(self.spawn_evaluation(expression, inner.epoch));
        }
        inner.state.clone()
    }

    /// Deliver tokens in order, returning the final optimistic state
    pub async fn press_all(&self, tokens: impl IntoIterator<Item = InputToken>) -> BuilderState {
        let mut state = self.state().await;
        for token in tokens {
            state = self.press(token).await;
        }
        state
    }

    /// Wait until no evaluation is in flight, then report the latest outcome
    pub async fn wait_settled(&self) -> Option<Result<Evaluation>> {
        let mut settled = self.settled.subscribe();
        loop {
            {
                let inner = self.inner.lock().await;
                if inner.in_flight.is_none() {
                    return inner.last_outcome.clone();
                }
            }
            if settled.changed().await.is_err() {
                return None;
            }
        }
    }

    fn spawn_evaluation(&self, expression: String, epoch: u64) -> JoinHandle<()> {
        let pipeline = self.pipeline.clone();
        let shared = self.inner.clone();
        let settled = self.settled.clone();

        debug!("Submitting '{}' at epoch {}", expression, epoch);
        tokio::spawn(async move {
            let outcome = pipeline.evaluate(&expression).await;
            if let Err(e) = &outcome {
                warn!("{}", e);
            }

            let mut inner = shared.lock().await;
            if inner.epoch != epoch {
                debug!(
                    "Discarding result of epoch {} (session at epoch {})",
                    epoch, inner.epoch
                );
                return;
            }
            inner.state = ExpressionBuilder::settle(
                &inner.state,
                outcome.as_ref().ok().map(Evaluation::result),
            );
            inner.last_outcome = Some(outcome);
            inner.in_flight = None;
            settled.send_modify(|n| *n += 1);
        })
    }
}
