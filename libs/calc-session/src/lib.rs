//! calc-session - Evaluation pipeline and calculator sessions
//!
//! - [`EvaluationPipeline`]: clean, safety check, remote evaluator with a bounded
//!   wait, local fallback, formatting and the history append
//! - [`CalculatorSession`]: one keypad session; serializes key presses and keeps
//!   at most one evaluation in flight (newer input cancels older evaluations)
//! - [`CalculatorClient`]: builds both from a [`ClientConfig`]
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use calc_engine::{parse_keys, CalcEngine, Mode};
//! use calc_history::{HistoryStore, LocalHistoryLog, MemoryBlobStore};
//! use calc_session::{CalculatorSession, EvaluationPipeline};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread()
//! #     .enable_all()
//! #     .build()
//! #     .unwrap();
//! # rt.block_on(async {
//! let history = Arc::new(HistoryStore::new(
//!     LocalHistoryLog::new(Arc::new(MemoryBlobStore::new())),
//!     None,
//! ));
//! let pipeline = EvaluationPipeline::new(Arc::new(CalcEngine::new().unwrap()), history);
//! let session = CalculatorSession::new(Mode::Basic, Arc::new(pipeline));
//!
//! session.press_all(parse_keys("5 + 3 =").unwrap()).await;
//! session.wait_settled().await;
//! assert_eq!(session.state().await.display, "8");
//! # });
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod remote;
pub mod session;

pub use api::{CalculateRequest, CalculateResponse, ValidateResponse};
pub use client::CalculatorClient;
pub use config::ClientConfig;
pub use error::{ClientError, PipelineError, RemoteError, Result};
pub use pipeline::{EvalSource, Evaluation, EvaluationPipeline};
pub use remote::{HttpRemoteEvaluator, RemoteEvaluator};
pub use session::CalculatorSession;
