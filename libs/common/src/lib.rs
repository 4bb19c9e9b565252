//! Basic library shared by the calculator service and CLI
//!
//! Provides:
//! - logging setup and HTTP access logging
//! - layered configuration loading (figment)
//! - the JSON response envelope and `AppError`
//! - graceful shutdown signal handling

pub mod api_types;
pub mod config_loader;
pub mod error;
pub mod logging;
pub mod shutdown;

pub use error::{Error, Result};

// Re-export commonly used API types
pub use api_types::{ErrorInfo, ErrorResponse, HealthStatus, SuccessResponse};

// Re-export AppError when axum feature is enabled
#[cfg(feature = "axum")]
pub use api_types::AppError;

pub use config_loader::load_config;
pub use logging::{init_logging, init_test_logging, LogConfig, LogFormat};
