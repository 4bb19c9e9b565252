//! calcsrv - Calculator service
//!
//! Serves the remote evaluator (`/api/calculator/*`) and a bulk, capacity-bounded
//! history log (`/api/history*`) that calculator clients mirror their history to.

pub mod app;
pub mod config;
pub mod handlers;
pub mod routes;

pub use app::AppState;
pub use config::Config;
pub use routes::create_routes;

pub const SERVICE_NAME: &str = "calcsrv";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
