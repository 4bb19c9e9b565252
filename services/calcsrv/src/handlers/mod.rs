//! HTTP handlers

pub mod calculator;
pub mod history;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::response::Json;
use common::{AppError, HealthStatus, SuccessResponse};

use crate::{SERVICE_NAME, SERVICE_VERSION};

pub type ApiResult<T> = Result<Json<SuccessResponse<T>>, AppError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(SuccessResponse::new(data)))
}

pub(crate) fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::bad_request("Invalid request body").with_details(rejection.body_text())
}

pub(crate) fn query_rejection(rejection: QueryRejection) -> AppError {
    AppError::bad_request("Invalid query parameters").with_details(rejection.body_text())
}

pub async fn health_check() -> Json<SuccessResponse<HealthStatus>> {
    Json(SuccessResponse::new(HealthStatus::ok(
        SERVICE_NAME,
        SERVICE_VERSION,
    )))
}
