//! `/api/calculator` handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use calc_engine::{clean_expression, format_value, functions, is_safe, FunctionCatalog};
use calc_session::{CalculateRequest, CalculateResponse, ValidateResponse};
use common::AppError;
use tracing::debug;

use super::{json_rejection, ok, ApiResult};
use crate::app::AppState;

/// Cleaned expression, or a 400 when nothing is left
fn required_expression(request: &CalculateRequest) -> Result<String, AppError> {
    let expression = clean_expression(&request.expression);
    if expression.is_empty() {
        return Err(AppError::bad_request("Expression is required"));
    }
    Ok(expression)
}

pub async fn calculate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResult<CalculateResponse> {
    let Json(request) = payload.map_err(json_rejection)?;
    let expression = required_expression(&request)?;

    if !is_safe(&expression) {
        return Err(AppError::bad_request("Unsafe expression rejected").with_details(expression));
    }

    let value = state.evaluator.evaluate(&expression).map_err(|e| {
        debug!("Evaluation of '{}' failed: {}", expression, e);
        AppError::bad_request("Invalid expression").with_details(e.to_string())
    })?;

    let result = format_value(&value);
    debug!("Calculated '{}' = {}", expression, result);
    ok(CalculateResponse {
        expression,
        value,
        result,
    })
}

pub async fn validate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResult<ValidateResponse> {
    let Json(request) = payload.map_err(json_rejection)?;
    let expression = required_expression(&request)?;

    let valid = state.evaluator.validate(&expression);
    ok(ValidateResponse {
        valid,
        message: if valid {
            "Expression is valid".to_string()
        } else {
            "Expression is invalid".to_string()
        },
    })
}

pub async fn list_functions() -> ApiResult<FunctionCatalog> {
    ok(functions())
}
