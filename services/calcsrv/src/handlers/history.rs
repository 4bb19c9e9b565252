//! `/api/history` handlers

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use calc_history::api::{
    ClearResponse, DeleteResponse, HistoryListResponse, ListQuery, DEFAULT_PAGE_LIMIT,
};
use calc_history::{HistoryError, HistoryRecord, HistoryStats, NewRecord};
use common::{AppError, SuccessResponse};
use tracing::{error, info};

use super::{json_rejection, ok, query_rejection, ApiResult};
use crate::app::AppState;

fn storage_error(e: HistoryError) -> AppError {
    error!("History log failure: {}", e);
    AppError::internal_error("History log unavailable").with_details(e.to_string())
}

pub async fn list_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<HistoryListResponse> {
    let Query(query) = query.map_err(query_rejection)?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let page = state
        .history
        .list(limit, offset)
        .await
        .map_err(storage_error)?;
    ok(HistoryListResponse {
        records: page.records,
        total: page.total,
        limit,
        offset,
    })
}

pub async fn add_history(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<SuccessResponse<HistoryRecord>>), AppError> {
    let Json(mut new_record) = payload.map_err(json_rejection)?;
    new_record.expression = new_record.expression.trim().to_string();
    new_record.result = new_record.result.trim().to_string();
    if new_record.expression.is_empty() || new_record.result.is_empty() {
        return Err(AppError::bad_request("Expression and result are required"));
    }

    let stored = state
        .history
        .add(new_record.into_record())
        .await
        .map_err(storage_error)?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(stored))))
}

pub async fn delete_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DeleteResponse> {
    if !state.history.delete(&id).await.map_err(storage_error)? {
        return Err(AppError::not_found("History record not found").with_details(id));
    }
    ok(DeleteResponse { id })
}

pub async fn clear_history(State(state): State<Arc<AppState>>) -> ApiResult<ClearResponse> {
    let removed = state.history.clear().await.map_err(storage_error)?;
    info!("Cleared {} history records", removed);
    ok(ClearResponse { removed })
}

pub async fn history_stats(State(state): State<Arc<AppState>>) -> ApiResult<HistoryStats> {
    ok(state.history.stats().await.map_err(storage_error)?)
}
