use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sentinel_store::api_queries;

use crate::middleware::RequestId;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

const NOT_READY_MESSAGE: &str = "Data is still being processed. Please wait.";

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct ProcessingStatus {
    pub ready: bool,
    /// `false` when processing had already been marked done.
    pub changed: bool,
}

type Records = Vec<Map<String, Value>>;

fn ensure_ready(state: &AppState, req_id: &RequestId) -> Result<(), ApiError> {
    if state.readiness.is_ready() {
        Ok(())
    } else {
        Err(ApiError::new(req_id.0.clone(), "not_ready", NOT_READY_MESSAGE))
    }
}

pub(super) async fn list_antisemitic_with_weapon(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Records>>, ApiError> {
    ensure_ready(&state, &req_id)?;
    let data = api_queries::list_antisemitic_with_weapon(&*state.store, normalize_limit(query.limit))
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_two_or_more_weapons(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Records>>, ApiError> {
    ensure_ready(&state, &req_id)?;
    let data = api_queries::list_two_or_more_weapons(&*state.store, normalize_limit(query.limit))
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn processing_done(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ProcessingStatus>> {
    let changed = state.readiness.mark_ready();
    if changed {
        tracing::info!(request_id = %req_id.0, "processing marked done; read endpoints enabled");
    }
    Json(ApiResponse {
        data: ProcessingStatus {
            ready: true,
            changed,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
