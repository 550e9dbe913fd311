use axum::{
    extract::{Query, State},
    Extension, Json,
};
use parkon_core::{CallerPrivilege, SearchResult};
use parkon_search::{RawSearchParams, SearchError};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState, ResponseMeta};

/// Search envelope: the usual `data`/`meta` pair plus the summary message.
#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    pub data: SearchResult,
    pub message: String,
    pub meta: ResponseMeta,
}

pub(super) async fn search_parking(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(privilege): Extension<CallerPrivilege>,
    Query(params): Query<RawSearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let result = state
        .search
        .search(&params, privilege)
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;

    Ok(Json(SearchResponse {
        message: result.message.clone(),
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    match error {
        SearchError::Validation(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        other => {
            tracing::error!(error = %other, "parking search failed");
            ApiError::new(request_id, "internal_error", "search failed")
        }
    }
}
