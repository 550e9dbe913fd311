use axum::{
    extract::{Query, State},
    Extension, Json,
};
use parkon_search::GeocodedPostcode;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeQuery {
    pub q: Option<String>,
}

pub(super) async fn geocode_postcode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<ApiResponse<GeocodedPostcode>>, ApiError> {
    let Some(postcode) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query parameter q is required",
        ));
    };

    match state.geocoder.lookup(postcode).await {
        Ok(Some(found)) => Ok(Json(ApiResponse {
            data: found,
            meta: ResponseMeta::new(req_id.0),
        })),
        Ok(None) => Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("postcode {postcode} not found"),
        )),
        Err(e) => {
            tracing::warn!(error = %e, "postcode lookup failed");
            Err(ApiError::new(
                req_id.0,
                "bad_gateway",
                "postcode lookup is unavailable",
            ))
        }
    }
}
