//! Bundle endpoints: list, detail, status, dissolve

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use shared::error::AppError;
use shared::models::{Bundle, BundleStatusView};
use shared::response::ApiResponse;

use super::ApiResult;
use crate::services::bundles;
use crate::services::orders::ScopeQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bundles", get(list_bundles))
        .route(
            "/api/bundles/{bundle_id}",
            get(get_bundle).delete(delete_bundle),
        )
        .route("/api/bundles/{bundle_id}/status", get(bundle_status))
}

/// GET /api/bundles?userId=|customer=
pub async fn list_bundles(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Vec<Bundle>> {
    let scope = query.scope()?;
    Ok(Json(bundles::list_bundles(&state, &scope).await?))
}

/// GET /api/bundles/{bundle_id}?userId=|customer=
pub async fn get_bundle(
    State(state): State<AppState>,
    Path(bundle_id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Bundle> {
    let scope = query.scope()?;
    Ok(Json(bundles::get_bundle(&state, &scope, &bundle_id).await?))
}

/// GET /api/bundles/{bundle_id}/status?userId=|customer=
pub async fn bundle_status(
    State(state): State<AppState>,
    Path(bundle_id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<BundleStatusView> {
    let scope = query.scope()?;
    Ok(Json(bundles::bundle_status(&state, &scope, &bundle_id).await?))
}

/// DELETE /api/bundles/{bundle_id}?userId=
///
/// 200 when at least one member was released, 500 when none was. The body
/// always carries per-order results.
pub async fn delete_bundle(
    State(state): State<AppState>,
    Path(bundle_id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Response, AppError> {
    let scope = query.user_scope()?;
    let outcome = bundles::unbundle(&state, &scope, &bundle_id).await?;

    let response = if outcome.orders_unbundled == 0 {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failed_with_data(
                format!("Failed to unbundle any of {} order(s)", outcome.orders_failed),
                outcome,
            )),
        )
    } else {
        let message = if outcome.orders_failed == 0 {
            format!("Unbundled {} order(s)", outcome.orders_unbundled)
        } else {
            format!(
                "Unbundled {} order(s), {} failed",
                outcome.orders_unbundled, outcome.orders_failed
            )
        };
        (StatusCode::OK, Json(ApiResponse::ok_with_message(outcome, message)))
    };
    Ok(response.into_response())
}
