//! Shipping endpoints: metrics, rate estimates, label purchase, reconciliation

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::ShipmentMetrics;
use shared::response::ApiResponse;

use super::ApiResult;
use super::extract::AppJson;
use crate::services::labels::{self, LabelOrder, LabelOutcome};
use crate::services::metrics::shipment_metrics;
use crate::services::orders::ScopeQuery;
use crate::services::rates::{self, RateEstimate};
use crate::services::reconciliation::PendingLabel;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shipping/metrics", get(metrics))
        .route("/api/shipping/estimate", post(estimate))
        .route("/api/shipping/labels", post(purchase_label))
        .route("/api/shipping/labels/bundle", post(purchase_bundle_label))
        .route("/api/shipping/labels/pending", get(pending_labels))
        .route("/api/shipping/labels/bundle/retry", post(retry_bundle_label))
}

/// GET /api/shipping/metrics?userId=|customer=
pub async fn metrics(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<ShipmentMetrics> {
    let scope = query.scope()?;
    Ok(Json(shipment_metrics(&state, &scope).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(default)]
    pub order_ids: Vec<String>,
}

/// POST /api/shipping/estimate
pub async fn estimate(
    State(state): State<AppState>,
    AppJson(req): AppJson<EstimateRequest>,
) -> ApiResult<ApiResponse<RateEstimate>> {
    let estimate = rates::estimate(&state, &req.order_ids).await?;
    let message = format!("{} rate(s) available", estimate.rates.len());
    Ok(Json(ApiResponse::ok_with_message(estimate, message)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleLabelRequest {
    pub order_id: String,
    pub service: Option<String>,
    #[serde(rename = "rate_id", alias = "rateId", default)]
    pub rate_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleLabelRequest {
    #[serde(default)]
    pub order_ids: Vec<String>,
    pub service: Option<String>,
    #[serde(rename = "rate_id", alias = "rateId", default)]
    pub rate_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryRequest {
    pub bundle_id: String,
}

/// Status follows the update fan-out: 200 all, 207 some, 500 none
fn label_response(outcome: LabelOutcome) -> Response {
    let status = outcome.status();
    let message = outcome.message();
    let body = if outcome.orders_failed == 0 {
        ApiResponse::ok_with_message(outcome, message)
    } else {
        ApiResponse::failed_with_data(message, outcome)
    };
    (status, Json(body)).into_response()
}

/// POST /api/shipping/labels
pub async fn purchase_label(
    State(state): State<AppState>,
    AppJson(req): AppJson<SingleLabelRequest>,
) -> Result<Response, AppError> {
    let order_ids = [req.order_id];
    let outcome = labels::purchase(
        &state,
        LabelOrder {
            order_ids: &order_ids,
            service: req.service,
            rate_id: &req.rate_id,
        },
        1,
    )
    .await?;
    Ok(label_response(outcome))
}

/// POST /api/shipping/labels/bundle
pub async fn purchase_bundle_label(
    State(state): State<AppState>,
    AppJson(req): AppJson<BundleLabelRequest>,
) -> Result<Response, AppError> {
    let outcome = labels::purchase(
        &state,
        LabelOrder {
            order_ids: &req.order_ids,
            service: req.service,
            rate_id: &req.rate_id,
        },
        2,
    )
    .await?;
    Ok(label_response(outcome))
}

/// GET /api/shipping/labels/pending
pub async fn pending_labels(State(state): State<AppState>) -> ApiResult<Vec<PendingLabel>> {
    Ok(Json(state.ledger.list()))
}

/// POST /api/shipping/labels/bundle/retry
pub async fn retry_bundle_label(
    State(state): State<AppState>,
    AppJson(req): AppJson<RetryRequest>,
) -> Result<Response, AppError> {
    let outcome = labels::retry_pending(&state, req.bundle_id.trim()).await?;
    Ok(label_response(outcome))
}
