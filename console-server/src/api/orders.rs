//! Order endpoints: list with parse report, bundle creation

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderStatus, RejectedOrder};
use shared::response::ApiResponse;

use super::ApiResult;
use super::extract::AppJson;
use crate::services::bundles::{self, CreatedBundle};
use crate::services::orders::{ScopeQuery, load_orders};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders))
        .route("/api/orders/bundle/orders", post(create_bundle))
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(flatten)]
    pub scope: ScopeQuery,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub rejected: Vec<RejectedOrder>,
}

/// GET /api/orders?userId=|customer=&status=
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<OrderList> {
    let scope = query.scope.scope()?;
    let parsed = load_orders(state.icona.as_ref(), &scope).await?;

    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty() && *s != "all")
        .map(OrderStatus::from);
    let orders = match status {
        Some(status) => parsed
            .orders
            .into_iter()
            .filter(|o| o.status == status)
            .collect(),
        None => parsed.orders,
    };

    Ok(Json(OrderList {
        orders,
        rejected: parsed.rejected,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBundleRequest {
    #[serde(default)]
    pub order_ids: Vec<String>,
}

/// POST /api/orders/bundle/orders
pub async fn create_bundle(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateBundleRequest>,
) -> ApiResult<ApiResponse<CreatedBundle>> {
    let created = bundles::create_bundle(&state, &req.order_ids).await?;
    let message = format!("Bundled {} orders", created.order_ids.len());
    Ok(Json(ApiResponse::ok_with_message(created, message)))
}
