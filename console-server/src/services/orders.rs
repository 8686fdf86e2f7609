//! Order loading and the upstream parse boundary

use futures::{FutureExt, StreamExt, TryStreamExt, stream};
use icona_client::{ClientError, IconaApi, OrderScope};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, ParsedOrders, parse_order, parse_orders};

use crate::error::{ServiceError, ServiceResult};

/// `?userId=` or `?customer=` on console requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub customer: Option<String>,
}

impl ScopeQuery {
    /// Seller scope wins when both are given
    pub fn scope(&self) -> AppResult<OrderScope> {
        if let Some(user_id) = non_blank(&self.user_id) {
            return Ok(OrderScope::User(user_id.to_string()));
        }
        if let Some(customer) = non_blank(&self.customer) {
            return Ok(OrderScope::Customer(customer.to_string()));
        }
        Err(AppError::with_message(
            ErrorCode::ScopeRequired,
            "userId or customer query parameter is required",
        ))
    }

    /// Seller scope only
    pub fn user_scope(&self) -> AppResult<OrderScope> {
        match non_blank(&self.user_id) {
            Some(user_id) => Ok(OrderScope::User(user_id.to_string())),
            None => Err(AppError::with_message(
                ErrorCode::ScopeRequired,
                "userId query parameter is required",
            )),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Load every order in scope, unfiltered
pub async fn load_orders(icona: &dyn IconaApi, scope: &OrderScope) -> ServiceResult<ParsedOrders> {
    let raw = icona.list_orders(scope).await?;
    let total = raw.len();
    let parsed = parse_orders(raw);

    tracing::debug!(
        scope = %scope.id(),
        total,
        accepted = parsed.orders.len(),
        rejected = parsed.rejected.len(),
        "Loaded orders"
    );
    Ok(parsed)
}

/// Fetch one order by id and validate it
pub async fn fetch_order(icona: &dyn IconaApi, order_id: &str) -> ServiceResult<Order> {
    let raw = icona.get_order(order_id).await.map_err(|e| match e {
        ClientError::NotFound(_) => ServiceError::App(
            AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
                .with_detail("order_id", order_id),
        ),
        other => ServiceError::Upstream(other),
    })?;

    parse_order(raw).map_err(|e| {
        AppError::with_message(
            ErrorCode::OrderMalformed,
            format!("Order {order_id} could not be read: {e}"),
        )
        .with_detail("order_id", order_id)
        .into()
    })
}

/// Fetch several orders, aborting on the first failure
///
/// Results keep the order of `order_ids`.
pub async fn fetch_orders(
    icona: &dyn IconaApi,
    order_ids: &[String],
    limit: usize,
) -> ServiceResult<Vec<Order>> {
    stream::iter(order_ids.to_vec())
        .map(move |order_id| async move { fetch_order(icona, &order_id).await }.boxed())
        .buffered(limit.max(1))
        .try_collect()
        .await
}

/// Trim, drop blanks and duplicates, keep first-seen order
pub fn distinct_ids(order_ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    order_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}
