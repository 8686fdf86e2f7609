//! Bounded fan-out of per-order upstream updates

use std::future::Future;

use futures::stream;
use futures::{FutureExt, StreamExt};
use http::StatusCode;
use icona_client::{IconaApi, OrderPatch};
use serde::Serialize;

/// Run `task` over `items` with at most `limit` futures in flight
///
/// Results come back in input order.
pub async fn run_bounded<I, F, Fut, T>(items: I, limit: usize, task: F) -> Vec<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(items)
        .map(task)
        .buffered(limit.max(1))
        .collect()
        .await
}

/// Outcome of one order update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateResult {
    pub order_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrderUpdateResult {
    pub fn ok(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(order_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Success and failure counts over a fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl FanoutSummary {
    pub fn of(results: &[OrderUpdateResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    /// 200 when everything landed, 207 when some did, 500 when none did
    pub fn status(&self) -> StatusCode {
        match (self.succeeded, self.failed) {
            (_, 0) => StatusCode::OK,
            (0, _) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::MULTI_STATUS,
        }
    }

    pub fn failed_ids(results: &[OrderUpdateResult]) -> Vec<String> {
        results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.order_id.clone())
            .collect()
    }
}

/// Apply `patch` to every order, never stopping at the first failure
pub async fn update_orders(
    icona: &dyn IconaApi,
    order_ids: &[String],
    patch: &OrderPatch,
    limit: usize,
) -> Vec<OrderUpdateResult> {
    run_bounded(order_ids.to_vec(), limit, move |order_id: String| {
        async move {
            match icona.update_order(&order_id, patch).await {
                Ok(()) => OrderUpdateResult::ok(order_id),
                Err(e) => {
                    tracing::warn!(order_id = %order_id, error = %e, "Order update failed");
                    OrderUpdateResult::failed(order_id, e.to_string())
                }
            }
        }
        .boxed()
    })
    .await
}
