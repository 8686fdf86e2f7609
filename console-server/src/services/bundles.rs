//! Bundle lifecycle: discovery, creation, dissolution and status

use icona_client::{OrderPatch, OrderScope};
use serde::Serialize;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::{Bundle, BundleSource, BundleStatusView, Order, OrderStatus};
use shared::shipping::{
    build_bundle, bundle_members, derive_bundle_status, discover_bundles, generate_bundle_id,
};

use super::fanout::{FanoutSummary, OrderUpdateResult, update_orders};
use super::orders::{distinct_ids, fetch_orders, load_orders};
use crate::error::ServiceResult;
use crate::state::AppState;

/// Every bundle visible to `scope`
pub async fn list_bundles(state: &AppState, scope: &OrderScope) -> ServiceResult<Vec<Bundle>> {
    let parsed = load_orders(state.icona.as_ref(), scope).await?;
    Ok(discover_bundles(&parsed.orders))
}

/// One bundle by id, explicit or implicit
pub async fn get_bundle(
    state: &AppState,
    scope: &OrderScope,
    bundle_id: &str,
) -> ServiceResult<Bundle> {
    let parsed = load_orders(state.icona.as_ref(), scope).await?;

    let members = bundle_members(&parsed.orders, bundle_id);
    if !members.is_empty() {
        return Ok(build_bundle(bundle_id, &members, BundleSource::Explicit));
    }

    discover_bundles(&parsed.orders)
        .into_iter()
        .find(|b| b.id == bundle_id)
        .ok_or_else(|| bundle_not_found(bundle_id).into())
}

/// Derived status of a bundle over the scope's full order set
///
/// A bundle with no members reports processing.
pub async fn bundle_status(
    state: &AppState,
    scope: &OrderScope,
    bundle_id: &str,
) -> ServiceResult<BundleStatusView> {
    let parsed = load_orders(state.icona.as_ref(), scope).await?;
    let members = bundle_members(&parsed.orders, bundle_id);

    Ok(BundleStatusView {
        bundle_id: bundle_id.to_string(),
        status: derive_bundle_status(members.iter().map(|o| &o.status)),
        member_count: members.len(),
    })
}

/// Result of a bundle creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBundle {
    pub bundle_id: String,
    pub order_ids: Vec<String>,
    /// Upstream response body
    pub upstream: Value,
}

/// Check that selected orders can form a new bundle
///
/// Every order must be processing, unbundled, and belong to the same
/// customer. Offending ids are named in the error.
pub fn validate_new_bundle(orders: &[Order]) -> Result<(), AppError> {
    let ineligible: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status != OrderStatus::Processing)
        .collect();
    if !ineligible.is_empty() {
        let ids: Vec<&str> = ineligible.iter().map(|o| o.id.as_str()).collect();
        let detail: Vec<Value> = ineligible
            .iter()
            .map(|o| serde_json::json!({ "orderId": o.id, "status": o.status }))
            .collect();
        return Err(AppError::with_message(
            ErrorCode::OrderStatusIneligible,
            format!("Only processing orders can be bundled: {}", ids.join(", ")),
        )
        .with_detail("orders", detail));
    }

    let bundled: Vec<&str> = orders
        .iter()
        .filter(|o| o.is_bundled())
        .map(|o| o.id.as_str())
        .collect();
    if !bundled.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::OrderAlreadyBundled,
            format!("Orders already belong to a bundle: {}", bundled.join(", ")),
        )
        .with_detail("order_ids", bundled));
    }

    let first_customer = orders.iter().find_map(|o| o.customer_id());
    if let Some(expected) = first_customer {
        let mismatched: Vec<&str> = orders
            .iter()
            .filter(|o| o.customer_id().is_some_and(|c| c != expected))
            .map(|o| o.id.as_str())
            .collect();
        if !mismatched.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::BundleCustomerMismatch,
                format!(
                    "Orders belong to a different customer than {expected}: {}",
                    mismatched.join(", ")
                ),
            )
            .with_detail("order_ids", mismatched));
        }
    }

    Ok(())
}

/// Assign a shared bundle to the selected orders
pub async fn create_bundle(state: &AppState, order_ids: &[String]) -> ServiceResult<CreatedBundle> {
    let ids = distinct_ids(order_ids);
    if ids.len() < 2 {
        return Err(AppError::with_message(
            ErrorCode::BundleTooSmall,
            "At least two distinct orders are required to create a bundle",
        )
        .into());
    }

    let orders = fetch_orders(state.icona.as_ref(), &ids, state.fanout_limit).await?;
    validate_new_bundle(&orders)?;

    let assigned = state.icona.assign_bundle(&ids).await?;
    let bundle_id = assigned
        .bundle_id
        .unwrap_or_else(|| generate_bundle_id(&ids));

    tracing::info!(bundle_id = %bundle_id, orders = ids.len(), "Bundle created");

    Ok(CreatedBundle {
        bundle_id,
        order_ids: ids,
        upstream: assigned.body,
    })
}

/// Result of dissolving a bundle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbundleOutcome {
    pub bundle_id: String,
    pub orders_unbundled: usize,
    pub orders_failed: usize,
    pub results: Vec<OrderUpdateResult>,
}

/// Clear the bundle reference on every member of `bundle_id`
///
/// Failures are collected per order; the caller decides the response status
/// from the counts.
pub async fn unbundle(
    state: &AppState,
    scope: &OrderScope,
    bundle_id: &str,
) -> ServiceResult<UnbundleOutcome> {
    let parsed = load_orders(state.icona.as_ref(), scope).await?;
    let member_ids: Vec<String> = bundle_members(&parsed.orders, bundle_id)
        .into_iter()
        .map(|o| o.id.clone())
        .collect();
    if member_ids.is_empty() {
        return Err(bundle_not_found(bundle_id).into());
    }

    let results = update_orders(
        state.icona.as_ref(),
        &member_ids,
        &OrderPatch::clear_bundle(),
        state.fanout_limit,
    )
    .await;
    let summary = FanoutSummary::of(&results);

    if summary.failed > 0 {
        tracing::warn!(
            bundle_id = %bundle_id,
            unbundled = summary.succeeded,
            failed = summary.failed,
            "Bundle partially dissolved"
        );
    } else {
        tracing::info!(bundle_id = %bundle_id, orders = summary.succeeded, "Bundle dissolved");
    }

    Ok(UnbundleOutcome {
        bundle_id: bundle_id.to_string(),
        orders_unbundled: summary.succeeded,
        orders_failed: summary.failed,
        results,
    })
}

fn bundle_not_found(bundle_id: &str) -> AppError {
    AppError::with_message(ErrorCode::BundleNotFound, format!("Bundle {bundle_id} not found"))
        .with_detail("bundle_id", bundle_id)
}
