//! Label purchase orchestration
//!
//! fetch → validate → aggregate → purchase → fan-out update, strictly in that
//! order. A purchased label is never rolled back: orders that could not be
//! updated are reported per order and kept in the reconciliation ledger.

use http::StatusCode;
use icona_client::{LabelPurchaseRequest, OrderPatch};
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, Parcel, ShippingAddress};
use shared::shipping::{generate_bundle_id, label_parcel};
use shared::util::format_money;

use super::fanout::{FanoutSummary, OrderUpdateResult, update_orders};
use super::orders::{distinct_ids, fetch_orders};
use crate::error::ServiceResult;
use crate::state::AppState;

/// What the caller asked to ship
#[derive(Debug, Clone)]
pub struct LabelOrder<'a> {
    pub order_ids: &'a [String],
    pub service: Option<String>,
    pub rate_id: &'a str,
}

/// Result of a label purchase or a retry of its order updates
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOutcome {
    /// Key for the reconciliation ledger
    pub bundle_id: String,
    pub tracking_number: String,
    pub label_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcel: Option<Parcel>,
    pub orders_updated: usize,
    pub orders_failed: usize,
    pub results: Vec<OrderUpdateResult>,
}

impl LabelOutcome {
    /// 200 all updated, 207 some, 500 none
    pub fn status(&self) -> StatusCode {
        FanoutSummary {
            succeeded: self.orders_updated,
            failed: self.orders_failed,
        }
        .status()
    }

    pub fn message(&self) -> String {
        match (self.orders_updated, self.orders_failed) {
            (n, 0) => format!("Label purchased and {n} order(s) updated"),
            (0, n) => format!("Label purchased but none of {n} order(s) could be updated"),
            (ok, failed) => format!("Label purchased; {ok} order(s) updated, {failed} failed"),
        }
    }
}

fn address_difference(
    expected: Option<&ShippingAddress>,
    actual: Option<&ShippingAddress>,
) -> Option<&'static str> {
    match (expected, actual) {
        (Some(a), Some(b)) => a.first_difference(b),
        (None, None) => None,
        _ => Some("address"),
    }
}

/// Orders shipped under one label must share customer, address and a
/// shippable status
pub fn validate_shipment(orders: &[Order]) -> AppResult<()> {
    let Some(reference) = orders.first() else {
        return Err(AppError::with_message(ErrorCode::RequiredField, "No orders to ship"));
    };

    if let Some(order) = orders.iter().find(|o| !o.status.is_shippable()) {
        return Err(AppError::with_message(
            ErrorCode::OrderStatusIneligible,
            format!("Order {} is {} and cannot be shipped", order.id, order.status),
        )
        .with_detail("order_id", order.id.as_str())
        .with_detail("field", "status")
        .with_detail("status", order.status.as_str()));
    }

    for order in &orders[1..] {
        if order.customer_id() != reference.customer_id() {
            return Err(AppError::with_message(
                ErrorCode::BundleCustomerMismatch,
                format!(
                    "Order {} belongs to a different customer than order {}",
                    order.id, reference.id
                ),
            )
            .with_detail("order_id", order.id.as_str())
            .with_detail("field", "customer"));
        }

        if let Some(field) =
            address_difference(reference.shipping_address(), order.shipping_address())
        {
            return Err(AppError::with_message(
                ErrorCode::BundleAddressMismatch,
                format!(
                    "Order {} ships to a different {field} than order {}",
                    order.id, reference.id
                ),
            )
            .with_detail("order_id", order.id.as_str())
            .with_detail("field", field));
        }
    }

    Ok(())
}

/// Bundle reference shared by every order, if there is one
fn common_bundle_ref(orders: &[Order]) -> Option<String> {
    let first = orders.first()?.bundle_id.as_deref()?;
    orders
        .iter()
        .all(|o| o.in_bundle(first))
        .then(|| first.to_string())
}

/// Purchase one label covering `request.order_ids`
///
/// `min_orders` is 2 for the bundle flow and 1 for a single order.
pub async fn purchase(
    state: &AppState,
    request: LabelOrder<'_>,
    min_orders: usize,
) -> ServiceResult<LabelOutcome> {
    let ids = distinct_ids(request.order_ids);
    if ids.len() < min_orders {
        let code = if min_orders > 1 {
            ErrorCode::BundleTooSmall
        } else {
            ErrorCode::RequiredField
        };
        return Err(AppError::with_message(
            code,
            format!("At least {min_orders} distinct order(s) required"),
        )
        .into());
    }
    let rate_id = request.rate_id.trim();
    if rate_id.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "rate_id is required").into());
    }

    // 1. fetch (fail fast) and 2. validate
    let orders = fetch_orders(state.icona.as_ref(), &ids, state.fanout_limit).await?;
    validate_shipment(&orders)?;

    // 3. aggregate
    let members: Vec<&Order> = orders.iter().collect();
    let parcel = label_parcel(&members);
    let bundle_id = common_bundle_ref(&orders).unwrap_or_else(|| generate_bundle_id(&ids));

    // 4. purchase
    let purchase = state
        .icona
        .purchase_label(&LabelPurchaseRequest {
            rate_id: rate_id.to_string(),
            service: request.service,
            order_ids: ids.clone(),
            parcel,
            to_address: orders.first().and_then(|o| o.shipping_address().cloned()),
        })
        .await?;

    if !purchase.success {
        return Err(AppError::with_message(
            ErrorCode::LabelPurchaseFailed,
            "Shipping provider declined the label purchase",
        )
        .with_detail("bundle_id", bundle_id.as_str())
        .into());
    }
    let Some(tracking_number) = purchase.tracking_number.clone() else {
        tracing::error!(bundle_id = %bundle_id, "Label purchase returned no tracking number");
        return Err(AppError::new(ErrorCode::MissingTrackingNumber)
            .with_detail("bundle_id", bundle_id.as_str())
            .into());
    };

    tracing::info!(
        bundle_id = %bundle_id,
        tracking_number = %tracking_number,
        orders = ids.len(),
        "Label purchased"
    );

    // 5. fan-out
    let patch = OrderPatch::label(tracking_number.as_str(), purchase.label_url.clone());
    let results = update_orders(state.icona.as_ref(), &ids, &patch, state.fanout_limit).await;
    let summary = FanoutSummary::of(&results);

    state.ledger.record(
        &bundle_id,
        &tracking_number,
        purchase.label_url.clone(),
        FanoutSummary::failed_ids(&results),
    );

    Ok(LabelOutcome {
        bundle_id,
        tracking_number,
        label_url: purchase.label_url,
        carrier: purchase.carrier,
        cost: Some(format_money(purchase.cost)),
        parcel: Some(parcel),
        orders_updated: summary.succeeded,
        orders_failed: summary.failed,
        results,
    })
}

/// Replay the tracking update for orders a purchase left behind
pub async fn retry_pending(state: &AppState, bundle_id: &str) -> ServiceResult<LabelOutcome> {
    let entry = state.ledger.get(bundle_id).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ReconciliationNotFound,
            format!("No pending label updates for {bundle_id}"),
        )
        .with_detail("bundle_id", bundle_id)
    })?;

    let patch = OrderPatch::label(entry.tracking_number.as_str(), entry.label_url.clone());
    let results = update_orders(
        state.icona.as_ref(),
        &entry.pending_order_ids,
        &patch,
        state.fanout_limit,
    )
    .await;
    let summary = FanoutSummary::of(&results);
    state.ledger.settle(
        bundle_id,
        &entry.tracking_number,
        FanoutSummary::failed_ids(&results),
    );

    tracing::info!(
        bundle_id = %bundle_id,
        updated = summary.succeeded,
        failed = summary.failed,
        "Retried pending label updates"
    );

    Ok(LabelOutcome {
        bundle_id: entry.bundle_id,
        tracking_number: entry.tracking_number,
        label_url: entry.label_url,
        carrier: None,
        cost: None,
        parcel: None,
        orders_updated: summary.succeeded,
        orders_failed: summary.failed,
        results,
    })
}
