//! Shipment metrics over a scope's full order list

use icona_client::OrderScope;
use shared::models::ShipmentMetrics;
use shared::shipping::compute_metrics;

use super::orders::load_orders;
use crate::error::ServiceResult;
use crate::state::AppState;

pub async fn shipment_metrics(
    state: &AppState,
    scope: &OrderScope,
) -> ServiceResult<ShipmentMetrics> {
    let parsed = load_orders(state.icona.as_ref(), scope).await?;
    Ok(compute_metrics(&parsed.orders))
}
