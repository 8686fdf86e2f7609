//! Shipping rate estimates for a set of orders

use icona_client::{RateRequest, ShippingRate};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::Parcel;
use shared::shipping::label_parcel;

use super::labels::validate_shipment;
use super::orders::{distinct_ids, fetch_orders};
use crate::error::ServiceResult;
use crate::state::AppState;

/// Parcel that would be shipped and the rates offered for it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEstimate {
    pub order_ids: Vec<String>,
    pub parcel: Parcel,
    pub rates: Vec<ShippingRate>,
}

pub async fn estimate(state: &AppState, order_ids: &[String]) -> ServiceResult<RateEstimate> {
    let ids = distinct_ids(order_ids);
    if ids.is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, "orderIds must not be empty").into(),
        );
    }

    let orders = fetch_orders(state.icona.as_ref(), &ids, state.fanout_limit).await?;
    validate_shipment(&orders)?;

    let members: Vec<_> = orders.iter().collect();
    let parcel = label_parcel(&members);
    let request = RateRequest {
        order_ids: ids.clone(),
        parcel,
        to_address: orders.first().and_then(|o| o.shipping_address().cloned()),
    };

    let rates = state.icona.estimate_rates(&request).await?;
    if rates.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RateNotFound,
            "No shipping rates available for these orders",
        )
        .into());
    }

    tracing::debug!(orders = ids.len(), rates = rates.len(), "Rates estimated");
    Ok(RateEstimate {
        order_ids: ids,
        parcel,
        rates,
    })
}
