//! Shipment Metrics Model

use rust_decimal::Decimal;
use serde::Serialize;

use crate::util::serialize_money;

/// Seller-facing shipping KPIs
///
/// Monetary fields serialize as strings with exactly two decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentMetrics {
    /// Item revenue plus tax
    #[serde(serialize_with = "serialize_money")]
    pub total_sold: Decimal,
    /// Net paid out to the seller
    #[serde(serialize_with = "serialize_money")]
    pub total_earned: Decimal,
    /// Shipping absorbed by the seller (giveaways only)
    #[serde(serialize_with = "serialize_money")]
    pub total_shipping_spend: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_service_fees: Decimal,
    /// Always zero until coupons are wired upstream
    #[serde(serialize_with = "serialize_money")]
    pub total_coupon_spend: Decimal,
    pub items_sold: u64,
    pub total_delivered: usize,
    pub pending_delivery: usize,
    pub order_count: usize,
}
