//! Bundle Model
//!
//! A bundle is never stored. It is recomputed from the orders that share a
//! bundle reference (or that a customer placed together) on every request.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::order::OrderStatus;
use super::parcel::Dimensions;
use crate::util::serialize_money;

/// How a bundle was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleSource {
    /// Member orders carry the same bundle reference
    Explicit,
    /// Proposed from eligible orders of the same customer
    Implicit,
}

/// Bundle view returned to the console
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub id: String,
    pub order_ids: Vec<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    /// Ounces
    pub weight: f64,
    pub dimensions: Dimensions,
    #[serde(serialize_with = "serialize_money")]
    pub value: Decimal,
    pub status: OrderStatus,
    /// Earliest member creation time
    pub created_at: Option<DateTime<Utc>>,
    pub source: BundleSource,
}

/// Summary returned by the bundle status endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStatusView {
    pub bundle_id: String,
    pub status: OrderStatus,
    pub member_count: usize,
}
