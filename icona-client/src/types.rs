//! Request and response payloads exchanged with Icona

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared::models::{OrderStatus, Parcel, ShippingAddress};
use shared::util::{de_money, de_opt_id, value_to_id};

use crate::{ClientError, ClientResult};

/// Whose orders to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderScope {
    /// Orders sold by a seller account
    User(String),
    /// Orders placed by a customer
    Customer(String),
}

impl OrderScope {
    /// Query parameter sent upstream
    pub fn query(&self) -> [(&'static str, &str); 1] {
        match self {
            Self::User(id) => [("userId", id.as_str())],
            Self::Customer(id) => [("customer", id.as_str())],
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::User(id) | Self::Customer(id) => id,
        }
    }
}

/// Partial order update
///
/// `bundle_id: Some(None)` serializes as `"bundleId": null`, clearing the
/// reference; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    /// Remove the order from its bundle
    pub fn clear_bundle() -> Self {
        Self {
            bundle_id: Some(None),
            ..Default::default()
        }
    }

    /// Attach a purchased label and mark the order ready to ship
    pub fn label(tracking_number: impl Into<String>, label_url: Option<String>) -> Self {
        Self {
            tracking_number: Some(tracking_number.into()),
            label_url,
            status: Some(OrderStatus::ReadyToShip),
            ..Default::default()
        }
    }
}

/// Body of the bundle assignment call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleAssignment<'a> {
    pub order_ids: &'a [String],
}

/// Upstream answer to a bundle assignment
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedBundle {
    /// Bundle id chosen upstream, if it returned one
    pub bundle_id: Option<String>,
    /// Unwrapped response body
    pub body: Value,
}

impl AssignedBundle {
    pub fn from_body(body: Value) -> Self {
        let bundle_id = ["bundleId", "bundle_id"]
            .iter()
            .find_map(|key| body.get(*key).and_then(value_to_id))
            .or_else(|| body.get("bundle").and_then(value_to_id));
        Self { bundle_id, body }
    }
}

/// Rate estimate request
#[derive(Debug, Clone, Serialize)]
pub struct RateRequest {
    pub order_ids: Vec<String>,
    pub parcel: Parcel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<ShippingAddress>,
}

/// Rate offered by the shipping provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRate {
    #[serde(alias = "rateId", alias = "object_id", deserialize_with = "de_opt_id", default)]
    pub rate_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub carrier: Option<String>,
    #[serde(default, alias = "servicelevel", deserialize_with = "de_opt_id")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "de_money")]
    pub amount: Decimal,
    #[serde(default, alias = "estimatedDays")]
    pub estimated_days: Option<u32>,
}

/// Label purchase request
#[derive(Debug, Clone, Serialize)]
pub struct LabelPurchaseRequest {
    pub rate_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub order_ids: Vec<String>,
    pub parcel: Parcel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<ShippingAddress>,
}

fn yes() -> bool {
    true
}

/// Label purchase response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPurchase {
    #[serde(default = "yes")]
    pub success: bool,
    #[serde(default, alias = "trackingNumber", deserialize_with = "de_opt_id")]
    pub tracking_number: Option<String>,
    #[serde(default, alias = "labelUrl", deserialize_with = "de_opt_id")]
    pub label_url: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub carrier: Option<String>,
    #[serde(default, deserialize_with = "de_money")]
    pub cost: Decimal,
}

/// Strip a `{ "data": ... }` envelope if present
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Extract a list from a bare array, `{ data: [...] }`, or `{ <key>: [...] }`
pub fn unwrap_list(value: Value, key: &str) -> ClientResult<Vec<Value>> {
    match unwrap_data(value) {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ClientError::InvalidResponse(format!(
                "expected a list of {key}"
            ))),
        },
        other => Err(ClientError::InvalidResponse(format!(
            "expected a list of {key}, got {other}"
        ))),
    }
}
