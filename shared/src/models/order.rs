//! Order Model
//!
//! Upstream order records arrive as loosely-typed JSON, often with the same
//! field under both camelCase and snake_case keys. Spellings are folded onto
//! one key, decoded into [`RawOrder`] (lenient numerics, optional everything)
//! and validated into [`Order`] before any aggregation runs. Records without
//! an identifier are rejected rather than defaulted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::util::{
    de_flag, de_money, de_opt_id, de_opt_measure, de_quantity, de_string, serialize_money,
    value_to_id,
};

/// Order lifecycle status
///
/// The set is defined upstream; values this service does not know are kept
/// verbatim in [`OrderStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    #[default]
    Processing,
    Unfulfilled,
    ReadyToShip,
    Shipping,
    Shipped,
    Delivered,
    Cancelled,
    Ended,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Unfulfilled => "unfulfilled",
            Self::ReadyToShip => "ready_to_ship",
            Self::Shipping => "shipping",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Ended => "ended",
            Self::Other(s) => s,
        }
    }

    /// Statuses a label may be purchased for
    pub fn is_shippable(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Processing | Self::Unfulfilled | Self::ReadyToShip
        )
    }

    /// Counted as delivered in shipment metrics
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered | Self::Ended)
    }

    /// Counted as pending delivery in shipment metrics
    pub fn is_in_transit(&self) -> bool {
        matches!(self, Self::Shipping | Self::Shipped)
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "unfulfilled" => Self::Unfulfilled,
            "ready_to_ship" | "readytoship" => Self::ReadyToShip,
            "shipping" => Self::Shipping,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            "ended" => Self::Ended,
            "" => Self::Processing,
            _ => Self::Other(normalized),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipping address, compared field by field when bundling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAddress {
    #[serde(alias = "address1", alias = "addressLine1", deserialize_with = "de_string")]
    pub street: String,
    #[serde(deserialize_with = "de_string")]
    pub city: String,
    #[serde(alias = "province", deserialize_with = "de_string")]
    pub state: String,
    #[serde(alias = "postalCode", alias = "zipCode", deserialize_with = "de_string")]
    pub zip: String,
    #[serde(deserialize_with = "de_string")]
    pub country: String,
}

impl ShippingAddress {
    /// True when street, city, state and zip are all blank
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.zip]
            .iter()
            .all(|f| f.trim().is_empty())
    }

    /// Compare street, city, state and zip; returns the first field that differs
    pub fn first_difference(&self, other: &ShippingAddress) -> Option<&'static str> {
        let same = |a: &str, b: &str| a.trim().eq_ignore_ascii_case(b.trim());
        if !same(&self.street, &other.street) {
            Some("street")
        } else if !same(&self.city, &other.city) {
            Some("city")
        } else if !same(&self.state, &other.state) {
            Some("state")
        } else if !same(&self.zip, &other.zip) {
            Some("zip")
        } else {
            None
        }
    }
}

/// Customer reference embedded in an order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<ShippingAddress>,
}

/// Order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, alias = "productName", deserialize_with = "de_opt_id")]
    pub name: Option<String>,
    #[serde(default = "one", deserialize_with = "de_quantity")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "de_money", alias = "unit_price", alias = "unitPrice")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "de_opt_measure")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_measure")]
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_measure")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_measure")]
    pub height: Option<f64>,
}

fn one() -> u32 {
    1
}

impl OrderItem {
    /// Whether any physical dimension is declared on this line
    pub fn has_dimensions(&self) -> bool {
        self.length.is_some() || self.width.is_some() || self.height.is_some()
    }
}

/// Order-level shipping profile (used by giveaways, which carry no item weights)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingProfile {
    #[serde(deserialize_with = "de_opt_measure")]
    pub weight: Option<f64>,
    #[serde(deserialize_with = "de_opt_measure")]
    pub length: Option<f64>,
    #[serde(deserialize_with = "de_opt_measure")]
    pub width: Option<f64>,
    #[serde(deserialize_with = "de_opt_measure")]
    pub height: Option<f64>,
}

impl ShippingProfile {
    pub fn has_dimensions(&self) -> bool {
        self.length.is_some() || self.width.is_some() || self.height.is_some()
    }
}

/// Upstream customer object
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCustomer {
    #[serde(rename = "_id", deserialize_with = "de_opt_id")]
    pub mongo_id: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub name: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub username: Option<String>,
    pub address: Option<ShippingAddress>,
}

impl RawCustomer {
    fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.clone() {
            return Some(name);
        }
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return Some(full);
        }
        self.username.clone()
    }
}

/// Order record exactly as decoded from upstream JSON
///
/// Field names are the canonical snake_case spellings; [`parse_order`] folds
/// upstream's camelCase variants onto them before decoding. Identifier
/// spellings that can legitimately differ (`_id` and `id`, `seller` and
/// `sellerId`) stay separate fields and are merged in [`Order::try_from`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawOrder {
    #[serde(rename = "_id", deserialize_with = "de_opt_id")]
    pub mongo_id: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(rename = "orderId", deserialize_with = "de_opt_id")]
    pub order_id: Option<String>,
    pub customer: Option<Value>,
    #[serde(deserialize_with = "de_opt_id")]
    pub customer_id: Option<String>,
    pub seller: Option<Value>,
    #[serde(deserialize_with = "de_opt_id")]
    pub seller_id: Option<String>,
    pub items: Option<Vec<OrderItem>>,
    #[serde(deserialize_with = "de_money")]
    pub subtotal: Decimal,
    #[serde(deserialize_with = "de_money")]
    pub total: Decimal,
    #[serde(deserialize_with = "de_money")]
    pub tax: Decimal,
    #[serde(deserialize_with = "de_money")]
    pub service_fee: Decimal,
    #[serde(deserialize_with = "de_money")]
    pub shipping_fee: Decimal,
    #[serde(deserialize_with = "de_opt_id")]
    pub status: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub tracking_number: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub label_url: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub bundle_id: Option<String>,
    #[serde(deserialize_with = "de_opt_id")]
    pub order_type: Option<String>,
    #[serde(deserialize_with = "de_flag")]
    pub giveaway: bool,
    pub shipping_profile: Option<ShippingProfile>,
    pub shipping_address: Option<ShippingAddress>,
    #[serde(deserialize_with = "de_opt_id")]
    pub created_at: Option<String>,
}

/// Validated order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub seller_id: Option<String>,
    pub items: Vec<OrderItem>,
    #[serde(serialize_with = "serialize_money")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub tax: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub service_fee: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub shipping_fee: Decimal,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub label_url: Option<String>,
    pub bundle_id: Option<String>,
    pub is_giveaway: bool,
    pub shipping_profile: Option<ShippingProfile>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn customer_id(&self) -> Option<&str> {
        self.customer.id.as_deref()
    }

    pub fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.customer.address.as_ref().filter(|a| !a.is_blank())
    }

    pub fn is_bundled(&self) -> bool {
        self.bundle_id.is_some()
    }

    pub fn has_tracking(&self) -> bool {
        self.tracking_number.is_some()
    }

    /// Whether this order belongs to `bundle_id`
    pub fn in_bundle(&self, bundle_id: &str) -> bool {
        self.bundle_id.as_deref() == Some(bundle_id)
    }
}

/// Why an upstream record was not accepted
#[derive(Debug, Error)]
pub enum OrderParseError {
    #[error("order record is not an object: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("order record has no id")]
    MissingId,
}

impl TryFrom<RawOrder> for Order {
    type Error = OrderParseError;

    fn try_from(raw: RawOrder) -> Result<Self, Self::Error> {
        let id = raw
            .mongo_id
            .or(raw.id)
            .or(raw.order_id)
            .ok_or(OrderParseError::MissingId)?;

        let raw_customer = match raw.customer {
            Some(value @ Value::Object(_)) => serde_json::from_value::<RawCustomer>(value.clone())
                .unwrap_or_else(|_| RawCustomer {
                    id: value_to_id(&value),
                    ..RawCustomer::default()
                }),
            Some(other) => RawCustomer {
                id: value_to_id(&other),
                ..RawCustomer::default()
            },
            None => RawCustomer::default(),
        };
        let customer = Customer {
            name: raw_customer.display_name(),
            id: raw
                .customer_id
                .or(raw_customer.mongo_id)
                .or(raw_customer.id),
            address: raw.shipping_address.or(raw_customer.address),
        };

        let is_giveaway = raw.giveaway
            || raw
                .order_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("giveaway"));

        let created_at = raw.created_at.as_deref().and_then(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        Ok(Order {
            id,
            customer,
            seller_id: raw.seller_id.or_else(|| raw.seller.as_ref().and_then(value_to_id)),
            items: raw.items.unwrap_or_default(),
            subtotal: raw.subtotal,
            total: raw.total,
            tax: raw.tax,
            service_fee: raw.service_fee,
            shipping_fee: raw.shipping_fee,
            status: raw.status.map(OrderStatus::from).unwrap_or_default(),
            tracking_number: raw.tracking_number,
            label_url: raw.label_url,
            bundle_id: raw.bundle_id,
            is_giveaway,
            shipping_profile: raw.shipping_profile,
            created_at,
        })
    }
}

/// Spellings upstream uses for one order field, canonical name first
const ORDER_SPELLINGS: &[&[&str]] = &[
    &["customer_id", "customerId"],
    &["seller_id", "sellerId"],
    &["total", "totalAmount"],
    &["service_fee", "serviceFee"],
    &["shipping_fee", "shippingFee"],
    &["tracking_number", "trackingNumber"],
    &["label_url", "labelUrl"],
    &["bundle_id", "bundleId"],
    &["order_type", "orderType", "type"],
    &["giveaway", "isGiveaway"],
    &["shipping_profile", "shippingProfile"],
    &["shipping_address", "shippingAddress"],
    &["created_at", "createdAt"],
];

const CUSTOMER_SPELLINGS: &[&[&str]] = &[
    &["first_name", "firstName"],
    &["last_name", "lastName"],
    &["username", "userName"],
    &["address", "shippingAddress", "shipping_address"],
];

const ADDRESS_SPELLINGS: &[&[&str]] = &[
    &["street", "address1", "addressLine1"],
    &["state", "province"],
    &["zip", "postalCode", "zipCode"],
];

const ITEM_SPELLINGS: &[&[&str]] = &[
    &["name", "productName"],
    &["price", "unit_price", "unitPrice"],
];

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Collapse every spelling of a field onto its canonical key
///
/// The first present value wins, in table order; a blank canonical value is
/// kept only when no spelling carries anything better.
fn fold_spellings(value: &mut Value, table: &[&[&str]]) {
    let Value::Object(map) = value else {
        return;
    };
    for spellings in table {
        let mut found: Vec<Value> = spellings
            .iter()
            .filter_map(|key| map.remove(*key))
            .collect();
        let pick = found.iter().position(is_present).unwrap_or(0);
        if pick < found.len() {
            map.insert(spellings[0].to_string(), found.swap_remove(pick));
        }
    }
}

fn fold_order_spellings(value: &mut Value) {
    fold_spellings(value, ORDER_SPELLINGS);
    let Value::Object(map) = value else {
        return;
    };
    if let Some(address) = map.get_mut("shipping_address") {
        fold_spellings(address, ADDRESS_SPELLINGS);
    }
    if let Some(Value::Array(items)) = map.get_mut("items") {
        items
            .iter_mut()
            .for_each(|item| fold_spellings(item, ITEM_SPELLINGS));
    }
    if let Some(customer) = map.get_mut("customer") {
        fold_spellings(customer, CUSTOMER_SPELLINGS);
        if let Some(address) = customer.get_mut("address") {
            fold_spellings(address, ADDRESS_SPELLINGS);
        }
    }
}

/// Decode and validate a single upstream record
pub fn parse_order(mut value: Value) -> Result<Order, OrderParseError> {
    fold_order_spellings(&mut value);
    let raw: RawOrder = serde_json::from_value(value)?;
    Order::try_from(raw)
}

/// Upstream record that failed validation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedOrder {
    /// Position in the upstream list
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// Result of decoding an upstream order list
#[derive(Debug, Clone, Default)]
pub struct ParsedOrders {
    pub orders: Vec<Order>,
    pub rejected: Vec<RejectedOrder>,
}

/// Decode a list of upstream records, keeping the good ones and reporting the rest
pub fn parse_orders(values: Vec<Value>) -> ParsedOrders {
    let mut parsed = ParsedOrders::default();
    for (index, value) in values.into_iter().enumerate() {
        let id = value.get("_id").or_else(|| value.get("id")).and_then(value_to_id);
        match parse_order(value) {
            Ok(order) => parsed.orders.push(order),
            Err(e) => {
                tracing::warn!(index, order_id = ?id, error = %e, "Rejected upstream order record");
                parsed.rejected.push(RejectedOrder {
                    index,
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_normalization() {
        assert_eq!(OrderStatus::from("Processing"), OrderStatus::Processing);
        assert_eq!(OrderStatus::from("ready-to-ship"), OrderStatus::ReadyToShip);
        assert_eq!(OrderStatus::from("canceled"), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::from(""), OrderStatus::Processing);
        assert_eq!(
            OrderStatus::from("on_hold"),
            OrderStatus::Other("on_hold".into())
        );
        assert_eq!(String::from(OrderStatus::ReadyToShip), "ready_to_ship");
    }

    #[test]
    fn test_status_groups() {
        assert!(OrderStatus::Unfulfilled.is_shippable());
        assert!(!OrderStatus::Shipped.is_shippable());
        assert!(OrderStatus::Ended.is_delivered());
        assert!(OrderStatus::Shipping.is_in_transit());
        assert!(!OrderStatus::Delivered.is_in_transit());
    }

    #[test]
    fn test_parse_full_record() {
        let order = parse_order(json!({
            "_id": "o-1",
            "customer": {
                "_id": "c-1",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "address": { "street": "1 Main St", "city": "Austin", "state": "TX", "zip": "73301" }
            },
            "seller": { "_id": "s-1" },
            "items": [{ "quantity": 2, "price": "9.50", "weight": "4oz" }],
            "total": 19,
            "tax": 1.52,
            "service_fee": "0.95",
            "shipping_fee": 5,
            "status": "processing",
            "bundleId": "",
            "createdAt": "2025-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(order.id, "o-1");
        assert_eq!(order.customer_id(), Some("c-1"));
        assert_eq!(order.customer.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(order.shipping_address().unwrap().zip, "73301");
        assert_eq!(order.seller_id.as_deref(), Some("s-1"));
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].weight, Some(4.0));
        assert_eq!(order.service_fee.to_string(), "0.95");
        assert!(!order.is_bundled(), "blank bundle id means unbundled");
        assert!(!order.is_giveaway);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_parse_giveaway_flags() {
        let by_type = parse_order(json!({ "id": "g-1", "orderType": "Giveaway" })).unwrap();
        assert!(by_type.is_giveaway);

        let by_flag = parse_order(json!({ "id": "g-2", "giveaway": true })).unwrap();
        assert!(by_flag.is_giveaway);
    }

    #[test]
    fn test_mongo_and_plain_ids_side_by_side() {
        let order = parse_order(json!({
            "_id": "64f0",
            "id": "64f0",
            "seller": { "_id": "s-1" },
            "sellerId": "s-1",
            "customer": { "_id": "c-9", "id": "c-9", "name": null },
            "shippingAddress": { "street": null, "zip": 73301 },
            "isGiveaway": "true"
        }))
        .unwrap();
        assert_eq!(order.id, "64f0");
        assert_eq!(order.seller_id.as_deref(), Some("s-1"));
        assert_eq!(order.customer_id(), Some("c-9"));
        assert_eq!(order.shipping_address().unwrap().zip, "73301");
        assert!(order.is_giveaway);
    }

    #[test]
    fn test_duplicate_spellings_are_folded() {
        let order = parse_order(json!({
            "_id": "o-1",
            "type": "auction",
            "orderType": "giveaway",
            "trackingNumber": "1Z999",
            "tracking_number": "",
            "total": 10,
            "totalAmount": 12,
            "shippingFee": null,
            "shipping_fee": "4.5",
            "items": [{ "name": "mug", "productName": "Mug", "price": 3, "unitPrice": 4 }],
            "shippingAddress": { "zip": "78701", "postalCode": "99999", "street": "1 Main" },
            "customer": { "_id": "c-1", "firstName": "Ana", "first_name": "Ana" }
        }))
        .unwrap();

        assert!(order.is_giveaway);
        assert_eq!(order.tracking_number.as_deref(), Some("1Z999"));
        assert_eq!(order.total, Decimal::from(10));
        assert_eq!(order.shipping_fee.to_string(), "4.5");
        assert_eq!(order.items[0].name.as_deref(), Some("mug"));
        assert_eq!(order.items[0].price, Decimal::from(3));
        assert_eq!(order.shipping_address().unwrap().zip, "78701");
        assert_eq!(order.customer.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_missing_fields_default() {
        let order = parse_order(json!({ "id": 77 })).unwrap();
        assert_eq!(order.id, "77");
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.total, Decimal::ZERO);
        assert!(order.items.is_empty());
        assert!(order.customer.id.is_none());
    }

    #[test]
    fn test_top_level_address_wins() {
        let order = parse_order(json!({
            "id": "o-2",
            "customer": { "id": "c-1", "address": { "zip": "11111" } },
            "shippingAddress": { "zip": "22222" }
        }))
        .unwrap();
        assert_eq!(order.shipping_address().unwrap().zip, "22222");
    }

    #[test]
    fn test_parse_orders_rejects_without_id() {
        let parsed = parse_orders(vec![
            json!({ "id": "o-1" }),
            json!({ "status": "processing" }),
            json!("not an order"),
        ]);
        assert_eq!(parsed.orders.len(), 1);
        assert_eq!(parsed.rejected.len(), 2);
        assert_eq!(parsed.rejected[0].index, 1);
        assert_eq!(parsed.rejected[1].index, 2);
    }

    #[test]
    fn test_address_difference() {
        let a = ShippingAddress {
            street: "1 Main St".into(),
            city: "Austin".into(),
            state: "TX".into(),
            zip: "73301".into(),
            country: "US".into(),
        };
        let mut b = a.clone();
        b.city = " austin ".into();
        assert_eq!(a.first_difference(&b), None);

        b.zip = "73302".into();
        assert_eq!(a.first_difference(&b), Some("zip"));
    }
}
