//! Shipment metrics
//!
//! Shipping and service fees are pass-through costs and never count as
//! revenue. Shipping only becomes a seller cost on giveaways.

use rust_decimal::Decimal;

use crate::models::{Order, ShipmentMetrics};
use crate::util::round_money;

/// Σ quantity × price over items, plus tax
fn items_revenue(order: &Order) -> Decimal {
    let items: Decimal = order
        .items
        .iter()
        .map(|i| Decimal::from(i.quantity) * i.price)
        .sum();
    items + order.tax
}

/// Item count; an order without broken-out items counts as one unit
fn items_count(order: &Order) -> u64 {
    if order.items.is_empty() {
        1
    } else {
        order.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Compute seller KPIs over a full order list
pub fn compute_metrics(orders: &[Order]) -> ShipmentMetrics {
    let mut metrics = ShipmentMetrics {
        order_count: orders.len(),
        ..Default::default()
    };

    for order in orders {
        metrics.total_sold += items_revenue(order);
        metrics.total_service_fees += order.service_fee;
        if order.is_giveaway {
            metrics.total_shipping_spend += order.shipping_fee;
        }
        metrics.items_sold += items_count(order);
        if order.status.is_delivered() {
            metrics.total_delivered += 1;
        }
        if order.status.is_in_transit() {
            metrics.pending_delivery += 1;
        }
    }

    metrics.total_earned = metrics.total_sold
        - metrics.total_shipping_spend
        - metrics.total_service_fees
        - metrics.total_coupon_spend;

    metrics.total_sold = round_money(metrics.total_sold);
    metrics.total_earned = round_money(metrics.total_earned);
    metrics.total_shipping_spend = round_money(metrics.total_shipping_spend);
    metrics.total_service_fees = round_money(metrics.total_service_fees);
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_order;
    use serde_json::json;

    fn orders(values: Vec<serde_json::Value>) -> Vec<Order> {
        values.into_iter().map(|v| parse_order(v).unwrap()).collect()
    }

    #[test]
    fn test_only_giveaway_shipping_is_spend() {
        let list = orders(vec![
            json!({ "id": "g", "orderType": "giveaway", "shipping_fee": 5 }),
            json!({ "id": "p", "shipping_fee": 10, "items": [{ "quantity": 1, "price": 20 }] }),
        ]);
        let json = serde_json::to_value(compute_metrics(&list)).unwrap();
        assert_eq!(json["totalShippingSpend"], "5.00");
        assert_eq!(json["totalSold"], "20.00");
        assert_eq!(json["totalEarned"], "15.00");
    }

    #[test]
    fn test_items_sold_defaults_to_one_without_items() {
        let list = orders(vec![
            json!({ "id": "a", "items": [{ "quantity": 2 }, { "quantity": 3 }] }),
            json!({ "id": "b" }),
        ]);
        assert_eq!(compute_metrics(&list).items_sold, 6);
    }

    #[test]
    fn test_revenue_and_net() {
        let list = orders(vec![json!({
            "id": "a",
            "items": [{ "quantity": 2, "price": "9.99" }, { "quantity": 1, "price": 5 }],
            "tax": "2.00",
            "service_fee": "1.25",
            "shipping_fee": 7
        })]);
        let metrics = compute_metrics(&list);
        assert_eq!(metrics.total_sold.to_string(), "26.98");
        assert_eq!(metrics.total_service_fees.to_string(), "1.25");
        assert_eq!(metrics.total_earned.to_string(), "25.73");
        assert_eq!(metrics.total_coupon_spend, Decimal::ZERO);
    }

    #[test]
    fn test_delivery_counts() {
        let list = orders(vec![
            json!({ "id": "a", "status": "delivered" }),
            json!({ "id": "b", "status": "ended" }),
            json!({ "id": "c", "status": "shipped" }),
            json!({ "id": "d", "status": "shipping" }),
            json!({ "id": "e", "status": "processing" }),
        ]);
        let metrics = compute_metrics(&list);
        assert_eq!(metrics.total_delivered, 2);
        assert_eq!(metrics.pending_delivery, 2);
        assert_eq!(metrics.order_count, 5);
    }

    #[test]
    fn test_empty_list() {
        let json = serde_json::to_value(compute_metrics(&[])).unwrap();
        assert_eq!(json["totalSold"], "0.00");
        assert_eq!(json["totalEarned"], "0.00");
        assert_eq!(json["itemsSold"], 0);
    }
}
