//! Weight, footprint and value rollups
//!
//! The footprint is a stacking heuristic: boxes keep the largest length and
//! width seen and their heights add up. It is not bin packing.

use rust_decimal::Decimal;

use crate::models::{Dimensions, Order, Parcel};

/// Shown when no order declares any dimension
pub const DEFAULT_DIMENSIONS: Dimensions = Dimensions::new(12.0, 12.0, 12.0);

/// Parcel used for a label purchase when nothing is declared
pub const LABEL_DEFAULT_DIMENSIONS: Dimensions = Dimensions::new(12.0, 12.0, 4.0);
pub const LABEL_DEFAULT_WEIGHT_OZ: f64 = 8.0;

/// Weight of a single order
///
/// Item weights win; the shipping profile weight is only used when no item
/// declares one.
fn order_weight(order: &Order) -> f64 {
    let declared: Vec<f64> = order.items.iter().filter_map(|i| i.weight).collect();
    if declared.is_empty() {
        order
            .shipping_profile
            .as_ref()
            .and_then(|p| p.weight)
            .unwrap_or(0.0)
    } else {
        declared.iter().sum()
    }
}

/// Sum of declared weights across orders
pub fn total_weight<'a>(orders: impl IntoIterator<Item = &'a Order>) -> f64 {
    orders.into_iter().map(order_weight).sum()
}

/// Boxes contributed by one order: its dimensioned items, else its profile
fn order_boxes(order: &Order) -> Vec<Dimensions> {
    let from_items: Vec<Dimensions> = order
        .items
        .iter()
        .filter(|i| i.has_dimensions())
        .map(|i| {
            Dimensions::new(
                i.length.unwrap_or(0.0),
                i.width.unwrap_or(0.0),
                i.height.unwrap_or(0.0),
            )
        })
        .collect();
    if !from_items.is_empty() {
        return from_items;
    }

    match order.shipping_profile.as_ref().filter(|p| p.has_dimensions()) {
        Some(p) => vec![Dimensions::new(
            p.length.unwrap_or(0.0),
            p.width.unwrap_or(0.0),
            p.height.unwrap_or(0.0),
        )],
        None => Vec::new(),
    }
}

/// Max length, max width, summed height
///
/// Returns `default` when no order declares dimensions. A side that stays zero
/// after the rollup takes the matching side of `default`.
pub fn footprint<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    default: Dimensions,
) -> Dimensions {
    let boxes: Vec<Dimensions> = orders.into_iter().flat_map(order_boxes).collect();
    if boxes.is_empty() {
        return default;
    }

    let stacked = boxes.iter().fold(Dimensions::new(0.0, 0.0, 0.0), |acc, b| {
        Dimensions::new(
            acc.length.max(b.length),
            acc.width.max(b.width),
            acc.height + b.height,
        )
    });

    let or_default = |side: f64, fallback: f64| if side > 0.0 { side } else { fallback };
    Dimensions::new(
        or_default(stacked.length, default.length),
        or_default(stacked.width, default.width),
        or_default(stacked.height, default.height),
    )
}

/// Everything the customer paid for one order
pub fn order_value(order: &Order) -> Decimal {
    order.total + order.service_fee + order.tax + order.shipping_fee
}

pub fn total_value<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Decimal {
    orders.into_iter().map(order_value).sum()
}

/// Parcel for a label purchase, never zero-sized
pub fn label_parcel(orders: &[&Order]) -> Parcel {
    let weight = total_weight(orders.iter().copied());
    Parcel {
        weight: if weight > 0.0 {
            weight
        } else {
            LABEL_DEFAULT_WEIGHT_OZ
        },
        dimensions: footprint(orders.iter().copied(), LABEL_DEFAULT_DIMENSIONS),
    }
}
