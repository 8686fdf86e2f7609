//! Bundle identity, grouping and status
//!
//! Bundles are found two ways. Explicit bundles are orders that already share
//! a bundle reference. Implicit bundles are proposed for any customer with at
//! least two eligible orders. Both derive ids with [`generate_bundle_id`], so a
//! bundle reached both ways merges into one entry.

use std::collections::{BTreeMap, HashSet};

use sha2::{Digest, Sha256};

use crate::models::{Bundle, BundleSource, Order, OrderStatus};

use super::parcel::{DEFAULT_DIMENSIONS, footprint, total_value, total_weight};

pub const BUNDLE_ID_PREFIX: &str = "bundle_";

/// Hex characters of the digest kept in the id
const BUNDLE_HASH_LEN: usize = 12;

/// `"bundle_"` + first 12 hex chars of SHA-256 over the sorted, comma-joined ids
///
/// Duplicate ids are collapsed, so the id depends only on the set.
pub fn generate_bundle_id<S: AsRef<str>>(order_ids: &[S]) -> String {
    let mut ids: Vec<&str> = order_ids.iter().map(AsRef::as_ref).collect();
    ids.sort_unstable();
    ids.dedup();

    let digest = Sha256::digest(ids.join(",").as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(BUNDLE_HASH_LEN);
    format!("{BUNDLE_ID_PREFIX}{hash}")
}

/// Processing, not yet labelled, not yet bundled
pub fn is_bundle_eligible(order: &Order) -> bool {
    order.status == OrderStatus::Processing && !order.has_tracking() && !order.is_bundled()
}

/// Eligible orders per customer, keeping only customers with two or more
pub fn group_by_customer(orders: &[Order]) -> BTreeMap<String, Vec<&Order>> {
    let mut groups: BTreeMap<String, Vec<&Order>> = BTreeMap::new();
    for order in orders.iter().filter(|o| is_bundle_eligible(o)) {
        if let Some(customer_id) = order.customer_id() {
            groups.entry(customer_id.to_string()).or_default().push(order);
        }
    }
    groups.retain(|_, members| members.len() >= 2);
    groups
}

/// Orders keyed by the bundle reference they carry
pub fn group_by_bundle_ref(orders: &[Order]) -> BTreeMap<String, Vec<&Order>> {
    let mut groups: BTreeMap<String, Vec<&Order>> = BTreeMap::new();
    for order in orders {
        if let Some(bundle_id) = order.bundle_id.as_deref() {
            groups.entry(bundle_id.to_string()).or_default().push(order);
        }
    }
    groups
}

/// Members of `bundle_id` within `orders`
///
/// Pass the unfiltered order set; a status-filtered view would skew the
/// derived status.
pub fn bundle_members<'a>(orders: &'a [Order], bundle_id: &str) -> Vec<&'a Order> {
    orders.iter().filter(|o| o.in_bundle(bundle_id)).collect()
}

/// Highest first
const STATUS_PRIORITY: [OrderStatus; 4] = [
    OrderStatus::Cancelled,
    OrderStatus::Shipped,
    OrderStatus::ReadyToShip,
    OrderStatus::Processing,
];

/// Merge member statuses into one bundle status
///
/// A unanimous status wins outright. Otherwise the highest-priority status
/// present is used. No members, or no priority status present, gives
/// processing.
pub fn derive_bundle_status<'a>(
    statuses: impl IntoIterator<Item = &'a OrderStatus>,
) -> OrderStatus {
    let present: Vec<&OrderStatus> = statuses.into_iter().collect();
    let Some(first) = present.first() else {
        return OrderStatus::Processing;
    };
    if present.iter().all(|s| s == first) {
        return (*first).clone();
    }

    STATUS_PRIORITY
        .iter()
        .find(|candidate| present.contains(candidate))
        .cloned()
        .unwrap_or(OrderStatus::Processing)
}

/// Status of `bundle_id` computed over the full order set
pub fn bundle_status(orders: &[Order], bundle_id: &str) -> OrderStatus {
    derive_bundle_status(bundle_members(orders, bundle_id).into_iter().map(|o| &o.status))
}

/// Build the bundle view for a group of member orders
pub fn build_bundle(id: impl Into<String>, members: &[&Order], source: BundleSource) -> Bundle {
    let first = members.first();
    let customer_id = first.and_then(|o| o.customer.id.clone());
    let customer_name = members.iter().find_map(|o| o.customer.name.clone());

    Bundle {
        id: id.into(),
        order_ids: members.iter().map(|o| o.id.clone()).collect(),
        customer_id,
        customer_name,
        weight: total_weight(members.iter().copied()),
        dimensions: footprint(members.iter().copied(), DEFAULT_DIMENSIONS),
        value: total_value(members.iter().copied()),
        status: derive_bundle_status(members.iter().map(|o| &o.status)),
        created_at: members.iter().filter_map(|o| o.created_at).min(),
        source,
    }
}

/// Every bundle visible in `orders`, newest first
///
/// Explicit bundles come from shared bundle references. Implicit ones are
/// proposed per customer; an implicit proposal whose id already exists as an
/// explicit bundle is dropped.
pub fn discover_bundles(orders: &[Order]) -> Vec<Bundle> {
    let mut bundles: Vec<Bundle> = group_by_bundle_ref(orders)
        .into_iter()
        .map(|(id, members)| build_bundle(id, &members, BundleSource::Explicit))
        .collect();

    let known: HashSet<String> = bundles.iter().map(|b| b.id.clone()).collect();
    for members in group_by_customer(orders).into_values() {
        let ids: Vec<&str> = members.iter().map(|o| o.id.as_str()).collect();
        let id = generate_bundle_id(&ids);
        if !known.contains(&id) {
            bundles.push(build_bundle(id, &members, BundleSource::Implicit));
        }
    }

    bundles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    bundles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_order;
    use serde_json::json;

    fn order(id: &str, customer: &str, status: &str) -> Order {
        parse_order(json!({ "id": id, "customerId": customer, "status": status })).unwrap()
    }

    fn statuses(raw: &[&str]) -> Vec<OrderStatus> {
        raw.iter().map(|s| OrderStatus::from(*s)).collect()
    }

    #[test]
    fn test_bundle_id_is_order_independent() {
        let a = generate_bundle_id(&["A", "B", "C"]);
        for permutation in [["C", "A", "B"], ["B", "C", "A"], ["C", "B", "A"]] {
            assert_eq!(generate_bundle_id(&permutation), a);
        }
    }

    #[test]
    fn test_bundle_id_shape_and_determinism() {
        let id = generate_bundle_id(&["o-1", "o-2"]);
        assert!(id.starts_with(BUNDLE_ID_PREFIX));
        assert_eq!(id.len(), BUNDLE_ID_PREFIX.len() + 12);
        assert!(id[BUNDLE_ID_PREFIX.len()..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, generate_bundle_id(&["o-1".to_string(), "o-2".to_string()]));
        assert_eq!(id, generate_bundle_id(&["o-2", "o-1", "o-2"]));
    }

    #[test]
    fn test_bundle_id_distinct_sets_differ() {
        let ids: HashSet<String> = [
            vec!["o-1", "o-2"],
            vec!["o-1", "o-3"],
            vec!["o-1", "o-2", "o-3"],
            vec!["o-12"],
        ]
        .iter()
        .map(|set| generate_bundle_id(set))
        .collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_bundle_id_matches_sha256_prefix() {
        let expected = hex::encode(Sha256::digest(b"a,b"));
        assert_eq!(generate_bundle_id(&["b", "a"]), format!("bundle_{}", &expected[..12]));
    }

    #[test]
    fn test_status_any_cancelled_wins() {
        let s = statuses(&["shipped", "cancelled", "processing"]);
        assert_eq!(derive_bundle_status(&s), OrderStatus::Cancelled);
    }

    #[test]
    fn test_status_unanimous() {
        assert_eq!(derive_bundle_status(&statuses(&["shipped", "shipped"])), OrderStatus::Shipped);
        assert_eq!(
            derive_bundle_status(&statuses(&["delivered", "delivered"])),
            OrderStatus::Delivered
        );
    }

    #[test]
    fn test_status_priority_order() {
        assert_eq!(
            derive_bundle_status(&statuses(&["processing", "shipped"])),
            OrderStatus::Shipped
        );
        assert_eq!(
            derive_bundle_status(&statuses(&["processing", "ready_to_ship"])),
            OrderStatus::ReadyToShip
        );
        assert_eq!(
            derive_bundle_status(&statuses(&["delivered", "pending"])),
            OrderStatus::Processing
        );
        assert_eq!(derive_bundle_status(&[]), OrderStatus::Processing);
    }

    #[test]
    fn test_bundle_status_uses_members_only() {
        let mut a = order("a", "c-1", "shipped");
        let mut b = order("b", "c-1", "shipped");
        let mut other = order("x", "c-1", "cancelled");
        a.bundle_id = Some("bundle_1".into());
        b.bundle_id = Some("bundle_1".into());
        other.bundle_id = Some("bundle_2".into());
        let orders = vec![a, b, other];

        assert_eq!(bundle_status(&orders, "bundle_1"), OrderStatus::Shipped);
        assert_eq!(bundle_status(&orders, "bundle_2"), OrderStatus::Cancelled);
        assert_eq!(bundle_status(&orders, "missing"), OrderStatus::Processing);
    }

    #[test]
    fn test_missing_status_counts_as_processing() {
        let a = parse_order(json!({ "id": "a", "bundleId": "b1" })).unwrap();
        let b =
            parse_order(json!({ "id": "b", "bundleId": "b1", "status": "ready_to_ship" })).unwrap();
        assert_eq!(a.status, OrderStatus::Processing);
        assert_eq!(bundle_status(&[a, b], "b1"), OrderStatus::ReadyToShip);
    }

    #[test]
    fn test_group_by_customer_needs_two_eligible() {
        let mut labelled = order("c", "c-1", "processing");
        labelled.tracking_number = Some("1Z".into());
        let orders = vec![
            order("a", "c-1", "processing"),
            order("b", "c-1", "processing"),
            labelled,
            order("d", "c-2", "processing"),
            order("e", "c-2", "shipped"),
        ];
        let groups = group_by_customer(&orders);
        assert_eq!(groups.len(), 1);
        let ids: Vec<&str> = groups["c-1"].iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_discover_merges_explicit_and_implicit() {
        let id = generate_bundle_id(&["a", "b"]);
        let mut a = order("a", "c-1", "processing");
        let mut b = order("b", "c-1", "processing");
        a.bundle_id = Some(id.clone());
        b.bundle_id = Some(id.clone());
        let orders = vec![
            a,
            b,
            order("c", "c-2", "processing"),
            order("d", "c-2", "processing"),
        ];

        let bundles = discover_bundles(&orders);
        assert_eq!(bundles.len(), 2);
        let explicit = bundles.iter().find(|b| b.id == id).unwrap();
        assert_eq!(explicit.source, BundleSource::Explicit);
        let implicit = bundles.iter().find(|b| b.id != id).unwrap();
        assert_eq!(implicit.source, BundleSource::Implicit);
        assert_eq!(implicit.id, generate_bundle_id(&["d", "c"]));
        assert_eq!(implicit.customer_id.as_deref(), Some("c-2"));
    }

    #[test]
    fn test_build_bundle_aggregates() {
        let a = parse_order(json!({
            "id": "a",
            "customerId": "c-1",
            "total": 10,
            "items": [{ "weight": "4oz", "length": 10, "width": 8, "height": 2 }],
            "createdAt": "2025-03-02T00:00:00Z"
        }))
        .unwrap();
        let b = parse_order(json!({
            "id": "b",
            "customerId": "c-1",
            "total": 5,
            "shipping_fee": "2.50",
            "items": [{ "weight": "2", "length": 6, "width": 9, "height": 1 }],
            "createdAt": "2025-03-01T00:00:00Z"
        }))
        .unwrap();

        let bundle = build_bundle("bundle_x", &[&a, &b], BundleSource::Explicit);
        assert_eq!(bundle.order_ids, vec!["a", "b"]);
        assert_eq!(bundle.weight, 6.0);
        assert_eq!(bundle.dimensions.length, 10.0);
        assert_eq!(bundle.dimensions.width, 9.0);
        assert_eq!(bundle.dimensions.height, 3.0);
        assert_eq!(bundle.value.to_string(), "17.50");
        assert_eq!(bundle.created_at, b.created_at);

        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["value"], "17.50");
        assert_eq!(json["source"], "explicit");
        assert_eq!(json["orderIds"][1], "b");
    }
}
