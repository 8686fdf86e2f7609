mod common;

use common::{FakeIcona, address, order, send};
use http::StatusCode;
use serde_json::json;

fn label_body(order_ids: &[&str]) -> serde_json::Value {
    json!({ "orderIds": order_ids, "service": "ground", "rate_id": "r-ground" })
}

#[tokio::test]
async fn test_metrics() {
    let mut giveaway = order("o-2", "c-1");
    giveaway["orderType"] = json!("giveaway");
    giveaway["shippingFee"] = json!("4.5");
    let mut delivered = order("o-3", "c-2");
    delivered["status"] = json!("delivered");
    delivered["serviceFee"] = json!(1.25);
    let fake = FakeIcona::with_orders(vec![order("o-1", "c-1"), giveaway, delivered]);

    let (status, body) = send(fake.router(), "GET", "/api/shipping/metrics?userId=s-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSold"], "36.00");
    assert_eq!(body["totalShippingSpend"], "4.50");
    assert_eq!(body["totalServiceFees"], "1.25");
    assert_eq!(body["totalEarned"], "30.25");
    assert_eq!(body["itemsSold"], 3);
    assert_eq!(body["totalDelivered"], 1);
}

#[tokio::test]
async fn test_estimate_returns_parcel_and_rates() {
    let fake = FakeIcona::with_orders(vec![order("o-1", "c-1"), order("o-2", "c-1")]);
    let (status, body) = send(
        fake.router(),
        "POST",
        "/api/shipping/estimate",
        Some(json!({ "orderIds": ["o-1", "o-2"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["parcel"]["weight"], 8.0);
    assert_eq!(body["data"]["rates"][0]["carrier"], "usps");
}

#[tokio::test]
async fn test_bundle_label_all_updated() {
    let fake = FakeIcona::with_orders(vec![order("o-1", "c-1"), order("o-2", "c-1")]);
    let (status, body) = send(
        fake.router(),
        "POST",
        "/api/shipping/labels/bundle",
        Some(label_body(&["o-1", "o-2"])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["trackingNumber"], "TRK-1");
    assert_eq!(body["data"]["cost"], "8.10");
    assert_eq!(body["data"]["ordersUpdated"], 2);

    let updates = fake.updates();
    assert_eq!(updates.len(), 2);
    assert!(
        updates
            .iter()
            .all(|(_, p)| p.tracking_number.as_deref() == Some("TRK-1"))
    );
}

#[tokio::test]
async fn test_bundle_label_address_mismatch_names_order() {
    let mut moved = order("o-2", "c-1");
    moved["shippingAddress"] = address("78702");
    let fake = FakeIcona::with_orders(vec![order("o-1", "c-1"), moved]);

    let (status, body) = send(
        fake.router(),
        "POST",
        "/api/shipping/labels/bundle",
        Some(label_body(&["o-1", "o-2"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["order_id"], "o-2");
    assert_eq!(body["details"]["field"], "zip");
    assert_eq!(fake.purchase_count(), 0);
}

#[tokio::test]
async fn test_bundle_label_needs_two_orders() {
    let fake = FakeIcona::with_orders(vec![order("o-1", "c-1")]);
    let (status, _) = send(
        fake.router(),
        "POST",
        "/api/shipping/labels/bundle",
        Some(label_body(&["o-1"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fake.purchase_count(), 0);
}

#[tokio::test]
async fn test_partial_update_is_207_and_retry_settles() {
    let fake = FakeIcona::with_orders(vec![
        order("o-1", "c-1"),
        order("o-2", "c-1"),
        order("o-3", "c-1"),
    ]);
    fake.fail_updates_for("o-3");
    let app = fake.router();

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/shipping/labels/bundle",
        Some(label_body(&["o-1", "o-2", "o-3"])),
    )
    .await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["ordersUpdated"], 2);
    assert_eq!(body["data"]["ordersFailed"], 1);
    let bundle_id = body["data"]["bundleId"].as_str().unwrap().to_string();

    let (_, pending) = send(app.clone(), "GET", "/api/shipping/labels/pending", None).await;
    assert_eq!(pending[0]["bundleId"], bundle_id.as_str());
    assert_eq!(pending[0]["pendingOrderIds"], json!(["o-3"]));

    fake.heal();
    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/shipping/labels/bundle/retry",
        Some(json!({ "bundleId": bundle_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ordersUpdated"], 1);
    assert_eq!(fake.purchase_count(), 1);

    let (_, pending) = send(app, "GET", "/api/shipping/labels/pending", None).await;
    assert_eq!(pending, json!([]));
}

#[tokio::test]
async fn test_retry_unknown_bundle_is_404() {
    let (status, _) = send(
        FakeIcona::default().router(),
        "POST",
        "/api/shipping/labels/bundle/retry",
        Some(json!({ "bundleId": "bundle_nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_single_label_for_missing_order_is_404() {
    let (status, _) = send(
        FakeIcona::default().router(),
        "POST",
        "/api/shipping/labels",
        Some(json!({ "orderId": "o-404", "rate_id": "r-ground" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_label_without_tracking_number_is_a_failure() {
    let fake = FakeIcona::with_orders(vec![order("o-1", "c-1"), order("o-2", "c-1")]);
    fake.answer_labels_with(json!({ "success": true, "labelUrl": "https://labels.test/x.pdf" }));

    let (status, body) = send(
        fake.router(),
        "POST",
        "/api/shipping/labels/bundle",
        Some(label_body(&["o-1", "o-2"])),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 5002);
    assert!(fake.updates().is_empty());
}

#[tokio::test]
async fn test_declined_label_updates_nothing() {
    let fake = FakeIcona::with_orders(vec![order("o-1", "c-1"), order("o-2", "c-1")]);
    fake.answer_labels_with(json!({ "success": false }));
    let app = fake.router();

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/shipping/labels/bundle",
        Some(label_body(&["o-1", "o-2"])),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 5001);
    assert!(fake.updates().is_empty());

    let (_, pending) = send(app, "GET", "/api/shipping/labels/pending", None).await;
    assert_eq!(pending, json!([]));
}

#[tokio::test]
async fn test_missing_member_aborts_before_purchase() {
    let fake = FakeIcona::with_orders(vec![order("o-1", "c-1")]);
    let (status, body) = send(
        fake.router(),
        "POST",
        "/api/shipping/labels/bundle",
        Some(label_body(&["o-1", "o-404"])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"]["order_id"], "o-404");
    assert_eq!(fake.purchase_count(), 0);
    assert!(fake.updates().is_empty());
}

#[tokio::test]
async fn test_no_order_updated_is_500_with_results() {
    let fake = FakeIcona::with_orders(vec![order("o-1", "c-1"), order("o-2", "c-1")]);
    fake.fail_updates_for("o-1");
    fake.fail_updates_for("o-2");
    let app = fake.router();

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/shipping/labels/bundle",
        Some(label_body(&["o-1", "o-2"])),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["trackingNumber"], "TRK-1");
    assert_eq!(body["data"]["ordersUpdated"], 0);
    assert_eq!(body["data"]["ordersFailed"], 2);
    assert_eq!(fake.purchase_count(), 1);

    let (_, pending) = send(app, "GET", "/api/shipping/labels/pending", None).await;
    assert_eq!(pending[0]["pendingOrderIds"], json!(["o-1", "o-2"]));
}

#[tokio::test]
async fn test_mistyped_body_is_400_envelope() {
    let app = FakeIcona::default().router();

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/shipping/labels/bundle",
        Some(json!({ "orderIds": "o-1", "rate_id": "r-ground" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let (status, body) = send(
        app,
        "POST",
        "/api/shipping/labels",
        Some(json!({ "rate_id": "r-ground" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("orderId"));
}
