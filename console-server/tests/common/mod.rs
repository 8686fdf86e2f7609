//! In-memory Icona stand-in and request helpers for route tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use console_server::AppState;
use console_server::api::build_router;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use icona_client::{
    AssignedBundle, ClientError, ClientResult, IconaApi, LabelPurchase, LabelPurchaseRequest,
    OrderPatch, OrderScope, RateRequest, ShippingRate,
};
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Default)]
struct Inner {
    orders: Vec<Value>,
    failing_updates: HashSet<String>,
    updates: Vec<(String, OrderPatch)>,
    assignments: Vec<Vec<String>>,
    purchases: Vec<LabelPurchaseRequest>,
    label_response: Option<Value>,
}

/// Fake upstream holding raw order JSON
#[derive(Clone, Default)]
pub struct FakeIcona {
    inner: Arc<Mutex<Inner>>,
}

impl FakeIcona {
    pub fn with_orders(orders: Vec<Value>) -> Self {
        let fake = Self::default();
        fake.inner.lock().unwrap().orders = orders;
        fake
    }

    /// Make PATCH for `order_id` fail with an upstream 500
    pub fn fail_updates_for(&self, order_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_updates
            .insert(order_id.to_string());
    }

    /// Answer label purchases with `body` instead of a good label
    pub fn answer_labels_with(&self, body: Value) {
        self.inner.lock().unwrap().label_response = Some(body);
    }

    pub fn heal(&self) {
        self.inner.lock().unwrap().failing_updates.clear();
    }

    pub fn updates(&self) -> Vec<(String, OrderPatch)> {
        self.inner.lock().unwrap().updates.clone()
    }

    pub fn assignments(&self) -> Vec<Vec<String>> {
        self.inner.lock().unwrap().assignments.clone()
    }

    pub fn purchase_count(&self) -> usize {
        self.inner.lock().unwrap().purchases.len()
    }

    pub fn router(&self) -> Router {
        build_router().with_state(AppState::with_upstream(Arc::new(self.clone()), 4))
    }
}

fn order_id(order: &Value) -> Option<&str> {
    order
        .get("_id")
        .or_else(|| order.get("id"))
        .and_then(Value::as_str)
}

#[async_trait]
impl IconaApi for FakeIcona {
    async fn list_orders(&self, _scope: &OrderScope) -> ClientResult<Vec<Value>> {
        Ok(self.inner.lock().unwrap().orders.clone())
    }

    async fn get_order(&self, id: &str) -> ClientResult<Value> {
        self.inner
            .lock()
            .unwrap()
            .orders
            .iter()
            .find(|o| order_id(o) == Some(id))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("order {id}")))
    }

    async fn update_order(&self, id: &str, patch: &OrderPatch) -> ClientResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_updates.contains(id) {
            return Err(ClientError::Upstream {
                status: 500,
                body: "write failed".into(),
            });
        }
        inner.updates.push((id.to_string(), patch.clone()));
        Ok(())
    }

    async fn assign_bundle(&self, order_ids: &[String]) -> ClientResult<AssignedBundle> {
        self.inner
            .lock()
            .unwrap()
            .assignments
            .push(order_ids.to_vec());
        Ok(AssignedBundle::from_body(json!({ "modified": order_ids.len() })))
    }

    async fn estimate_rates(&self, _request: &RateRequest) -> ClientResult<Vec<ShippingRate>> {
        Ok(serde_json::from_value(json!([
            { "rate_id": "r-ground", "carrier": "usps", "service": "ground", "amount": "7.40" }
        ]))
        .unwrap())
    }

    async fn purchase_label(&self, request: &LabelPurchaseRequest) -> ClientResult<LabelPurchase> {
        let mut inner = self.inner.lock().unwrap();
        inner.purchases.push(request.clone());
        let body = inner.label_response.clone().unwrap_or_else(|| {
            json!({
                "trackingNumber": "TRK-1",
                "labelUrl": "https://labels.test/TRK-1.pdf",
                "carrier": "usps",
                "cost": 8.1
            })
        });
        Ok(serde_json::from_value(body).unwrap())
    }
}

pub fn address(zip: &str) -> Value {
    json!({ "street": "1 Main St", "city": "Austin", "state": "TX", "zip": zip, "country": "US" })
}

/// Processing order for customer `customer` shipping to Austin
pub fn order(id: &str, customer: &str) -> Value {
    json!({
        "_id": id,
        "customer": { "_id": customer, "firstName": "Ana", "lastName": "Diaz" },
        "status": "processing",
        "shippingAddress": address("78701"),
        "items": [{ "name": "mug", "quantity": 1, "price": 12, "weight": "4oz" }],
        "createdAt": "2026-10-01T10:00:00Z"
    })
}

pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
