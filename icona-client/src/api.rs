//! Icona API surface used by the console

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{
    AssignedBundle, BundleAssignment, LabelPurchase, LabelPurchaseRequest, OrderPatch, OrderScope,
    RateRequest, ShippingRate, unwrap_data, unwrap_list,
};
use crate::{ClientError, ClientResult, HttpClient};

/// Upstream operations the console depends on
///
/// Order reads return raw JSON; turning it into typed orders is the caller's
/// parse boundary.
#[async_trait]
pub trait IconaApi: Send + Sync {
    /// Every order in `scope`, unfiltered
    async fn list_orders(&self, scope: &OrderScope) -> ClientResult<Vec<Value>>;

    async fn get_order(&self, order_id: &str) -> ClientResult<Value>;

    async fn update_order(&self, order_id: &str, patch: &OrderPatch) -> ClientResult<()>;

    /// Assign one bundle to all `order_ids` in a single call
    async fn assign_bundle(&self, order_ids: &[String]) -> ClientResult<AssignedBundle>;

    async fn estimate_rates(&self, request: &RateRequest) -> ClientResult<Vec<ShippingRate>>;

    async fn purchase_label(&self, request: &LabelPurchaseRequest) -> ClientResult<LabelPurchase>;
}

#[async_trait]
impl IconaApi for HttpClient {
    async fn list_orders(&self, scope: &OrderScope) -> ClientResult<Vec<Value>> {
        let body: Value = self.get_with_query(&["orders"], &scope.query()).await?;
        unwrap_list(body, "orders")
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Value> {
        let body: Value = self.get(&["orders", order_id]).await?;
        match unwrap_data(body) {
            Value::Null => Err(ClientError::NotFound(format!("order {order_id}"))),
            order => Ok(order),
        }
    }

    async fn update_order(&self, order_id: &str, patch: &OrderPatch) -> ClientResult<()> {
        let _: Value = self.patch(&["orders", order_id], patch).await?;
        Ok(())
    }

    async fn assign_bundle(&self, order_ids: &[String]) -> ClientResult<AssignedBundle> {
        let body: Value = self
            .post(&["orders", "bundle", "orders"], &BundleAssignment { order_ids })
            .await?;
        Ok(AssignedBundle::from_body(unwrap_data(body)))
    }

    async fn estimate_rates(&self, request: &RateRequest) -> ClientResult<Vec<ShippingRate>> {
        let body: Value = self.post(&["shipping", "rates"], request).await?;
        unwrap_list(body, "rates")?
            .into_iter()
            .map(|rate| serde_json::from_value(rate).map_err(ClientError::from))
            .collect()
    }

    async fn purchase_label(&self, request: &LabelPurchaseRequest) -> ClientResult<LabelPurchase> {
        let body: Value = self.post(&["shipping", "labels"], request).await?;
        serde_json::from_value(unwrap_data(body)).map_err(Into::into)
    }
}
