//! Reconciliation ledger for purchased labels
//!
//! A label purchase cannot be rolled back. When some member orders could not
//! be updated with the new tracking number, the purchase is recorded here
//! keyed by bundle id and tracking number so the update can be replayed for
//! just those orders. A bundle relabelled while an earlier label is still
//! pending keeps both entries. The ledger lives in memory and is lost on
//! restart.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

/// A purchased label with orders still missing its tracking number
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLabel {
    pub bundle_id: String,
    pub tracking_number: String,
    pub label_url: Option<String>,
    pub pending_order_ids: Vec<String>,
    pub purchased_at: DateTime<Utc>,
    /// Update attempts made so far, the initial fan-out included
    pub attempts: u32,
}

type LabelKey = (String, String);

fn key(bundle_id: &str, tracking_number: &str) -> LabelKey {
    (bundle_id.to_string(), tracking_number.to_string())
}

/// Concurrent map of pending labels by bundle id and tracking number
#[derive(Debug, Clone, Default)]
pub struct ReconciliationLedger {
    entries: Arc<DashMap<LabelKey, PendingLabel>>,
}

impl ReconciliationLedger {
    /// Record failed orders after a label purchase
    ///
    /// With no failed orders, an earlier entry for the same label is cleared.
    /// Entries for other labels of the bundle are left alone.
    pub fn record(
        &self,
        bundle_id: &str,
        tracking_number: &str,
        label_url: Option<String>,
        failed_order_ids: Vec<String>,
    ) {
        if failed_order_ids.is_empty() {
            self.entries.remove(&key(bundle_id, tracking_number));
            return;
        }

        tracing::warn!(
            bundle_id = %bundle_id,
            tracking_number = %tracking_number,
            pending = failed_order_ids.len(),
            "Label purchased but some orders were not updated"
        );
        self.entries.insert(
            key(bundle_id, tracking_number),
            PendingLabel {
                bundle_id: bundle_id.to_string(),
                tracking_number: tracking_number.to_string(),
                label_url,
                pending_order_ids: failed_order_ids,
                purchased_at: Utc::now(),
                attempts: 1,
            },
        );
    }

    /// Oldest pending label of a bundle
    pub fn get(&self, bundle_id: &str) -> Option<PendingLabel> {
        self.entries
            .iter()
            .filter(|entry| entry.key().0 == bundle_id)
            .map(|entry| entry.value().clone())
            .min_by(|a, b| {
                a.purchased_at
                    .cmp(&b.purchased_at)
                    .then_with(|| a.tracking_number.cmp(&b.tracking_number))
            })
    }

    /// All pending labels, oldest purchase first
    pub fn list(&self) -> Vec<PendingLabel> {
        let mut pending: Vec<PendingLabel> =
            self.entries.iter().map(|entry| entry.value().clone()).collect();
        pending.sort_by(|a, b| {
            a.purchased_at
                .cmp(&b.purchased_at)
                .then_with(|| a.bundle_id.cmp(&b.bundle_id))
        });
        pending
    }

    /// Store the outcome of a retry
    ///
    /// Returns the remaining entry, or `None` once every order is updated.
    pub fn settle(
        &self,
        bundle_id: &str,
        tracking_number: &str,
        still_failed: Vec<String>,
    ) -> Option<PendingLabel> {
        let key = key(bundle_id, tracking_number);
        if still_failed.is_empty() {
            if self.entries.remove(&key).is_some() {
                tracing::info!(
                    bundle_id = %bundle_id,
                    tracking_number = %tracking_number,
                    "Label reconciliation complete"
                );
            }
            return None;
        }

        let mut entry = self.entries.get_mut(&key)?;
        entry.pending_order_ids = still_failed;
        entry.attempts += 1;
        Some(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
