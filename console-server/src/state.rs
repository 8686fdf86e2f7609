//! Application state for the console server

use std::sync::Arc;

use icona_client::{ClientConfig, IconaApi};

use crate::config::Config;
use crate::services::reconciliation::ReconciliationLedger;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Upstream order and shipping API
    pub icona: Arc<dyn IconaApi>,
    /// Max in-flight upstream calls per fan-out
    pub fanout_limit: usize,
    /// Purchased labels whose order updates did not all land
    pub ledger: ReconciliationLedger,
}

impl AppState {
    /// Build state backed by the real Icona client
    pub fn new(config: &Config) -> Result<Self, BoxError> {
        let mut client_config =
            ClientConfig::new(&config.icona_api_url).with_timeout(config.icona_timeout_secs);
        if let Some(key) = &config.icona_api_key {
            client_config = client_config.with_token(key);
        }
        let client = client_config.build_http_client()?;

        tracing::info!(
            upstream = %client.base_url(),
            timeout_secs = config.icona_timeout_secs,
            fanout = config.fanout_concurrency,
            "Icona client ready"
        );

        Ok(Self::with_upstream(Arc::new(client), config.fanout_concurrency))
    }

    /// Build state over any upstream implementation
    pub fn with_upstream(icona: Arc<dyn IconaApi>, fanout_limit: usize) -> Self {
        Self {
            icona,
            fanout_limit: fanout_limit.max(1),
            ledger: ReconciliationLedger::default(),
        }
    }
}
