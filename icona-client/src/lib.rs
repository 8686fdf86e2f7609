//! Icona Client - HTTP client for the upstream order and shipping API
//!
//! The console never talks to Icona directly; it goes through [`IconaApi`],
//! implemented here by [`HttpClient`] and by in-memory fakes in tests.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use api::IconaApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use types::{
    AssignedBundle, LabelPurchase, LabelPurchaseRequest, OrderPatch, OrderScope, RateRequest,
    ShippingRate,
};
