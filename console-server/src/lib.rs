//! console-server: seller console backend for shipment bundling
//!
//! Sits between the console UI and the Icona API:
//! - Loads a seller's or customer's orders and derives bundles from them
//! - Creates and dissolves bundles, fanning out per-order updates
//! - Computes shipment metrics
//! - Orchestrates label purchases for single orders and bundles

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

pub use config::Config;
pub use state::AppState;
