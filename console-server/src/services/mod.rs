//! Orchestration services
//!
//! Each service loads what it needs from Icona, runs the pure logic in
//! `shared::shipping`, and writes results back through bounded fan-out.

pub mod bundles;
pub mod fanout;
pub mod labels;
pub mod metrics;
pub mod orders;
pub mod rates;
pub mod reconciliation;
