//! Data models
//!
//! Typed views over upstream order records and the values derived from them.
//! Only [`order`] is decoded from upstream JSON; everything else is computed.

pub mod bundle;
pub mod metrics;
pub mod order;
pub mod parcel;

// Re-exports
pub use bundle::*;
pub use metrics::*;
pub use order::*;
pub use parcel::*;
