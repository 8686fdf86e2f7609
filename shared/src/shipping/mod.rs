//! Shipping domain logic
//!
//! Pure functions over validated [`Order`](crate::models::Order)s: parcel
//! rollups, bundle identity and grouping, bundle status and shipment metrics.
//! Nothing here performs I/O or fails; malformed numbers have already been
//! degraded to zero at the parse boundary.

pub mod bundle;
pub mod metrics;
pub mod parcel;

pub use bundle::{
    BUNDLE_ID_PREFIX, build_bundle, bundle_members, bundle_status, derive_bundle_status,
    discover_bundles, generate_bundle_id, group_by_bundle_ref, group_by_customer,
    is_bundle_eligible,
};
pub use metrics::compute_metrics;
pub use parcel::{
    DEFAULT_DIMENSIONS, LABEL_DEFAULT_DIMENSIONS, LABEL_DEFAULT_WEIGHT_OZ, footprint,
    label_parcel, order_value, total_value, total_weight,
};
