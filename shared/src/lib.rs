//! Shared types for the seller console
//!
//! Order, bundle and metrics models, the pure shipping logic built on them,
//! the unified error system and the response envelope. No I/O lives here.

pub mod error;
pub mod models;
pub mod response;
pub mod shipping;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use response::ApiResponse;
