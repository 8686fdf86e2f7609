//! Unified error system for the seller console
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ErrorBody`]: JSON body rendered for failed requests
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 2xxx: Scope errors
//! - 4xxx: Order and bundle errors
//! - 5xxx: Shipping errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::BundleAddressMismatch, "Order o-2 ships to a different zip")
//!     .with_detail("order_id", "o-2")
//!     .with_detail("field", "zip");
//! assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
