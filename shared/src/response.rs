//! API Response types
//!
//! Standardized success envelope for the console API

use serde::{Deserialize, Serialize};

/// Unified API response structure
///
/// Mutation endpoints respond with this format:
/// ```json
/// {
///     "success": true,
///     "message": "Bundle dissolved",
///     "data": { ... }
/// }
/// ```
///
/// Partial-failure responses reuse it with `success` reflecting the outcome,
/// so the caller always gets the itemised `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation reached its goal
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create a failed response that still carries data
    pub fn failed_with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Some(data),
        }
    }
}
