//! Unified error codes for the seller console
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 2xxx: Scope errors
//! - 4xxx: Order and bundle errors
//! - 5xxx: Shipping errors
//! - 9xxx: System and upstream errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the dashboard can switch
/// on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Request body could not be decoded
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Required field missing
    RequiredField = 7,

    // ==================== 2xxx: Scope ====================
    /// Request carries neither a seller nor a customer scope
    ScopeRequired = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is not in the status required by the operation
    OrderStatusIneligible = 4002,
    /// Upstream order record could not be parsed
    OrderMalformed = 4003,
    /// Order already belongs to a bundle
    OrderAlreadyBundled = 4004,

    // ==================== 41xx: Bundle ====================
    /// Bundle not found
    BundleNotFound = 4101,
    /// Too few orders to form a bundle
    BundleTooSmall = 4102,
    /// Bundle members belong to different customers
    BundleCustomerMismatch = 4103,
    /// Bundle members ship to different addresses
    BundleAddressMismatch = 4104,

    // ==================== 5xxx: Shipping ====================
    /// Label purchase failed
    LabelPurchaseFailed = 5001,
    /// Label purchase returned no tracking number
    MissingTrackingNumber = 5002,
    /// No rate offered for the shipment
    RateNotFound = 5003,
    /// No pending reconciliation for this bundle
    ReconciliationNotFound = 5006,

    // ==================== 9xxx: System ====================
    /// Upstream API returned an error
    UpstreamError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Request body is invalid",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::RequiredField => "Required field is missing",

            // Scope
            ErrorCode::ScopeRequired => "userId or customer is required",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderStatusIneligible => "Order status does not allow this operation",
            ErrorCode::OrderMalformed => "Order record is malformed",
            ErrorCode::OrderAlreadyBundled => "Order already belongs to a bundle",

            // Bundle
            ErrorCode::BundleNotFound => "Bundle not found",
            ErrorCode::BundleTooSmall => "A bundle needs at least two orders",
            ErrorCode::BundleCustomerMismatch => "Bundled orders must belong to the same customer",
            ErrorCode::BundleAddressMismatch => "Bundled orders must ship to the same address",

            // Shipping
            ErrorCode::LabelPurchaseFailed => "Label purchase failed",
            ErrorCode::MissingTrackingNumber => "Label purchase returned no tracking number",
            ErrorCode::RateNotFound => "Shipping rate not found",
            ErrorCode::ReconciliationNotFound => "No pending label updates for this bundle",

            // System
            ErrorCode::UpstreamError => "Upstream API error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            7 => Ok(ErrorCode::RequiredField),

            // Scope
            2002 => Ok(ErrorCode::ScopeRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderStatusIneligible),
            4003 => Ok(ErrorCode::OrderMalformed),
            4004 => Ok(ErrorCode::OrderAlreadyBundled),

            // Bundle
            4101 => Ok(ErrorCode::BundleNotFound),
            4102 => Ok(ErrorCode::BundleTooSmall),
            4103 => Ok(ErrorCode::BundleCustomerMismatch),
            4104 => Ok(ErrorCode::BundleAddressMismatch),

            // Shipping
            5001 => Ok(ErrorCode::LabelPurchaseFailed),
            5002 => Ok(ErrorCode::MissingTrackingNumber),
            5003 => Ok(ErrorCode::RateNotFound),
            5006 => Ok(ErrorCode::ReconciliationNotFound),

            // System
            9002 => Ok(ErrorCode::UpstreamError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
