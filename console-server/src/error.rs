//! Unified service-layer error type for the console server
//!
//! `ServiceError` bridges upstream client errors (`ClientError`) and the
//! API-layer error (`AppError`) so services can use `?` on both.

use axum::response::IntoResponse;
use http::StatusCode;
use icona_client::ClientError;
use shared::error::{AppError, ErrorCode};

/// Service-layer error
///
/// - `Upstream`: the Icona call failed (logged and mapped by status)
/// - `App`: business-rule errors (transparent pass-through to client)
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Upstream(#[from] ClientError),
    #[error(transparent)]
    App(#[from] AppError),
}

/// Map an upstream failure onto the console's error taxonomy
///
/// Unreachable or slow upstream gives 503, upstream 4xx statuses pass
/// through, everything else is a 500.
pub fn upstream_error(err: &ClientError) -> AppError {
    if err.is_timeout() {
        return AppError::with_message(ErrorCode::TimeoutError, "Icona API timed out");
    }
    if err.is_unreachable() {
        return AppError::with_message(ErrorCode::NetworkError, "Icona API is unreachable");
    }

    match err.status() {
        Some(404) => AppError::with_message(ErrorCode::NotFound, err.to_string())
            .with_detail("upstream_status", 404),
        Some(status) if (400..500).contains(&status) => AppError::upstream(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
            err.to_string(),
        ),
        Some(status) => AppError::with_message(ErrorCode::UpstreamError, err.to_string())
            .with_detail("upstream_status", status),
        None => AppError::with_message(ErrorCode::UpstreamError, err.to_string()),
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Upstream(client_err) => {
                tracing::warn!(error = %client_err, "Icona request failed");
                upstream_error(&client_err)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
