use crate::utils::error::LoyaltyError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        Self {
            status: StatusCode::GATEWAY_TIMEOUT,
            code: "TIMEOUT",
            message: "Request timed out".to_string(),
        }
    }
}

pub fn status_for(err: &LoyaltyError) -> StatusCode {
    match err {
        LoyaltyError::CardNotFound | LoyaltyError::ConfigNotFound => StatusCode::NOT_FOUND,
        LoyaltyError::ConfigDisabled | LoyaltyError::AccessDenied => StatusCode::FORBIDDEN,
        LoyaltyError::CardAlreadyExists | LoyaltyError::ConfigAlreadyExists => {
            StatusCode::CONFLICT
        }
        LoyaltyError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        LoyaltyError::SellerServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        LoyaltyError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<&LoyaltyError> for ApiError {
    fn from(err: &LoyaltyError) -> Self {
        Self {
            status: status_for(err),
            code: err.code(),
            message: err.user_friendly_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Renders an error and its `source()` chain for logs.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        current = cause.source();
    }
    rendered
}

/// Logs a failed operation. Expected business outcomes are warnings; only dependency
/// and internal failures are logged as errors.
pub fn log_failure(route: &str, err: &LoyaltyError) {
    if err.is_system_failure() {
        tracing::error!(
            "{} - {} (category: {:?}, severity: {:?})",
            route,
            error_chain(err),
            err.category(),
            err.severity()
        );
    } else {
        tracing::warn!("{} - {}", route, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{LookupError, StoreError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&LoyaltyError::CardNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&LoyaltyError::ConfigNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&LoyaltyError::ConfigDisabled), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&LoyaltyError::AccessDenied), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&LoyaltyError::CardAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_for(&LoyaltyError::ConfigAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&LoyaltyError::invalid_input("nope")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&LoyaltyError::SellerServiceUnavailable {
                source: LookupError::CompanyNotFound,
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&LoyaltyError::internal_without_source("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_cause_is_logged_but_not_returned() {
        let err = LoyaltyError::internal(
            "create_card: insert failed",
            StoreError::Backend {
                message: "disk full".to_string(),
            },
        );

        let api = ApiError::from(&err);
        assert_eq!(api.code, "INTERNAL_ERROR");
        assert!(!api.message.contains("disk full"));
        assert!(error_chain(&err).contains("disk full"));
    }
}
