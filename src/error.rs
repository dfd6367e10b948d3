use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

/// Stable machine-readable codes surfaced in error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidPolicy,
    InvalidDateRange,
    InsufficientNotice,
    LeaveOverlap,
    BalanceNotFound,
    InsufficientBalance,
    InvalidStatus,
    ValidationError,
    AlreadyClockedIn,
    AlreadyClockedOut,
    ClockOutMissingIn,
    GeoOutOfRange,
    NotFound,
    Forbidden,
    Unauthorized,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPolicy => "INVALID_POLICY",
            ErrorCode::InvalidDateRange => "INVALID_DATE_RANGE",
            ErrorCode::InsufficientNotice => "INSUFFICIENT_NOTICE",
            ErrorCode::LeaveOverlap => "LEAVE_OVERLAP",
            ErrorCode::BalanceNotFound => "BALANCE_NOT_FOUND",
            ErrorCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorCode::InvalidStatus => "INVALID_STATUS",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::AlreadyClockedIn => "ALREADY_CLOCKED_IN",
            ErrorCode::AlreadyClockedOut => "ALREADY_CLOCKED_OUT",
            ErrorCode::ClockOutMissingIn => "CLOCK_OUT_MISSING_IN",
            ErrorCode::GeoOutOfRange => "GEO_OUT_OF_RANGE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of every error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Client-correctable rule violation (bad dates, insufficient notice,
    /// overlap, insufficient balance, bad status value).
    #[error("{message}")]
    Validation { code: ErrorCode, message: String },

    /// State-machine conflict (double clock-in, clock-out without clock-in).
    #[error("{message}")]
    Conflict { code: ErrorCode, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl AppError {
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Conflict {
            code,
            message: message.into(),
        }
    }

    /// The code reported in the response body.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } | AppError::Conflict { code, .. } => *code,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::Database(_) | AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::Conflict { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        // 500s never leak internals; the cause goes to the operator log only.
        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Request failed with status {}: {:?}", status_code, self);
            "An unexpected error occurred".to_string()
        } else {
            log::warn!("Request failed with status {}: {}", status_code, self);
            self.to_string()
        };

        HttpResponse::build(status_code).json(ErrorBody::new(self.code(), message))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        if error.is::<sqlx::Error>() {
            match error.downcast::<sqlx::Error>() {
                Ok(sqlx_err) => return AppError::Database(sqlx_err),
                Err(original) => return AppError::Internal(original),
            }
        }

        AppError::Internal(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_codes_serialize_as_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::AlreadyClockedIn).unwrap();
        assert_eq!(json, "\"ALREADY_CLOCKED_IN\"");
        assert_eq!(ErrorCode::LeaveOverlap.to_string(), "LEAVE_OVERLAP");
    }

    #[test]
    fn error_body_carries_code_message_timestamp() {
        let body = ErrorBody::new(ErrorCode::InvalidDateRange, "End date must be after start date");
        let value: serde_json::Value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["code"], "INVALID_DATE_RANGE");
        assert_eq!(value["message"], "End date must be after start date");
        // RFC 3339 timestamps parse back losslessly.
        assert!(chrono::DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = AppError::Internal(anyhow::anyhow!("connection pool exhausted at 10.0.0.3"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = AppError::validation(ErrorCode::InsufficientBalance, "Insufficient leave balance");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), ErrorCode::InsufficientBalance);
    }
}
