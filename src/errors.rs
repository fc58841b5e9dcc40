// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Every handler and service returns this enum
/// Each variant maps to an HTTP status code and a JSON error envelope
#[derive(Error, Debug)]
pub enum CinemaError {
    #[error("{0}")]
    NotFound(String),

    /// Resource state prevents the request (e.g. seat already booked)
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden access")]
    Forbidden,

    #[error("Internal server error")]
    InternalError,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Too many requests, please try again later.")]
    RateLimitExceeded,

    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),
}

impl CinemaError {
    fn code(&self) -> &'static str {
        match self {
            CinemaError::NotFound(_) => "NOT_FOUND",
            CinemaError::Conflict(_) => "CONFLICT",
            CinemaError::DatabaseError(_) => "DATABASE_ERROR",
            CinemaError::InvalidInput(_) => "INVALID_INPUT",
            CinemaError::ValidationError(_) => "VALIDATION_ERROR",
            CinemaError::Unauthorized => "UNAUTHORIZED",
            CinemaError::Forbidden => "FORBIDDEN",
            CinemaError::InternalError => "INTERNAL_ERROR",
            CinemaError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            CinemaError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            CinemaError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

/// Convert CinemaError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for CinemaError {
    fn error_response(&self) -> HttpResponse {
        // Database details stay in the logs
        let message = match self {
            CinemaError::DatabaseError(_) => "Database operation failed".to_string(),
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            CinemaError::NotFound(_) => StatusCode::NOT_FOUND,
            CinemaError::Conflict(_) => StatusCode::CONFLICT,
            CinemaError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CinemaError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CinemaError::ValidationError(_) => StatusCode::BAD_REQUEST,
            CinemaError::Unauthorized => StatusCode::UNAUTHORIZED,
            CinemaError::Forbidden => StatusCode::FORBIDDEN,
            CinemaError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            CinemaError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            CinemaError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            CinemaError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
