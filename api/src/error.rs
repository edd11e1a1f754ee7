//! Error handling and custom error types for the API
//!
//! Provides the API error taxonomy with structured error responses and
//! HTTP status code mapping. Errors surface once per call; there is no
//! retry or partial-failure recovery in the demo.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fincanvas_core::canvas::CanvasError;
use fincanvas_core::TradeError;
use fincanvas_store::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;

/// Main API error type that encompasses all possible errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Document store errors
    #[error("Store error: {message}")]
    Store { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Demo trade settlement errors
    #[error("Trading error: {message}")]
    Trading { message: String },

    /// Market data errors
    #[error("Market data error: {message}")]
    MarketData { message: String },

    /// Portfolio errors
    #[error("Portfolio error: {message}")]
    Portfolio { message: String },

    /// Insight errors
    #[error("Insight error: {message}")]
    Insight { message: String },

    /// Analysis canvas errors
    #[error("Canvas error: {message}")]
    Canvas { message: String },

    /// Not found errors
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Bad request errors
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Internal server errors
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S, field: Option<S>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.map(|f| f.into()),
        }
    }

    /// Create a trading error
    pub fn trading<S: Into<String>>(message: S) -> Self {
        Self::Trading {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create an internal server error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the appropriate HTTP status code for the error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Config { .. } | ApiError::Internal { .. } | ApiError::Store { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Validation { .. }
            | ApiError::Trading { .. }
            | ApiError::MarketData { .. }
            | ApiError::Portfolio { .. }
            | ApiError::Insight { .. }
            | ApiError::Canvas { .. }
            | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Config { .. } => "CONFIG_ERROR",
            ApiError::Store { .. } => "STORE_ERROR",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Trading { .. } => "TRADING_ERROR",
            ApiError::MarketData { .. } => "MARKET_DATA_ERROR",
            ApiError::Portfolio { .. } => "PORTFOLIO_ERROR",
            ApiError::Insight { .. } => "INSIGHT_ERROR",
            ApiError::Canvas { .. } => "CANVAS_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Log the error appropriately based on type
    pub fn log_error(&self) {
        match self {
            ApiError::Config { message }
            | ApiError::Store { message }
            | ApiError::Internal { message } => {
                error!("{}: {}", self.error_code(), message);
            }
            _ => {
                // Client errors are logged at debug level
                tracing::debug!("Client error: {}", self);
            }
        }
    }

    /// Convert to a structured error response
    pub fn to_error_response(&self) -> ErrorResponse {
        self.log_error();

        let mut details = HashMap::new();
        if let ApiError::Validation {
            field: Some(field_name),
            ..
        } = self
        {
            details.insert("field".to_string(), field_name.clone().into());
        }

        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details,
            },
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Structured error response for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,

    /// Response timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Detailed error information
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details
    pub details: HashMap<String, serde_json::Value>,
}

/// Custom result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Axum response implementation for API errors
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = self.to_error_response();

        tracing::debug!(
            "API error response: status={}, code={}, message={}",
            status_code,
            error_response.error.code,
            error_response.error.message
        );

        (status_code, Json(error_response)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => ApiError::NotFound {
                resource: format!("{collection}/{id}"),
            },
            other => ApiError::Store {
                message: other.to_string(),
            },
        }
    }
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        match err {
            TradeError::NonPositiveQuantity => ApiError::Validation {
                message: err.to_string(),
                field: Some("quantity".to_string()),
            },
            TradeError::NonPositivePrice => ApiError::Validation {
                message: err.to_string(),
                field: Some("price".to_string()),
            },
            TradeError::NoPosition { .. } => ApiError::Trading {
                message: err.to_string(),
            },
        }
    }
}

impl From<CanvasError> for ApiError {
    fn from(err: CanvasError) -> Self {
        match err {
            CanvasError::UnknownSymbol(symbol) => ApiError::NotFound {
                resource: format!("Symbol {symbol}"),
            },
            other => ApiError::Canvas {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal {
            message: format!("Serialization error: {err}"),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::validation("bad", Some("quantity")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("positions/abc").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_error_carries_the_field() {
        let response = ApiError::validation("bad", Some("price")).to_error_response();
        assert_eq!(response.error.code, "VALIDATION_ERROR");
        assert_eq!(response.error.details.get("field").unwrap(), "price");
    }

    #[test]
    fn trade_errors_map_to_validation_and_trading() {
        let err: ApiError = TradeError::NonPositiveQuantity.into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err: ApiError = TradeError::NoPosition {
            symbol: "TSLA".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "TRADING_ERROR");
    }

    #[test]
    fn canvas_unknown_symbol_is_not_found() {
        let err: ApiError = CanvasError::UnknownSymbol("ZZZZ".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = CanvasError::TrendlineRequired.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
